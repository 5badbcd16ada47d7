//! Random human-friendly server names such as `Otter-Teal-Brave`.
use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "brave", "calm", "clever", "eager", "fierce", "gentle", "happy", "jolly", "lucky", "mighty",
    "nimble", "proud", "quick", "quiet", "shy", "swift", "tiny", "wild", "wise", "zesty",
];

const ANIMALS: &[&str] = &[
    "badger", "beaver", "bison", "cobra", "falcon", "ferret", "gecko", "heron", "ibex", "jaguar",
    "koala", "lynx", "moose", "newt", "otter", "panda", "raven", "salmon", "walrus", "yak",
];

const COLORS: &[&str] = &[
    "amber", "azure", "coral", "crimson", "cyan", "gold", "indigo", "ivory", "jade", "lilac",
    "magenta", "olive", "pearl", "plum", "ruby", "scarlet", "silver", "teal", "umber", "violet",
];

/// Word list a name segment is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordType {
    Adjective,
    Animal,
    Color,
}

impl WordType {
    fn words(&self) -> &'static [&'static str] {
        match self {
            WordType::Adjective => ADJECTIVES,
            WordType::Animal => ANIMALS,
            WordType::Color => COLORS,
        }
    }
}

/// Random name with one capitalized word per entry of `pattern`, joined by `-`
pub fn random_name(pattern: &[WordType]) -> String {
    random_name_with(&mut rand::thread_rng(), pattern)
}

/// [`random_name`] drawing from a caller supplied RNG
pub fn random_name_with<R: Rng + ?Sized>(rng: &mut R, pattern: &[WordType]) -> String {
    if pattern.is_empty() {
        return "Empty".to_string();
    }

    pattern
        .iter()
        .map(|word_type| {
            let word = word_type.words().choose(&mut *rng).copied().unwrap_or("unknown");
            capitalize(word)
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
