pub mod names;

pub use names::{random_name, random_name_with, WordType};
