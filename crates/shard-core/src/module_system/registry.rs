use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::module_system::error::ModuleSystemError;
use crate::module_system::traits::Module;

/// Key identifying a module type or a capability trait object type.
///
/// Equality and hashing only look at the `TypeId`; the type name is kept for
/// logs and error messages.
#[derive(Clone, Copy)]
pub struct ModuleType {
    id: TypeId,
    type_name: &'static str,
}

impl ModuleType {
    /// Key for `T`, which may be a concrete module or `dyn SomeCapability`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name with module paths stripped, e.g. `dyn ConfigStore`
    pub fn short_name(&self) -> String {
        let full = self.type_name;
        let mut out = String::with_capacity(full.len());
        let mut start = 0;
        for (i, c) in full.char_indices() {
            if matches!(c, '<' | '>' | ',' | ' ' | '&' | '(' | ')' | '[' | ']' | ';' | '*') {
                out.push_str(last_segment(&full[start..i]));
                out.push(c);
                start = i + c.len_utf8();
            }
        }
        out.push_str(last_segment(&full[start..]));
        out
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl PartialEq for ModuleType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ModuleType {}

impl Hash for ModuleType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleType({})", self.type_name)
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// A registered module instance plus the typed views it can be looked up as.
///
/// Every entry can be retrieved as its concrete type. Extra views (usually
/// `Arc<dyn Capability>`) are added through [`ModuleEntryBuilder::provides`].
pub struct ModuleEntry {
    module_type: ModuleType,
    module: Arc<dyn Module>,
    // Each value is an `Arc<T>` boxed as `Any`, keyed by `TypeId::of::<T>()`
    views: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    provides: Vec<ModuleType>,
}

impl ModuleEntry {
    /// Start building an entry for an already shared module instance
    pub fn builder<M: Module>(module: Arc<M>) -> ModuleEntryBuilder<M> {
        ModuleEntryBuilder::new(module)
    }

    /// Entry exposing only the concrete type of `module`
    pub fn new<M: Module>(module: M) -> Self {
        ModuleEntryBuilder::new(Arc::new(module)).build()
    }

    /// Concrete type of the module
    pub fn module_type(&self) -> ModuleType {
        self.module_type
    }

    pub fn module(&self) -> &Arc<dyn Module> {
        &self.module
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }

    /// All types this entry can be looked up as, concrete type first
    pub fn provides(&self) -> &[ModuleType] {
        &self.provides
    }

    /// Whether this entry satisfies a lookup for `module_type`
    pub fn is_compatible_with(&self, module_type: ModuleType) -> bool {
        self.views.contains_key(&module_type.id())
    }

    /// Typed view of the module, if it was registered as providing `T`
    pub fn view<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.views
            .get(&TypeId::of::<T>())
            .and_then(|view| view.downcast_ref::<Arc<T>>())
            .cloned()
    }
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.module.name())
            .field("type", &self.module_type.short_name())
            .field("priority", &self.module.boot_priority())
            .field("provides", &self.provides.iter().map(ModuleType::short_name).collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`ModuleEntry`] that keeps the concrete type around so
/// capability views can be derived from it.
pub struct ModuleEntryBuilder<M: Module> {
    module: Arc<M>,
    views: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    provides: Vec<ModuleType>,
}

impl<M: Module> ModuleEntryBuilder<M> {
    pub fn new(module: Arc<M>) -> Self {
        let concrete = ModuleType::of::<M>();
        let mut views: HashMap<TypeId, Box<dyn Any + Send + Sync>> = HashMap::new();
        views.insert(concrete.id(), Box::new(module.clone()));
        Self {
            module,
            views,
            provides: vec![concrete],
        }
    }

    /// Expose the module as `T`, typically a capability trait object:
    ///
    /// ```ignore
    /// ModuleEntry::builder(config).provides(|m| m as Arc<dyn ConfigStore>)
    /// ```
    pub fn provides<T: ?Sized + Send + Sync + 'static>(
        mut self,
        cast: impl FnOnce(Arc<M>) -> Arc<T>,
    ) -> Self {
        let view_type = ModuleType::of::<T>();
        let view: Arc<T> = cast(self.module.clone());
        if self.views.insert(view_type.id(), Box::new(view)).is_none() {
            self.provides.push(view_type);
        }
        self
    }

    pub fn build(self) -> ModuleEntry {
        let module_type = ModuleType::of::<M>();
        let module: Arc<dyn Module> = self.module;
        ModuleEntry {
            module_type,
            module,
            views: self.views,
            provides: self.provides,
        }
    }
}

impl<M: Module> From<ModuleEntryBuilder<M>> for ModuleEntry {
    fn from(builder: ModuleEntryBuilder<M>) -> Self {
        builder.build()
    }
}

/// Fixed set of registered modules, in registration order.
///
/// Immutable after construction; lookups never fail, they return `None`.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<ModuleEntry>,
    by_type: HashMap<TypeId, usize>,
}

impl ModuleRegistry {
    /// Build the registry. Two entries with the same concrete type are rejected.
    pub fn new(entries: Vec<ModuleEntry>) -> Result<Self, ModuleSystemError> {
        let mut by_type = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if by_type.insert(entry.module_type().id(), index).is_some() {
                return Err(ModuleSystemError::DuplicateModule {
                    module_type: entry.module_type().short_name(),
                });
            }
        }
        Ok(Self { entries, by_type })
    }

    /// All entries in registration order
    pub fn entries(&self) -> &[ModuleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup by exact concrete type
    pub fn get(&self, module_type: ModuleType) -> Option<&ModuleEntry> {
        self.by_type
            .get(&module_type.id())
            .map(|&index| &self.entries[index])
    }

    /// Lookup by compatible type: the exact match if there is one, otherwise
    /// the first entry in registration order that provides `module_type`.
    pub fn find_compatible(&self, module_type: ModuleType) -> Option<&ModuleEntry> {
        self.get(module_type).or_else(|| {
            self.entries
                .iter()
                .find(|entry| entry.is_compatible_with(module_type))
        })
    }

    /// Typed compatible lookup
    pub fn find<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.find_compatible(ModuleType::of::<T>())
            .and_then(|entry| entry.view::<T>())
    }

    /// Entries that take part in automatic startup loading, in registration order
    pub fn eligible(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.module().boot_priority().is_auto_loaded())
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|e| e.name()).collect();
        f.debug_struct("ModuleRegistry").field("modules", &names).finish()
    }
}
