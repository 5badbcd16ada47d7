use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::module_system::registry::{ModuleEntry, ModuleType};

/// A typed slot on a module that the loader fills before `initialize`.
pub trait InjectionPoint: Send + Sync {
    /// Type requested by this slot, resolved with compatible-type lookup
    fn target(&self) -> ModuleType;

    /// Already populated slots are skipped by the loader
    fn is_bound(&self) -> bool;

    /// Bind the slot to `provider`. Returns `false` when the provider does not
    /// expose the requested type.
    fn bind(&self, provider: &ModuleEntry) -> bool;
}

/// Write-once injection slot holding an `Arc<T>`.
///
/// `T` is either a concrete module type or a capability trait object that
/// some registered module provides.
pub struct Inject<T: ?Sized + Send + Sync + 'static> {
    slot: OnceLock<Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Inject<T> {
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Slot wired by hand; the loader leaves it untouched
    pub fn with(value: Arc<T>) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(value);
        Self { slot }
    }

    pub fn get(&self) -> Option<&Arc<T>> {
        self.slot.get()
    }

    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync + 'static> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("target", &ModuleType::of::<T>().short_name())
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl<T: ?Sized + Send + Sync + 'static> InjectionPoint for Inject<T> {
    fn target(&self) -> ModuleType {
        ModuleType::of::<T>()
    }

    fn is_bound(&self) -> bool {
        Inject::is_bound(self)
    }

    fn bind(&self, provider: &ModuleEntry) -> bool {
        match provider.view::<T>() {
            Some(value) => {
                // First binding wins
                let _ = self.slot.set(value);
                true
            }
            None => false,
        }
    }
}
