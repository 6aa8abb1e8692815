//! Typed per-instance state storage.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Map holding at most one value per type, created on first access.
///
/// Playback, input and each mapper keep their private state here, keyed by
/// the state's own type rather than by name.
///
/// ## Example
///
/// ```rust
/// use spinview_core::StateStore;
///
/// #[derive(Default)]
/// struct Counter(u32);
///
/// let mut store = StateStore::new();
/// store.get_or_default::<Counter>().0 += 1;
/// store.get_or_default::<Counter>().0 += 1;
/// assert_eq!(store.get::<Counter>().map(|c| c.0), Some(2));
/// ```
#[derive(Default)]
pub struct StateStore {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// State of type `T`, created with `T::default()` on first access.
    pub fn get_or_default<T: Default + 'static>(&mut self) -> &mut T {
        self.entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()))
            .downcast_mut::<T>()
            .expect("state entry keyed by its own TypeId")
    }

    /// State of type `T`, if it was ever created.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<T>())
    }

    /// Mutable state of type `T`, if it was ever created.
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.entries
            .get_mut(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_mut::<T>())
    }

    /// Drop the state of type `T`.
    pub fn remove<T: 'static>(&mut self) {
        self.entries.remove(&TypeId::of::<T>());
    }

    /// Drop all state.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored states.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}
