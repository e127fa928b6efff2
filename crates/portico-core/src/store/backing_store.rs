//! Change-tracking storage for model properties

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// A stored property value
pub type StoreValue = Arc<dyn Any + Send + Sync>;

/// Stores model properties and tracks which of them changed after
/// initialization completed.
pub trait BackingStore: Debug + Send + Sync {
    /// `None` when absent, or unchanged while only changed values are returned
    fn get_value(&self, key: &str) -> Option<StoreValue>;

    fn set_value(&self, key: &str, value: StoreValue);

    /// Entries in key order, filtered like [`BackingStore::get_value`]
    fn enumerate(&self) -> Vec<(String, StoreValue)>;

    fn initialization_completed(&self) -> bool;

    /// Completing initialization marks every stored value as unchanged
    fn set_initialization_completed(&self, completed: bool);

    fn return_only_changed_values(&self) -> bool;

    fn set_return_only_changed_values(&self, only_changed: bool);

    fn clear(&self);
}

impl dyn BackingStore + '_ {
    /// Typed read of a stored value
    pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.get_value(key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    pub fn set<T: Send + Sync + 'static>(&self, key: &str, value: T) {
        self.set_value(key, Arc::new(value));
    }
}

/// Creates a backing store for each new model instance
pub trait BackingStoreFactory: Debug + Send + Sync {
    fn create_backing_store(&self) -> Arc<dyn BackingStore>;
}

/// A model whose properties live in a [`BackingStore`]
pub trait BackedModel {
    fn backing_store(&self) -> &dyn BackingStore;
}

#[derive(Debug, Default)]
struct StoreState {
    // key -> (changed, value)
    values: BTreeMap<String, (bool, StoreValue)>,
    initialization_completed: bool,
    return_only_changed_values: bool,
}

/// Process-local [`BackingStore`]
#[derive(Debug, Default)]
pub struct InMemoryBackingStore {
    state: Mutex<StoreState>,
}

impl InMemoryBackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }
}

impl BackingStore for InMemoryBackingStore {
    fn get_value(&self, key: &str) -> Option<StoreValue> {
        self.with_state(|state| {
            let (changed, value) = state.values.get(key)?;
            if state.return_only_changed_values && !changed {
                return None;
            }
            Some(value.clone())
        })
    }

    fn set_value(&self, key: &str, value: StoreValue) {
        self.with_state(|state| {
            let changed = state.initialization_completed;
            state.values.insert(key.to_string(), (changed, value));
        });
    }

    fn enumerate(&self) -> Vec<(String, StoreValue)> {
        self.with_state(|state| {
            state
                .values
                .iter()
                .filter(|(_, (changed, _))| !state.return_only_changed_values || *changed)
                .map(|(key, (_, value))| (key.clone(), value.clone()))
                .collect()
        })
    }

    fn initialization_completed(&self) -> bool {
        self.with_state(|state| state.initialization_completed)
    }

    fn set_initialization_completed(&self, completed: bool) {
        self.with_state(|state| {
            state.initialization_completed = completed;
            if completed {
                for (changed, _) in state.values.values_mut() {
                    *changed = false;
                }
            }
        });
    }

    fn return_only_changed_values(&self) -> bool {
        self.with_state(|state| state.return_only_changed_values)
    }

    fn set_return_only_changed_values(&self, only_changed: bool) {
        self.with_state(|state| state.return_only_changed_values = only_changed);
    }

    fn clear(&self) {
        self.with_state(|state| state.values.clear());
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryBackingStoreFactory;

impl BackingStoreFactory for InMemoryBackingStoreFactory {
    fn create_backing_store(&self) -> Arc<dyn BackingStore> {
        Arc::new(InMemoryBackingStore::new())
    }
}
