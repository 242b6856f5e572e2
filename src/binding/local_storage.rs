use super::set_state::SetState;
use crate::signal::{Effect, Signal};
use crate::storage::{remove_stored_item, set_stored_item, try_get_stored_as, StorageBackend};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Initial state of a binding: a value, or a function producing one.
enum InitialState<T> {
    Value(T),
    Lazy(Box<dyn FnOnce() -> T>),
}

impl<T> InitialState<T> {
    fn resolve(self) -> T {
        match self {
            Self::Value(value) => value,
            Self::Lazy(f) => f(),
        }
    }
}

/// Options for [`use_local_storage_with_options`].
///
/// ```
/// use stashcan::UseLocalStorageOptions;
///
/// let options = UseLocalStorageOptions::lazy(|| vec![0u8; 4]).overwrite(true);
/// # let _ = options;
/// ```
pub struct UseLocalStorageOptions<T> {
    initial: InitialState<T>,
    overwrite: bool,
}

impl<T> UseLocalStorageOptions<T> {
    pub fn new(initial: T) -> Self {
        Self {
            initial: InitialState::Value(initial),
            overwrite: false,
        }
    }

    /// Compute the initial state when the binding is created.
    pub fn lazy(f: impl FnOnce() -> T + 'static) -> Self {
        Self {
            initial: InitialState::Lazy(Box::new(f)),
            overwrite: false,
        }
    }

    /// Use the initial state even when something is already stored.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

impl<T: Default> Default for UseLocalStorageOptions<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// State kept in sync with one storage entry.
///
/// Returned by [`use_local_storage`]. Every change to the value is written
/// under the active key; changing the key signal passed in moves the entry
/// to the new key. Dropping the binding stops the synchronization and
/// leaves the stored entry in place.
pub struct UseLocalStorage<T> {
    value: Signal<T>,
    active_key: Signal<String>,
    _effects: Vec<Effect>,
}

impl<T> UseLocalStorage<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// The bound value as a signal.
    pub fn value(&self) -> Signal<T> {
        self.value.clone()
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.value.get()
    }

    pub fn setter(&self) -> SetState<T> {
        SetState::new(self.value.clone())
    }

    /// Shorthand for `setter().set(value)`.
    pub fn set(&self, value: T) {
        self.setter().set(value);
    }

    /// Shorthand for `setter().update(f)`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.setter().update(f);
    }

    /// Key the value is currently persisted under.
    pub fn key(&self) -> String {
        self.active_key.get_untracked()
    }

    /// The `[value, setValue]` pair.
    pub fn split(&self) -> (Signal<T>, SetState<T>) {
        (self.value(), self.setter())
    }
}

/// Bind state to the storage entry named by `storage_key`.
///
/// The value starts as the stored entry, or as `initial` when nothing is
/// stored or `overwrite` is set. A present entry counts as stored even when
/// it holds a falsy value such as `0` or `""`; an entry that cannot be
/// decoded as `T` does not.
///
/// Storage failures never surface: the value keeps working in memory.
///
/// # Thread safety
///
/// The binding runs on the current [`ReactiveRuntime`](crate::runtime::ReactiveRuntime).
/// It may be moved to another thread, but its signals should not be set
/// from two threads while effects of the same runtime are running; see the
/// runtime's notes. Two bindings on the same key are not coordinated.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use std::sync::Arc;
/// use stashcan::storage::{get_stored_item, MemoryStorage};
/// use stashcan::{use_local_storage, Signal};
///
/// let store = Arc::new(MemoryStorage::new());
/// let key = Signal::new("count".to_string());
/// let count = use_local_storage(store.clone(), key.clone(), 5, false);
///
/// assert_eq!(count.get(), 5);
/// count.update(|n| n + 1);
/// assert_eq!(get_stored_item(store.as_ref(), "count"), Some(json!(6)));
///
/// key.set("total".to_string());
/// assert_eq!(get_stored_item(store.as_ref(), "count"), None);
/// assert_eq!(get_stored_item(store.as_ref(), "total"), Some(json!(6)));
/// ```
pub fn use_local_storage<T>(
    store: Arc<dyn StorageBackend>,
    storage_key: Signal<String>,
    initial: T,
    overwrite: bool,
) -> UseLocalStorage<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    use_local_storage_with_options(
        store,
        storage_key,
        UseLocalStorageOptions::new(initial).overwrite(overwrite),
    )
}

/// [`use_local_storage`] taking its settings as [`UseLocalStorageOptions`].
pub fn use_local_storage_with_options<T>(
    store: Arc<dyn StorageBackend>,
    storage_key: Signal<String>,
    options: UseLocalStorageOptions<T>,
) -> UseLocalStorage<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let UseLocalStorageOptions { initial, overwrite } = options;

    let key = storage_key.get_untracked();
    let value = Signal::new(initial_value(store.as_ref(), &key, initial, overwrite));
    let active_key = Signal::new(key);
    let mounted = Signal::new(false);

    // Order matters: migration runs before persistence when the active key
    // changes, and mounting comes last so the first pass never migrates.
    let migrate = Effect::new({
        let store = Arc::clone(&store);
        let mounted = mounted.clone();
        let storage_key = storage_key.clone();
        let active_key = active_key.clone();
        move || {
            let mounted = mounted.get();
            let requested = storage_key.get();
            let current = active_key.get();
            if !mounted || requested == current {
                return;
            }

            debug!(from = %current, to = %requested, "migrating storage key");
            remove_stored_item(store.as_ref(), &current);
            active_key.set(requested);
        }
    });

    let persist = Effect::new({
        let store = Arc::clone(&store);
        let value = value.clone();
        let active_key = active_key.clone();
        move || {
            let key = active_key.get();
            value.with(|value| {
                if set_stored_item(store.as_ref(), &key, value) {
                    debug!(key = %key, "persisted bound state");
                }
            });
        }
    });

    let mount = Effect::new(move || mounted.set(true));

    UseLocalStorage {
        value,
        active_key,
        _effects: vec![migrate, persist, mount],
    }
}

fn initial_value<T>(
    store: &dyn StorageBackend,
    key: &str,
    initial: InitialState<T>,
    overwrite: bool,
) -> T
where
    T: DeserializeOwned,
{
    let initial = initial.resolve();
    if overwrite {
        return initial;
    }

    match try_get_stored_as::<T, _>(store, key) {
        Ok(Some(stored)) => stored,
        Ok(None) => initial,
        Err(err) => {
            warn!(key, error = %err, "ignoring unreadable stored value");
            initial
        }
    }
}
