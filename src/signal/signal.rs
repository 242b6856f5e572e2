use crate::runtime::ReactiveRuntime;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// A reactive signal that holds a value and notifies subscribers when changed.
///
/// A signal belongs to the runtime that was current when it was created and
/// keeps notifying that runtime's effects wherever it is later set from.
pub struct Signal<T> {
    value: Arc<RwLock<T>>,
    id: usize,
    runtime: Weak<ReactiveRuntime>,
}

impl<T: Send + Sync + 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(initial: T) -> Self {
        let runtime = ReactiveRuntime::current();
        let id = runtime.next_id();

        Self {
            value: Arc::new(RwLock::new(initial)),
            id,
            runtime: Arc::downgrade(&runtime),
        }
    }

    /// Get the current value of the signal.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track();
        self.value.read().clone()
    }

    /// Get the current value without subscribing the running effect.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.value.read().clone()
    }

    /// Set a new value for the signal.
    pub fn set(&self, new_value: T) {
        *self.value.write() = new_value;
        self.notify();
    }

    /// Update the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.value.write();
        f(&mut *value);
        drop(value); // Release the write lock before notifying
        self.notify();
    }

    /// Read the value with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        let value = self.value.read();
        f(&*value)
    }

    /// Read the value with a function, without cloning or subscribing.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.value.read();
        f(&*value)
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> usize {
        self.id
    }

    fn track(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.track_read(self.id);
        }
    }

    fn notify(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.notify_observers(self.id);
        }
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            id: self.id,
            runtime: Weak::clone(&self.runtime),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .finish()
    }
}

impl From<&str> for Signal<String> {
    fn from(value: &str) -> Self {
        Signal::new(value.to_owned())
    }
}

impl From<String> for Signal<String> {
    fn from(value: String) -> Self {
        Signal::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_update() {
        let signal = Signal::new(1);
        assert_eq!(signal.get(), 1);

        signal.set(2);
        assert_eq!(signal.get(), 2);

        signal.update(|n| *n *= 10);
        assert_eq!(signal.get_untracked(), 20);
        assert_eq!(signal.with(|n| n + 1), 21);
    }

    #[test]
    fn clones_share_state() {
        let signal = Signal::new(String::from("a"));
        let other = signal.clone();
        other.set("b".to_string());

        assert_eq!(signal.get(), "b");
        assert_eq!(signal.id(), other.id());
    }

    #[test]
    fn outlives_its_runtime() {
        let signal = ReactiveRuntime::scope(|| Signal::new(5));
        signal.set(6);
        assert_eq!(signal.get(), 6);
    }

    #[test]
    fn string_signal_from_str() {
        let key: Signal<String> = "prefs".into();
        assert_eq!(key.get(), "prefs");
    }
}
