use crate::runtime::ReactiveRuntime;
use std::sync::{Arc, Weak};

/// A side effect that runs when its dependencies change.
///
/// Effects track the signals they read and re-run synchronously when any
/// of them is set. The effect runs immediately on creation to establish
/// its initial dependencies. Dependencies are collected again on every run,
/// so an early return narrows what the effect listens to.
///
/// Dropping the effect unregisters it.
///
/// # Examples
///
/// ```
/// use stashcan::{Effect, Signal};
/// use std::sync::{Arc, atomic::{AtomicI32, Ordering}};
///
/// let signal = Signal::new(5);
/// let last_value = Arc::new(AtomicI32::new(0));
/// let last_value_clone = last_value.clone();
///
/// let _effect = Effect::new({
///     let signal = signal.clone();
///     move || {
///         last_value_clone.store(signal.get(), Ordering::SeqCst);
///     }
/// });
///
/// assert_eq!(last_value.load(Ordering::SeqCst), 5);
///
/// signal.set(10);
/// assert_eq!(last_value.load(Ordering::SeqCst), 10);
/// ```
#[must_use = "dropping an effect unregisters it"]
pub struct Effect {
    id: usize,
    runtime: Weak<ReactiveRuntime>,
}

impl Effect {
    /// Create a new effect and run it once.
    pub fn new<F>(effect: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let runtime = ReactiveRuntime::current();
        let id = runtime.next_id();

        runtime.register_observer(id, Arc::new(effect));
        runtime.run_observer(id);

        Self {
            id,
            runtime: Arc::downgrade(&runtime),
        }
    }

    /// Manually trigger the effect.
    pub fn run(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.run_observer(self.id);
        }
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.remove_observer(self.id);
        }
    }
}

/// Create a new effect that runs when dependencies change.
///
/// # Example
///
/// ```
/// use stashcan::{create_effect, Signal};
///
/// let count = Signal::new(0);
/// let _effect = create_effect({
///     let count = count.clone();
///     move || println!("Count is: {}", count.get())
/// });
/// ```
pub fn create_effect<F>(effect: F) -> Effect
where
    F: Fn() + Send + Sync + 'static,
{
    Effect::new(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Signal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn effect_runs_immediately() {
        ReactiveRuntime::scope(|| {
            let counter = Arc::new(AtomicUsize::new(0));
            let counter_clone = counter.clone();

            let _effect = create_effect(move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            });

            assert_eq!(counter.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn effect_reruns_on_change() {
        ReactiveRuntime::scope(|| {
            let signal = Signal::new(0);
            let counter = Arc::new(AtomicUsize::new(0));

            let _effect = Effect::new({
                let signal = signal.clone();
                let counter = counter.clone();
                move || {
                    let _ = signal.get();
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });

            signal.set(1);
            signal.set(2);
            assert_eq!(counter.load(Ordering::SeqCst), 3);
        });
    }

    #[test]
    fn dropped_effect_stops_running() {
        ReactiveRuntime::scope(|| {
            let signal = Signal::new(0);
            let counter = Arc::new(AtomicUsize::new(0));

            let effect = Effect::new({
                let signal = signal.clone();
                let counter = counter.clone();
                move || {
                    let _ = signal.get();
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
            drop(effect);

            signal.set(1);
            assert_eq!(counter.load(Ordering::SeqCst), 1);
            assert_eq!(ReactiveRuntime::current().observer_count(), 0);
        });
    }

    #[test]
    fn dependencies_follow_the_latest_run() {
        ReactiveRuntime::scope(|| {
            let gate = Signal::new(false);
            let inner = Signal::new(0);
            let counter = Arc::new(AtomicUsize::new(0));

            let _effect = Effect::new({
                let gate = gate.clone();
                let inner = inner.clone();
                let counter = counter.clone();
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if gate.get() {
                        let _ = inner.get();
                    }
                }
            });

            // Not read yet, so not subscribed.
            inner.set(1);
            assert_eq!(counter.load(Ordering::SeqCst), 1);

            gate.set(true);
            inner.set(2);
            assert_eq!(counter.load(Ordering::SeqCst), 3);
        });
    }

    #[test]
    fn effect_may_set_another_signal() {
        ReactiveRuntime::scope(|| {
            let source = Signal::new(2);
            let doubled = Signal::new(0);

            let _effect = Effect::new({
                let source = source.clone();
                let doubled = doubled.clone();
                move || doubled.set(source.get() * 2)
            });

            source.set(21);
            assert_eq!(doubled.get(), 42);
        });
    }
}
