use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Dependency graph shared by every signal and effect of one runtime.
struct ReactiveContext {
    current_observer: Option<usize>,
    // Map from signal ID to set of observer IDs that depend on it
    dependencies: HashMap<usize, HashSet<usize>>,
    // Map from observer ID to set of signal IDs it depends on
    observer_deps: HashMap<usize, HashSet<usize>>,
    // Map from observer ID to the effect function
    observers: HashMap<usize, Callback>,
}

impl ReactiveContext {
    fn new() -> Self {
        Self {
            current_observer: None,
            dependencies: HashMap::new(),
            observer_deps: HashMap::new(),
            observers: HashMap::new(),
        }
    }

    /// Forget every signal the observer read during its last run.
    fn untrack(&mut self, observer_id: usize) {
        if let Some(old_deps) = self.observer_deps.remove(&observer_id) {
            for signal_id in old_deps {
                if let Some(deps) = self.dependencies.get_mut(&signal_id) {
                    deps.remove(&observer_id);
                    if deps.is_empty() {
                        self.dependencies.remove(&signal_id);
                    }
                }
            }
        }
    }

    fn clear(&mut self) {
        self.current_observer = None;
        self.dependencies.clear();
        self.observer_deps.clear();
        self.observers.clear();
    }
}

/// Reactive runtime driving signals and effects.
///
/// Supports both a global runtime (default) and scoped runtimes for
/// isolation. The runtime tracks which effects read which signals and
/// re-runs those effects synchronously when a signal is set.
///
/// # Thread safety
///
/// The runtime is `Send + Sync`, but it records a single current observer.
/// Signal reads on one thread while another thread is running an effect of
/// the same runtime get attributed to that effect. Run the effects of one
/// runtime from one thread at a time, and give each thread its own runtime
/// with [`ReactiveRuntime::scope`] rather than sharing the global one.
///
/// # Examples
///
/// Using the default global runtime:
///
/// ```
/// use stashcan::Signal;
///
/// let signal = Signal::new(42);
/// assert_eq!(signal.get(), 42);
/// ```
///
/// Using scoped runtimes for isolation:
///
/// ```
/// use stashcan::runtime::ReactiveRuntime;
/// use stashcan::Signal;
///
/// ReactiveRuntime::scope(|| {
///     let signal = Signal::new(0);
///     assert_eq!(signal.get(), 0);
/// });
/// // Runtime and all its state is dropped here
/// ```
pub struct ReactiveRuntime {
    next_id: AtomicUsize,
    context: Mutex<ReactiveContext>,
}

// Thread-local stack for scoped runtimes
thread_local! {
    static RUNTIME_STACK: RefCell<Vec<Arc<ReactiveRuntime>>> = const { RefCell::new(Vec::new()) };
}

impl ReactiveRuntime {
    /// Create a new isolated runtime.
    ///
    /// The runtime has its own dependency graph. Make it current with
    /// [`ReactiveRuntime::with_runtime`].
    pub fn new() -> Arc<Self> {
        Arc::new(ReactiveRuntime {
            next_id: AtomicUsize::new(0),
            context: Mutex::new(ReactiveContext::new()),
        })
    }

    /// Run a function with a fresh isolated runtime.
    ///
    /// The runtime is dropped when the function returns; signals created
    /// inside it stop notifying afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use stashcan::runtime::ReactiveRuntime;
    /// use stashcan::Signal;
    ///
    /// ReactiveRuntime::scope(|| {
    ///     let signal = Signal::new(0);
    ///     assert_eq!(signal.get(), 0);
    /// });
    /// ```
    pub fn scope<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let runtime = Self::new();
        Self::with_runtime(runtime, f)
    }

    /// Get or create the global runtime (fallback).
    pub fn global() -> Arc<Self> {
        static RUNTIME: OnceLock<Arc<ReactiveRuntime>> = OnceLock::new();
        Arc::clone(RUNTIME.get_or_init(Self::new))
    }

    /// Get the current reactive runtime (scoped or global fallback).
    pub fn current() -> Arc<Self> {
        RUNTIME_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .cloned()
                .unwrap_or_else(Self::global)
        })
    }

    /// Run a function with a specific runtime as the current context.
    ///
    /// # Examples
    ///
    /// ```
    /// use stashcan::runtime::ReactiveRuntime;
    /// use stashcan::Signal;
    ///
    /// let runtime = ReactiveRuntime::new();
    /// ReactiveRuntime::with_runtime(runtime, || {
    ///     let signal = Signal::new(42);
    ///     assert_eq!(signal.get(), 42);
    /// });
    /// ```
    pub fn with_runtime<F, R>(runtime: Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        RUNTIME_STACK.with(|stack| {
            stack.borrow_mut().push(runtime);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        RUNTIME_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    /// Clear all observers and dependencies and reset the ID counter.
    ///
    /// Only meant for runtimes that no longer own live signals.
    pub fn clear(&self) {
        self.context.lock().clear();
        self.next_id.store(0, Ordering::SeqCst);
    }

    /// Generate the next unique ID for a reactive primitive.
    pub fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of live observers registered with this runtime.
    pub fn observer_count(&self) -> usize {
        self.context.lock().observers.len()
    }

    /// Track a read of a signal by the current observer.
    pub(crate) fn track_read(&self, signal_id: usize) {
        let mut ctx = self.context.lock();
        if let Some(current_observer) = ctx.current_observer {
            ctx.dependencies
                .entry(signal_id)
                .or_default()
                .insert(current_observer);
            ctx.observer_deps
                .entry(current_observer)
                .or_default()
                .insert(signal_id);
        }
    }

    /// Re-run every observer that depends on a signal.
    ///
    /// Observers run in creation order, with no lock held, so they may set
    /// other signals.
    pub(crate) fn notify_observers(&self, signal_id: usize) {
        let mut observers = {
            let ctx = self.context.lock();
            ctx.dependencies
                .get(&signal_id)
                .map(|obs| obs.iter().copied().collect::<Vec<_>>())
                .unwrap_or_default()
        };
        observers.sort_unstable();

        for observer_id in observers {
            self.run_observer(observer_id);
        }
    }

    /// Register an observer callback without running it.
    pub(crate) fn register_observer(&self, observer_id: usize, f: Callback) {
        let mut ctx = self.context.lock();
        ctx.untrack(observer_id);
        ctx.observers.insert(observer_id, f);
    }

    /// Run an observer, re-tracking the signals it reads.
    pub(crate) fn run_observer(&self, observer_id: usize) {
        let callback = {
            let mut ctx = self.context.lock();
            let Some(callback) = ctx.observers.get(&observer_id).cloned() else {
                // Dropped while a notification was in flight.
                return;
            };
            ctx.untrack(observer_id);
            callback
        };

        self.with_observer(observer_id, || callback());
    }

    /// Run a function with a specific observer as the current context.
    pub(crate) fn with_observer<F, R>(&self, observer_id: usize, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let prev = self.context.lock().current_observer.replace(observer_id);
        let result = f();
        self.context.lock().current_observer = prev;
        result
    }

    /// Unregister an observer and its dependencies.
    pub(crate) fn remove_observer(&self, observer_id: usize) {
        let mut ctx = self.context.lock();
        ctx.observers.remove(&observer_id);
        ctx.untrack(observer_id);
    }
}
