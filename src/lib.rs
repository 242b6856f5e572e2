//! # Stashcan
//!
//! Typed access to a synchronous key/value store, and reactive state that
//! stays in sync with it.
//!
//! ## Storage accessors
//!
//! Stateless helpers over any [`StorageBackend`](storage::StorageBackend):
//! - `get_stored_item` - Read and JSON-decode an entry
//! - `set_stored_item` - JSON-encode and write an entry
//! - `remove_stored_item` - Delete an entry
//!
//! Each has a `try_` twin that returns the [`StorageError`] instead of
//! swallowing it.
//!
//! ## Bound state
//!
//! [`use_local_storage`] seeds a [`Signal`] from storage, writes every change
//! back, and migrates the entry when its key changes. It runs on a small
//! reactive runtime of signals and effects.

pub mod binding;
pub mod error;
pub mod runtime;
pub mod signal;
pub mod storage;

// Re-export main types for convenience
pub use binding::{
    use_local_storage, use_local_storage_with_options, SetState, SetStateAction, UseLocalStorage,
    UseLocalStorageOptions,
};
pub use error::{StorageError, StorageResult};
pub use signal::{create_effect, Effect, Signal};
pub use storage::{get_stored_item, remove_stored_item, set_stored_item, MemoryStorage};
