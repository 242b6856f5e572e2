//! Reactive state bound to a storage entry.
//!
//! [`use_local_storage`] keeps a [`Signal`](crate::Signal) and one storage
//! entry in sync: the entry seeds the signal, every change to the signal is
//! written back, and changing the key moves the entry.

mod local_storage;
mod set_state;

pub use local_storage::{
    use_local_storage, use_local_storage_with_options, UseLocalStorage, UseLocalStorageOptions,
};
pub use set_state::{SetState, SetStateAction};
