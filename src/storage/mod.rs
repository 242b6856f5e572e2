//! Stateless accessors over a host key/value store.
//!
//! Values are JSON encoded on the way in (strings are stored as-is) and
//! decoded on the way out. Each accessor comes in two forms: the plain one
//! swallows store failures and returns `None`/`false`, the `try_` one
//! returns the [`StorageError`](crate::StorageError).

mod accessors;
mod backend;
#[cfg(feature = "web")]
mod web;

pub use accessors::{
    get_stored_as, get_stored_item, remove_stored_item, set_stored_item, try_get_stored_as,
    try_get_stored_item, try_remove_stored_item, try_set_stored_item,
};
pub use backend::{MemoryStorage, StorageBackend};
#[cfg(feature = "web")]
pub use web::WebStorage;
