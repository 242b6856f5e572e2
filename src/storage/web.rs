//! Browser `localStorage` backend. Requires the `web` feature and a wasm
//! target with a global `window`.

use super::StorageBackend;
use crate::error::{StorageError, StorageResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomException, Storage};

/// [`StorageBackend`] over `window.localStorage`.
///
/// Holds no handle; the storage object is looked up on every call so the
/// backend stays `Send + Sync`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebStorage;

impl WebStorage {
    pub fn new() -> Self {
        Self
    }
}

fn local_storage() -> StorageResult<Storage> {
    let window = web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no global window".to_string()))?;

    match window.local_storage() {
        Ok(Some(storage)) => Ok(storage),
        Ok(None) => Err(StorageError::Unavailable(
            "localStorage is not supported".to_string(),
        )),
        // Thrown when storage access is blocked, e.g. by privacy settings.
        Err(err) => Err(StorageError::Unavailable(describe(&err))),
    }
}

fn describe(err: &JsValue) -> String {
    match err.dyn_ref::<DomException>() {
        Some(exception) => format!("{}: {}", exception.name(), exception.message()),
        None => format!("{err:?}"),
    }
}

fn host_error(key: &str, err: JsValue) -> StorageError {
    match err.dyn_ref::<DomException>() {
        Some(exception) if exception.name() == "QuotaExceededError" => {
            StorageError::QuotaExceeded {
                key: key.to_owned(),
            }
        }
        _ => StorageError::Host(describe(&err)),
    }
}

impl StorageBackend for WebStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        local_storage()?
            .get_item(key)
            .map_err(|err| host_error(key, err))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        local_storage()?
            .set_item(key, value)
            .map_err(|err| host_error(key, err))
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        local_storage()?
            .remove_item(key)
            .map_err(|err| host_error(key, err))
    }
}
