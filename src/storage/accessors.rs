use super::StorageBackend;
use crate::error::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Read the value stored at `key`, propagating store errors.
///
/// The stored text is decoded as JSON when it parses, otherwise it comes
/// back as [`Value::String`]. A string that happens to be valid JSON of
/// another type decodes to that type: `"42"` reads back as the number 42.
/// Use [`try_get_stored_as`] to read it back as a string.
pub fn try_get_stored_item<S>(store: &S, key: &str) -> StorageResult<Option<Value>>
where
    S: StorageBackend + ?Sized,
{
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };

    Ok(Some(match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(_) => Value::String(raw),
    }))
}

/// Read the value stored at `key`.
///
/// Returns `None` when there is no entry or the store fails.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stashcan::storage::{get_stored_item, set_stored_item, MemoryStorage};
///
/// let store = MemoryStorage::new();
/// set_stored_item(&store, "user", &json!({ "name": "ada" }));
/// assert_eq!(get_stored_item(&store, "user"), Some(json!({ "name": "ada" })));
/// assert_eq!(get_stored_item(&store, "missing"), None);
/// ```
pub fn get_stored_item<S>(store: &S, key: &str) -> Option<Value>
where
    S: StorageBackend + ?Sized,
{
    try_get_stored_item(store, key).unwrap_or_else(|err| {
        debug!(key, error = %err, "storage read failed");
        None
    })
}

/// Read the value stored at `key` as `T`, propagating store and decode
/// errors.
///
/// Strings are written without quotes, so the raw text is read two ways:
/// as JSON, and verbatim as a string. Which one `T` gets first depends on
/// what the text parses to:
/// - not JSON: the verbatim string.
/// - a quoted JSON string such as `"hi"` (with the quotes): the verbatim
///   string, quotes included, since only text containing quotes is stored
///   that way.
/// - any other JSON: the parsed value, falling back to the verbatim string,
///   so a `String` holding `42` still reads back as `"42"`.
///
/// One collision is left: `Option<String>` cannot tell `None` from
/// `Some("null")`, both are stored as `null` and read back as `None`.
pub fn try_get_stored_as<T, S>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    S: StorageBackend + ?Sized,
{
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };

    let verbatim = Value::String(raw.clone());
    let decoded = match serde_json::from_str::<Value>(&raw) {
        Err(_) => serde_json::from_value::<T>(verbatim),
        Ok(Value::String(unquoted)) => serde_json::from_value::<T>(verbatim)
            .or_else(|_| serde_json::from_value::<T>(Value::String(unquoted))),
        Ok(parsed) => {
            serde_json::from_value::<T>(parsed).or_else(|_| serde_json::from_value::<T>(verbatim))
        }
    };

    decoded.map(Some).map_err(|source| StorageError::Decode {
        key: key.to_owned(),
        source,
    })
}

/// Read the value stored at `key` as `T`.
///
/// Returns `None` when there is no entry, the store fails, or the entry
/// does not decode as `T`.
pub fn get_stored_as<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: StorageBackend + ?Sized,
{
    try_get_stored_as(store, key).unwrap_or_else(|err| {
        debug!(key, error = %err, "storage read failed");
        None
    })
}

/// Encode `data` the way it is stored: strings verbatim, anything else as
/// JSON text.
fn encode<T>(key: &str, data: &T) -> StorageResult<String>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(data).map_err(|source| StorageError::Encode {
        key: key.to_owned(),
        source,
    })?;

    Ok(match value {
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// Store `data` at `key`, propagating store and encode errors.
///
/// Always writes, including an empty string.
pub fn try_set_stored_item<T, S>(store: &S, key: &str, data: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
    S: StorageBackend + ?Sized,
{
    let encoded = encode(key, data)?;
    store.set_item(key, &encoded)
}

/// Store `data` at `key`. Returns `false` if encoding or the store fails.
pub fn set_stored_item<T, S>(store: &S, key: &str, data: &T) -> bool
where
    T: Serialize + ?Sized,
    S: StorageBackend + ?Sized,
{
    match try_set_stored_item(store, key, data) {
        Ok(()) => true,
        Err(err) => {
            debug!(key, error = %err, "storage write failed");
            false
        }
    }
}

/// Delete the entry at `key`, propagating store errors.
pub fn try_remove_stored_item<S>(store: &S, key: &str) -> StorageResult<()>
where
    S: StorageBackend + ?Sized,
{
    store.remove_item(key)
}

/// Delete the entry at `key`. Returns `false` if the store fails.
pub fn remove_stored_item<S>(store: &S, key: &str) -> bool
where
    S: StorageBackend + ?Sized,
{
    match try_remove_stored_item(store, key) {
        Ok(()) => true,
        Err(err) => {
            debug!(key, error = %err, "storage remove failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("broken".to_string()))
        }

        fn set_item(&self, key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::QuotaExceeded {
                key: key.to_string(),
            })
        }

        fn remove_item(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Host("SecurityError".to_string()))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        font_size: u8,
    }

    #[test]
    fn objects_round_trip() {
        let store = MemoryStorage::new();
        let data = json!({ "list": [1, 2, 3], "nested": { "on": true } });

        assert!(set_stored_item(&store, "data", &data));
        assert_eq!(get_stored_item(&store, "data"), Some(data));
    }

    #[test]
    fn scalars_round_trip() {
        let store = MemoryStorage::new();

        for value in [json!(0), json!(false), json!(null), json!(-3.5), json!([])] {
            assert!(set_stored_item(&store, "v", &value));
            assert_eq!(get_stored_item(&store, "v"), Some(value));
        }
    }

    #[test]
    fn strings_are_stored_verbatim() {
        let store = MemoryStorage::new();
        assert!(set_stored_item(&store, "name", "ada lovelace"));

        assert_eq!(
            store.get_item("name").unwrap().as_deref(),
            Some("ada lovelace")
        );
        assert_eq!(get_stored_item(&store, "name"), Some(json!("ada lovelace")));
    }

    #[test]
    fn json_looking_strings_decode_to_their_json_type() {
        let store = MemoryStorage::new();
        assert!(set_stored_item(&store, "n", "42"));
        assert!(set_stored_item(&store, "b", "true"));

        assert_eq!(get_stored_item(&store, "n"), Some(json!(42)));
        assert_eq!(get_stored_item(&store, "b"), Some(json!(true)));

        // A typed read keeps the string.
        assert_eq!(get_stored_as::<String, _>(&store, "n").as_deref(), Some("42"));
    }

    #[test]
    fn quoted_strings_read_back_verbatim() {
        let store = MemoryStorage::new();
        let quoted = "\"quoted\"".to_string();
        assert!(set_stored_item(&store, "s", &quoted));

        assert_eq!(get_stored_as::<String, _>(&store, "s"), Some(quoted.clone()));
        assert_eq!(
            get_stored_as::<Option<String>, _>(&store, "s"),
            Some(Some(quoted.clone()))
        );
        assert_eq!(get_stored_as::<Value, _>(&store, "s"), Some(Value::String(quoted)));
    }

    #[test]
    fn optional_strings_keep_json_looking_content() {
        let store = MemoryStorage::new();

        set_stored_item(&store, "n", &Some("42".to_string()));
        assert_eq!(
            get_stored_as::<Option<String>, _>(&store, "n"),
            Some(Some("42".to_string()))
        );

        set_stored_item(&store, "none", &None::<String>);
        assert_eq!(get_stored_as::<Option<String>, _>(&store, "none"), Some(None));

        // Same stored text as `None`, so it reads back as `None`.
        set_stored_item(&store, "null", &Some("null".to_string()));
        assert_eq!(store.get_item("null").unwrap().as_deref(), Some("null"));
        assert_eq!(get_stored_as::<Option<String>, _>(&store, "null"), Some(None));
    }

    #[test]
    fn typed_value_reads_keep_structure() {
        let store = MemoryStorage::new();
        let data = json!({ "a": [1, "two"] });
        set_stored_item(&store, "v", &data);

        assert_eq!(get_stored_as::<Value, _>(&store, "v"), Some(data));
    }

    #[test]
    fn empty_string_is_written() {
        let store = MemoryStorage::new();
        assert!(set_stored_item(&store, "empty", ""));

        assert_eq!(store.get_item("empty").unwrap().as_deref(), Some(""));
        assert_eq!(get_stored_item(&store, "empty"), Some(json!("")));
    }

    #[test]
    fn remove_then_get_is_none() {
        let store = MemoryStorage::new();
        set_stored_item(&store, "k", &1);

        assert!(remove_stored_item(&store, "k"));
        assert_eq!(get_stored_item(&store, "k"), None);
    }

    #[test]
    fn typed_reads() {
        let store = MemoryStorage::new();
        let prefs = Prefs {
            theme: "dark".to_string(),
            font_size: 14,
        };
        set_stored_item(&store, "prefs", &prefs);

        assert_eq!(get_stored_as::<Prefs, _>(&store, "prefs"), Some(prefs));
        assert_eq!(get_stored_as::<Prefs, _>(&store, "missing"), None);
    }

    #[test]
    fn typed_read_of_wrong_shape_is_a_decode_error() {
        let store = MemoryStorage::new();
        set_stored_item(&store, "prefs", &json!({ "theme": 1 }));

        let err = try_get_stored_as::<Prefs, _>(&store, "prefs").unwrap_err();
        assert!(matches!(err, StorageError::Decode { key, .. } if key == "prefs"));
        assert_eq!(get_stored_as::<Prefs, _>(&store, "prefs"), None);
    }

    #[test]
    fn unencodable_data_fails_to_set() {
        let store = MemoryStorage::new();
        let mut data = HashMap::new();
        data.insert((1, 2), "tuple keys are not JSON object keys");

        assert!(!set_stored_item(&store, "bad", &data));
        assert!(matches!(
            try_set_stored_item(&store, "bad", &data),
            Err(StorageError::Encode { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn store_failures_are_swallowed_by_default() {
        let store = BrokenStorage;

        assert_eq!(get_stored_item(&store, "k"), None);
        assert!(!set_stored_item(&store, "k", &1));
        assert!(!remove_stored_item(&store, "k"));
    }

    #[test]
    fn store_failures_propagate_from_try_forms() {
        let store = BrokenStorage;

        assert!(matches!(
            try_get_stored_item(&store, "k"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            try_set_stored_item(&store, "k", &1),
            Err(StorageError::QuotaExceeded { key }) if key == "k"
        ));
        assert!(matches!(
            try_remove_stored_item(&store, "k"),
            Err(StorageError::Host(_))
        ));
    }

    #[test]
    fn quota_failure_reports_false() {
        let store = MemoryStorage::with_quota(4);
        assert!(!set_stored_item(&store, "key", "too long"));
        assert!(matches!(
            try_set_stored_item(&store, "key", "too long"),
            Err(StorageError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn works_through_trait_objects() {
        let store: std::sync::Arc<dyn StorageBackend> = std::sync::Arc::new(MemoryStorage::new());
        assert!(set_stored_item(store.as_ref(), "k", &vec![1, 2]));
        assert_eq!(get_stored_item(store.as_ref(), "k"), Some(json!([1, 2])));
    }
}
