//! Defines the key-value store trait and the typed read/write helpers used
//! by the domain modules.

use serde::{Serialize, de::DeserializeOwned};

use crate::Error;

/// A synchronous, string-keyed store of JSON-serialized values.
///
/// Writes replace the full value for a key. There are no partial updates and
/// no transactional semantics beyond a single `set` call.
pub trait KeyValueStore {
    /// Get the raw JSON string stored under `key`, or `None` if the key has
    /// never been written.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove `key` and its value. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), Error>;
}

/// Read the collection stored under `key`, falling back to the default value
/// when the key is missing.
///
/// Malformed JSON is logged and treated as if the key were absent: corrupt
/// state must never take the app down, it only resets the affected
/// collection.
///
/// # Errors
/// Returns an error only if the underlying store read fails.
pub fn read_or_default<T>(store: &dyn KeyValueStore, key: &str) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.get(key)? else {
        return Ok(T::default());
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::error!("discarding malformed JSON under key \"{key}\": {error}");
            Ok(T::default())
        }
    }
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if serialization fails, or an
/// error if the underlying store write fails.
pub fn write<T>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<(), Error>
where
    T: Serialize,
{
    let raw =
        serde_json::to_string(value).map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    store.set(key, &raw)
}

#[cfg(test)]
mod read_or_default_tests {
    use serde::{Deserialize, Serialize};

    use crate::store::MemoryStore;

    use super::{KeyValueStore, read_or_default, write};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
    }

    #[test]
    fn missing_key_yields_default() {
        let store = MemoryStore::new();

        let got: Vec<Record> = read_or_default(&store, "records").unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn round_trips_collections() {
        let mut store = MemoryStore::new();
        let want = vec![Record {
            name: "groceries".to_owned(),
        }];

        write(&mut store, "records", &want).unwrap();
        let got: Vec<Record> = read_or_default(&store, "records").unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn malformed_json_resets_to_default() {
        let mut store = MemoryStore::new();
        store.set("records", "{not json").unwrap();

        let got: Vec<Record> = read_or_default(&store, "records").unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = MemoryStore::new();
        store.set("records", "[]").unwrap();

        store.remove("records").unwrap();
        store.remove("records").unwrap();

        assert_eq!(store.get("records").unwrap(), None);
    }
}
