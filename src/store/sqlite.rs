//! A key-value store persisted in a single SQLite table.

use rusqlite::Connection;

use crate::Error;

use super::KeyValueStore;

/// A [KeyValueStore] backed by a SQLite database with a single
/// `store(key, value)` table.
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    /// Wrap `connection`, creating the `store` table if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the table cannot be created.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;

        Ok(Self { connection })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match self.connection.query_row(
            "SELECT value FROM store WHERE key = ?1",
            [key],
            |row| row.get(0),
        ) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(Error::SqlError(error)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.connection.execute(
            "INSERT INTO store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        self.connection
            .execute("DELETE FROM store WHERE key = ?1", [key])?;

        Ok(())
    }
}

#[cfg(test)]
mod sqlite_store_tests {
    use rusqlite::Connection;

    use crate::store::KeyValueStore;

    use super::SqliteStore;

    fn get_test_store() -> SqliteStore {
        let connection = Connection::open_in_memory().unwrap();
        SqliteStore::new(connection).unwrap()
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let store = get_test_store();

        assert_eq!(store.get("users").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut store = get_test_store();

        store.set("users", "[]").unwrap();

        assert_eq!(store.get("users").unwrap(), Some("[]".to_owned()));
    }

    #[test]
    fn set_replaces_existing_value() {
        let mut store = get_test_store();
        store.set("users", "[]").unwrap();

        store.set("users", "[{}]").unwrap();

        assert_eq!(store.get("users").unwrap(), Some("[{}]".to_owned()));
    }

    #[test]
    fn remove_deletes_key() {
        let mut store = get_test_store();
        store.set("users", "[]").unwrap();

        store.remove("users").unwrap();

        assert_eq!(store.get("users").unwrap(), None);
    }
}
