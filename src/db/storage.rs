use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;

/// Key-value substrate the transaction store persists into.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl Storage for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.values.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{establish_connection, establish_test_connection};
    use tempfile::NamedTempFile;

    #[test]
    fn test_sqlite_read_missing_key() {
        let storage = SqliteStorage::new(establish_test_connection().unwrap());
        assert_eq!(storage.read("missing").unwrap(), None);
    }

    #[test]
    fn test_sqlite_write_overwrites() {
        let mut storage = SqliteStorage::new(establish_test_connection().unwrap());
        storage.write("k", "[1]").unwrap();
        storage.write("k", "[2]").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_sqlite_value_survives_reopen() {
        let tmp = NamedTempFile::new().expect("Failed to create temp file");
        {
            let mut storage = SqliteStorage::new(establish_connection(tmp.path()).unwrap());
            storage.write("k", "saved").unwrap();
        }
        let storage = SqliteStorage::new(establish_connection(tmp.path()).unwrap());
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("saved"));
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::with_value("a", "1");
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("1"));
        storage.write("b", "2").unwrap();
        assert_eq!(storage.read("b").unwrap().as_deref(), Some("2"));
    }
}
