use rusqlite::{Connection, Result};
use std::path::Path;

const CREATE_KV_STORE: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";

pub fn establish_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute(CREATE_KV_STORE, [])?;
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute(CREATE_KV_STORE, [])?;
    Ok(conn)
}
