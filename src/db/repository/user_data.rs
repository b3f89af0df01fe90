use rusqlite::{Connection, OptionalExtension};

use crate::db::DatabaseError;

/// Get a raw dataset value by key. Returns None if not set.
pub fn get_dataset(conn: &Connection, key: &str) -> Result<Option<String>, DatabaseError> {
    conn.query_row(
        "SELECT value FROM user_datasets WHERE key = ?1",
        [key],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Insert or overwrite a dataset value.
pub fn set_dataset(conn: &Connection, key: &str, value: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO user_datasets (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        [key, value],
    )?;
    Ok(())
}

/// Delete a dataset. Deleting a missing key is not an error.
pub fn delete_dataset(conn: &Connection, key: &str) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM user_datasets WHERE key = ?1", [key])?;
    Ok(())
}
