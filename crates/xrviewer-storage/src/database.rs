//! Database connection and operations

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::error::StorageError;
use crate::migrations::run_migrations;
use crate::Result;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode so readers never observe a half-applied consent write
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| read_setting(conn, key))
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.with_connection(|conn| write_setting(conn, key, value))
    }

    pub fn delete_setting(&self, key: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
            Ok(())
        })
    }

    /// Read a boolean setting, `None` when the key was never written
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get_setting(key)? {
            Some(value) => parse_bool(key, &value).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_setting(key, bool_str(value))
    }

    /// Write several boolean settings atomically
    pub fn set_bools(&self, entries: &[(&str, bool)]) -> Result<()> {
        self.transaction(|conn| {
            for (key, value) in entries {
                write_bool(conn, key, *value)?;
            }
            Ok(())
        })
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

/// Read a setting on an already-borrowed connection (usable inside transactions)
pub(crate) fn read_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

pub(crate) fn write_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let updated_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![key, value, updated_at],
    )?;
    Ok(())
}

/// Write a boolean setting on an already-borrowed connection, so callers can
/// group it with their own statements in one `Database::transaction`
pub fn write_bool(conn: &Connection, key: &str, value: bool) -> Result<()> {
    write_setting(conn, key, bool_str(value))
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(StorageError::InvalidValue {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            let count: i32 =
                conn.query_row("SELECT COUNT(*) FROM site_allowances", [], |row| row.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_bool_settings() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_bool("xr.minimal_enabled").unwrap(), None);

        db.set_bool("xr.minimal_enabled", true).unwrap();
        assert_eq!(db.get_bool("xr.minimal_enabled").unwrap(), Some(true));

        db.set_bools(&[("xr.minimal_enabled", false), ("xr.lite_mode_enabled", true)])
            .unwrap();
        assert_eq!(db.get_bool("xr.minimal_enabled").unwrap(), Some(false));
        assert_eq!(db.get_bool("xr.lite_mode_enabled").unwrap(), Some(true));

        db.delete_setting("xr.lite_mode_enabled").unwrap();
        assert_eq!(db.get_bool("xr.lite_mode_enabled").unwrap(), None);
    }

    #[test]
    fn test_invalid_bool_is_reported() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("xr.minimal_enabled", "YES").unwrap();

        let err = db.get_bool("xr.minimal_enabled").unwrap_err();
        assert!(matches!(err, StorageError::InvalidValue { .. }));
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        db.set_bool("xr.minimal_enabled", false).unwrap();

        let result: Result<()> = db.transaction(|conn| {
            write_setting(conn, "xr.minimal_enabled", "true")?;
            Err(StorageError::InvalidValue {
                key: "xr.minimal_enabled".to_string(),
                value: "abort".to_string(),
            })
        });

        assert!(result.is_err());
        assert_eq!(db.get_bool("xr.minimal_enabled").unwrap(), Some(false));
    }
}
