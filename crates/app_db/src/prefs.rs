//! Key/value preference rows

use crate::{DbError, DbPool, Result};
use rusqlite::OptionalExtension;

/// Preference rows keyed by name
#[derive(Clone)]
pub struct PrefsDb {
    pool: DbPool,
}

impl PrefsDb {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>> {
        self.pool.get().map_err(|e| DbError::Pool(e.to_string()))
    }

    /// Read the raw value stored under `key`
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or replace the value under `key`
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO preferences (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%s', 'now')
            "#,
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    /// Delete `key`; returns whether a row existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let n = conn.execute("DELETE FROM preferences WHERE key = ?1", [key])?;
        Ok(n > 0)
    }

    /// Delete every preference
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM preferences", [])?;
        tracing::info!("All preferences cleared");
        Ok(())
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM preferences ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, PrefsDb) {
        let dir = TempDir::new().unwrap();
        let db = crate::open(&dir.path().join("prefs.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_put_get_overwrite() {
        let (_dir, db) = open_temp();
        assert_eq!(db.get("language").unwrap(), None);

        db.put("language", "\"ja\"").unwrap();
        db.put("language", "\"en\"").unwrap();
        assert_eq!(db.get("language").unwrap().as_deref(), Some("\"en\""));
    }

    #[test]
    fn test_keys_are_independent() {
        let (_dir, db) = open_temp();
        db.put("a", "1").unwrap();
        db.put("b", "2").unwrap();

        assert!(db.remove("a").unwrap());
        assert!(!db.remove("a").unwrap());
        assert_eq!(db.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(db.keys().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn test_clear_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.db");
        {
            let db = crate::open(&path).unwrap();
            db.put("root", "\"/books\"").unwrap();
        }
        let db = crate::open(&path).unwrap();
        assert_eq!(db.get("root").unwrap().as_deref(), Some("\"/books\""));

        db.clear().unwrap();
        assert!(db.keys().unwrap().is_empty());
    }
}
