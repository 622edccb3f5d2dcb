//! Database schema

use crate::{DbError, DbPool, Result};

const SCHEMA_VERSION: i32 = 1;

/// Create tables if needed and stamp the schema version
pub fn migrate(pool: &DbPool) -> Result<()> {
    let conn = pool.get().map_err(|e| DbError::Pool(e.to_string()))?;

    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap_or(0);

    if current_version > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "database version {} is newer than supported version {}",
            current_version, SCHEMA_VERSION
        )));
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            "Migrating database from version {} to {}",
            current_version,
            SCHEMA_VERSION
        );
        apply_v1(&conn)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
    }

    Ok(())
}

fn apply_v1(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_pool;
    use tempfile::NamedTempFile;

    #[test]
    fn test_migration_is_repeatable() {
        let temp_file = NamedTempFile::new().unwrap();
        let pool = init_pool(temp_file.path()).unwrap();
        assert!(migrate(&pool).is_ok());
        assert!(migrate(&pool).is_ok());

        let conn = pool.get().unwrap();
        let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0)).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
