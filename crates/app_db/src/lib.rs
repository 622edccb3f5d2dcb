//! Azami Reader persistence layer
//!
//! A single SQLite file holds the user's preferences as independent
//! key/value rows. Values are opaque strings (JSON-encoded by the caller).

mod prefs;
mod schema;
mod pool;

pub use prefs::PrefsDb;
pub use pool::DbPool;
pub use schema::migrate;

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Get the database directory
pub fn db_dir() -> PathBuf {
    ProjectDirs::from("com", "AzamiReader", "AzamiReader")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Open the preferences database in the per-user data directory
pub fn init() -> Result<PrefsDb> {
    let dir = db_dir();
    std::fs::create_dir_all(&dir)?;
    open(&dir.join("preferences.db"))
}

/// Open (and migrate) a preferences database at `path`
pub fn open(path: &Path) -> Result<PrefsDb> {
    let pool = pool::init_pool(path)?;
    migrate(&pool)?;

    tracing::info!("Preferences database opened at {:?}", path);
    Ok(PrefsDb::new(pool))
}
