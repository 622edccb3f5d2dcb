//! Persisted user preferences
//!
//! Every preference lives under its own key. The root path and language are
//! plain strings; the favorites and ignore lists are JSON arrays. Mutators write
//! the backend first and only update the in-memory copy once the write has
//! succeeded, so memory never holds a value that failed to persist.

use crate::AppError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

pub const KEY_ROOT_PATH: &str = "manga-viewer-root-path";
pub const KEY_IGNORED_PATTERNS: &str = "manga-viewer-ignored-patterns";
pub const KEY_FAVORITES: &str = "manga-viewer-favorites";
pub const KEY_LANGUAGE: &str = "language";

pub const DEFAULT_LANGUAGE: &str = "ja";
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["ja", "en"];

/// Raw string storage underneath the preferences
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn put(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;
}

impl KeyValueBackend for app_db::PrefsDb {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(app_db::PrefsDb::get(self, key)?)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        Ok(app_db::PrefsDb::put(self, key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        app_db::PrefsDb::remove(self, key)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        Ok(app_db::PrefsDb::clear(self)?)
    }
}

/// Volatile backend for tests and for running without a database
#[derive(Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
    read_only: Mutex<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.lock() = read_only;
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if *self.read_only.lock() {
            Err(AppError::Preferences("backend is read-only".into()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.check_writable()?;
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.check_writable()?;
        self.values.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.check_writable()?;
        self.values.lock().clear();
        Ok(())
    }
}

/// In-memory view of the persisted preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub root_path: Option<String>,
    pub ignored_patterns: Vec<String>,
    pub favorite_paths: Vec<String>,
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            root_path: None,
            ignored_patterns: Vec::new(),
            favorite_paths: Vec::new(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Preferences plus the backend they are written through
pub struct PreferencesStore {
    backend: Box<dyn KeyValueBackend>,
    prefs: Preferences,
}

impl PreferencesStore {
    /// Read every key once; unreadable or malformed keys fall back to defaults
    pub fn load(backend: Box<dyn KeyValueBackend>) -> Self {
        let defaults = Preferences::default();

        let prefs = Preferences {
            root_path: load_raw(backend.as_ref(), KEY_ROOT_PATH).or(defaults.root_path),
            ignored_patterns: dedup(load_key(
                backend.as_ref(),
                KEY_IGNORED_PATTERNS,
                defaults.ignored_patterns,
            )),
            favorite_paths: dedup(load_key(backend.as_ref(), KEY_FAVORITES, defaults.favorite_paths)),
            language: load_raw(backend.as_ref(), KEY_LANGUAGE)
                .filter(|lang| {
                    let known = SUPPORTED_LANGUAGES.contains(&lang.as_str());
                    if !known {
                        tracing::warn!("Unknown stored language {}, using default", lang);
                    }
                    known
                })
                .unwrap_or(defaults.language),
        };

        tracing::info!(
            root = ?prefs.root_path,
            favorites = prefs.favorite_paths.len(),
            ignored = prefs.ignored_patterns.len(),
            language = %prefs.language,
            "Preferences loaded"
        );

        Self { backend, prefs }
    }

    pub fn get(&self) -> &Preferences {
        &self.prefs
    }

    pub fn is_favorite(&self, path: &str) -> bool {
        self.prefs.favorite_paths.iter().any(|p| p == path)
    }

    pub fn set_root_path(&mut self, path: Option<String>) -> Result<(), AppError> {
        match &path {
            Some(p) => save_raw(self.backend.as_ref(), KEY_ROOT_PATH, p)?,
            None => self.backend.remove(KEY_ROOT_PATH)?,
        }
        self.prefs.root_path = path;
        Ok(())
    }

    /// Returns `false` when the path was already a favorite
    pub fn add_favorite(&mut self, path: &str) -> Result<bool, AppError> {
        if self.is_favorite(path) {
            return Ok(false);
        }
        let mut next = self.prefs.favorite_paths.clone();
        next.push(path.to_string());
        save_key(self.backend.as_ref(), KEY_FAVORITES, &next)?;
        self.prefs.favorite_paths = next;
        Ok(true)
    }

    /// Returns `false` when the path was not a favorite
    pub fn remove_favorite(&mut self, path: &str) -> Result<bool, AppError> {
        if !self.is_favorite(path) {
            return Ok(false);
        }
        let next: Vec<String> = self
            .prefs
            .favorite_paths
            .iter()
            .filter(|p| p.as_str() != path)
            .cloned()
            .collect();
        save_key(self.backend.as_ref(), KEY_FAVORITES, &next)?;
        self.prefs.favorite_paths = next;
        Ok(true)
    }

    pub fn toggle_favorite(&mut self, path: &str) -> Result<bool, AppError> {
        if self.is_favorite(path) {
            self.remove_favorite(path)?;
            Ok(false)
        } else {
            self.add_favorite(path)?;
            Ok(true)
        }
    }

    /// Empty and duplicate patterns are ignored
    pub fn add_ignore_pattern(&mut self, pattern: &str) -> Result<bool, AppError> {
        if pattern.is_empty() || self.prefs.ignored_patterns.iter().any(|p| p == pattern) {
            return Ok(false);
        }
        let mut next = self.prefs.ignored_patterns.clone();
        next.push(pattern.to_string());
        save_key(self.backend.as_ref(), KEY_IGNORED_PATTERNS, &next)?;
        self.prefs.ignored_patterns = next;
        Ok(true)
    }

    pub fn remove_ignore_pattern(&mut self, pattern: &str) -> Result<bool, AppError> {
        if !self.prefs.ignored_patterns.iter().any(|p| p == pattern) {
            return Ok(false);
        }
        let next: Vec<String> = self
            .prefs
            .ignored_patterns
            .iter()
            .filter(|p| p.as_str() != pattern)
            .cloned()
            .collect();
        save_key(self.backend.as_ref(), KEY_IGNORED_PATTERNS, &next)?;
        self.prefs.ignored_patterns = next;
        Ok(true)
    }

    pub fn set_language(&mut self, language: &str) -> Result<(), AppError> {
        if !SUPPORTED_LANGUAGES.contains(&language) {
            return Err(AppError::Preferences(format!("unsupported language: {}", language)));
        }
        save_raw(self.backend.as_ref(), KEY_LANGUAGE, language)?;
        self.prefs.language = language.to_string();
        Ok(())
    }

    /// Wipe every stored key and return to defaults
    pub fn reset(&mut self) -> Result<(), AppError> {
        self.backend.clear()?;
        self.prefs = Preferences::default();
        tracing::info!("Preferences reset");
        Ok(())
    }
}

fn load_raw(backend: &dyn KeyValueBackend, key: &str) -> Option<String> {
    backend
        .get(key)
        .inspect_err(|e| tracing::warn!("Failed to read preference {}: {}", key, e))
        .ok()
        .flatten()
}

fn load_key<T: DeserializeOwned>(backend: &dyn KeyValueBackend, key: &str, default: T) -> T {
    let Some(raw) = load_raw(backend, key) else {
        return default;
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Malformed preference {}, using default: {}", key, e);
            default
        }
    }
}

fn save_raw(backend: &dyn KeyValueBackend, key: &str, value: &str) -> Result<(), AppError> {
    backend.put(key, value).inspect_err(|e| {
        tracing::error!("Failed to save preference {}: {}", key, e);
    })
}

fn save_key<T: Serialize + ?Sized>(
    backend: &dyn KeyValueBackend,
    key: &str,
    value: &T,
) -> Result<(), AppError> {
    let json = serde_json::to_string(value).map_err(|e| AppError::Preferences(e.to_string()))?;
    save_raw(backend, key, &json)
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Lets a test keep a handle on the backend after handing it to the store
    struct Shared(Arc<MemoryBackend>);

    impl KeyValueBackend for Shared {
        fn get(&self, key: &str) -> Result<Option<String>, AppError> {
            self.0.get(key)
        }
        fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
            self.0.put(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), AppError> {
            self.0.remove(key)
        }
        fn clear(&self) -> Result<(), AppError> {
            self.0.clear()
        }
    }

    fn store() -> (Arc<MemoryBackend>, PreferencesStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = PreferencesStore::load(Box::new(Shared(backend.clone())));
        (backend, store)
    }

    #[test]
    fn test_defaults_when_empty() {
        let (_, store) = store();
        assert_eq!(store.get(), &Preferences::default());
        assert_eq!(store.get().language, "ja");
    }

    #[test]
    fn test_favorites_are_deduplicated() {
        let (backend, mut store) = store();
        assert!(store.add_favorite("/books/a").unwrap());
        assert!(!store.add_favorite("/books/a").unwrap());
        assert_eq!(store.get().favorite_paths, vec!["/books/a"]);
        assert_eq!(backend.get(KEY_FAVORITES).unwrap().as_deref(), Some(r#"["/books/a"]"#));

        assert!(!store.remove_favorite("/books/zzz").unwrap());
        assert_eq!(store.get().favorite_paths, vec!["/books/a"]);

        assert!(!store.toggle_favorite("/books/a").unwrap());
        assert!(store.get().favorite_paths.is_empty());
    }

    #[test]
    fn test_ignore_patterns() {
        let (_, mut store) = store();
        assert!(!store.add_ignore_pattern("").unwrap());
        assert!(store.add_ignore_pattern("tmp").unwrap());
        assert!(!store.add_ignore_pattern("tmp").unwrap());
        assert!(store.add_ignore_pattern("B").unwrap());
        assert_eq!(store.get().ignored_patterns, vec!["tmp", "B"]);

        assert!(store.remove_ignore_pattern("tmp").unwrap());
        assert_eq!(store.get().ignored_patterns, vec!["B"]);
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let (backend, mut store) = store();
        store.add_favorite("/a").unwrap();

        backend.set_read_only(true);
        assert!(store.add_favorite("/b").is_err());
        assert!(store.set_root_path(Some("/root".into())).is_err());
        assert_eq!(store.get().favorite_paths, vec!["/a"]);
        assert_eq!(store.get().root_path, None);
    }

    #[test]
    fn test_values_survive_reload() {
        let backend = Arc::new(MemoryBackend::new());
        {
            let mut store = PreferencesStore::load(Box::new(Shared(backend.clone())));
            store.set_root_path(Some("C:/Manga".into())).unwrap();
            store.set_language("en").unwrap();
            store.add_favorite("C:/Manga/One").unwrap();
        }
        let store = PreferencesStore::load(Box::new(Shared(backend)));
        assert_eq!(store.get().root_path.as_deref(), Some("C:/Manga"));
        assert_eq!(store.get().language, "en");
        assert!(store.is_favorite("C:/Manga/One"));
    }

    #[test]
    fn test_root_and_language_stored_as_plain_strings() {
        let (backend, mut store) = store();
        store.set_root_path(Some("C:/Manga".into())).unwrap();
        store.set_language("en").unwrap();
        assert_eq!(backend.get(KEY_ROOT_PATH).unwrap().as_deref(), Some("C:/Manga"));
        assert_eq!(backend.get(KEY_LANGUAGE).unwrap().as_deref(), Some("en"));

        // Unquoted values load as-is
        let backend = Arc::new(MemoryBackend::new());
        backend.put(KEY_ROOT_PATH, "/srv/comics").unwrap();
        backend.put(KEY_LANGUAGE, "en").unwrap();
        let store = PreferencesStore::load(Box::new(Shared(backend.clone())));
        assert_eq!(store.get().root_path.as_deref(), Some("/srv/comics"));
        assert_eq!(store.get().language, "en");

        backend.put(KEY_LANGUAGE, "fr").unwrap();
        let store = PreferencesStore::load(Box::new(Shared(backend)));
        assert_eq!(store.get().language, "ja");
    }

    #[test]
    fn test_malformed_json_falls_back_per_key() {
        let backend = Arc::new(MemoryBackend::new());
        backend.put(KEY_FAVORITES, "{not json").unwrap();
        backend.put(KEY_IGNORED_PATTERNS, r#"["x","x","y"]"#).unwrap();

        let store = PreferencesStore::load(Box::new(Shared(backend)));
        assert!(store.get().favorite_paths.is_empty());
        assert_eq!(store.get().ignored_patterns, vec!["x", "y"]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (backend, mut store) = store();
        store.set_root_path(Some("/r".into())).unwrap();
        store.add_ignore_pattern("p").unwrap();
        store.reset().unwrap();

        assert_eq!(store.get(), &Preferences::default());
        assert_eq!(backend.get(KEY_ROOT_PATH).unwrap(), None);
    }

    #[test]
    fn test_unsupported_language_rejected() {
        let (_, mut store) = store();
        assert!(store.set_language("xx").is_err());
        assert_eq!(store.get().language, "ja");
    }

    #[test]
    fn test_sqlite_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = app_db::open(&dir.path().join("prefs.db")).unwrap();
        {
            let mut store = PreferencesStore::load(Box::new(db.clone()));
            store.add_ignore_pattern("draft").unwrap();
        }
        let store = PreferencesStore::load(Box::new(db));
        assert_eq!(store.get().ignored_patterns, vec!["draft"]);
    }
}
