//! Application configuration
//!
//! Tunables only. The user's library preferences (root folder, favorites,
//! ignore list, language) are stored by [`crate::preferences`].

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub window: WindowConfig,
    pub library: LibraryConfig,
    pub reader: ReaderConfig,
    pub thumbnails: ThumbnailConfig,
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            window: WindowConfig::default(),
            library: LibraryConfig::default(),
            reader: ReaderConfig::default(),
            thumbnails: ThumbnailConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub theme: String,
    pub start_maximized: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            start_maximized: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Grid cells are never narrower than this
    pub min_column_width: f32,
    pub list_row_height: f32,
    pub view_mode: ViewMode,
    pub sort_order: SortOrder,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            min_column_width: 200.0,
            list_row_height: 70.0,
            view_mode: ViewMode::Grid,
            sort_order: SortOrder::Ascending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub boundary_flash_ms: u64,
    pub wheel_cooldown_ms: u64,
    pub controls_hide_ms: u64,
    pub index_columns: usize,
    /// Pages rendered ahead of the current one
    pub preload_count: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            boundary_flash_ms: 1000,
            wheel_cooldown_ms: 300,
            controls_hide_ms: 3000,
            index_columns: 8,
            preload_count: 2,
        }
    }
}

impl ReaderConfig {
    pub fn timings(&self) -> crate::reader::ReaderTimings {
        crate::reader::ReaderTimings {
            boundary_flash: Duration::from_millis(self.boundary_flash_ms),
            wheel_cooldown: Duration::from_millis(self.wheel_cooldown_ms),
        }
    }

    pub fn controls_hide_after(&self) -> Duration {
        Duration::from_millis(self.controls_hide_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    pub debounce_ms: u64,
    pub memory_cache_entries: usize,
    /// Longest edge of a decoded thumbnail, in pixels
    pub max_dimension: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            memory_cache_entries: 256,
            max_dimension: 400,
        }
    }
}

impl ThumbnailConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "grid")]
    Grid,
    #[serde(rename = "list")]
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }
}

impl AppConfig {
    /// Load configuration from the per-user config file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the per-user config file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "AzamiReader", "AzamiReader")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    use crate::command::CommandId;

    let mut kb = HashMap::new();

    // Reader
    kb.insert(CommandId::READER_NEXT.into(), vec!["Right".into(), "Space".into()]);
    kb.insert(CommandId::READER_PREV.into(), vec!["Left".into()]);
    kb.insert(CommandId::READER_BACK.into(), vec!["Escape".into()]);
    kb.insert(CommandId::READER_TOGGLE_INDEX.into(), vec!["i".into()]);

    // View / app
    kb.insert(CommandId::VIEW_TOGGLE_FULLSCREEN.into(), vec!["F11".into()]);
    kb.insert(CommandId::APP_OPEN_SETTINGS.into(), vec!["Ctrl+Comma".into()]);
    kb.insert(CommandId::LIBRARY_RELOAD.into(), vec!["F5".into()]);

    kb
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.window.width, 1200);
        assert_eq!(config.library.min_column_width, 200.0);
        assert_eq!(config.reader.index_columns, 8);
        assert!(config.keybindings.contains_key("reader.next"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reader]\nwheel_cooldown_ms = 500\n\n[library]\nview_mode = \"list\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.reader.wheel_cooldown_ms, 500);
        assert_eq!(config.reader.boundary_flash_ms, 1000);
        assert_eq!(config.library.view_mode, ViewMode::List);
        assert_eq!(config.thumbnails.debounce_ms, 300);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.library.sort_order = SortOrder::Descending;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.library.sort_order, SortOrder::Descending);
    }
}
