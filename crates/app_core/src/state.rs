//! Application state management
//!
//! Built once in `main`, in dependency order, and handed to the UI by
//! reference. Nothing here is global.

use crate::command::KeyMap;
use crate::events::{AppEvent, EventBus};
use crate::i18n::I18n;
use crate::listing::ListingLoader;
use crate::preferences::{KeyValueBackend, MemoryBackend, PreferencesStore, DEFAULT_LANGUAGE};
use crate::render::RenderWorker;
use crate::{AppConfig, AppError};

/// Main application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Persisted user preferences
    pub preferences: PreferencesStore,

    pub i18n: I18n,

    pub keymap: KeyMap,

    /// Window notifications (fullscreen / maximize)
    pub events: EventBus<AppEvent>,

    /// Image and PDF decoding thread
    pub render: RenderWorker,

    /// Blocking pool for directory reads
    runtime: tokio::runtime::Runtime,
}

impl AppState {
    /// Open the preferences database and build the state on top of it.
    /// A database that cannot be opened degrades to in-memory preferences.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let backend: Box<dyn KeyValueBackend> = match app_db::init() {
            Ok(db) => Box::new(db),
            Err(e) => {
                tracing::error!("Preferences database unavailable, settings will not persist: {}", e);
                Box::new(MemoryBackend::new())
            }
        };
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: AppConfig, backend: Box<dyn KeyValueBackend>) -> Result<Self, AppError> {
        let preferences = PreferencesStore::load(backend);

        let i18n = I18n::with_embedded(&preferences.get().language)
            .map_err(|e| AppError::Init(format!("localization: {}", e)))?;

        let keymap = KeyMap::from_config(&config.keybindings);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(4)
            .thread_name("fs-worker")
            .build()
            .map_err(|e| AppError::Init(format!("runtime: {}", e)))?;

        let render = RenderWorker::spawn()?;

        Ok(Self {
            config,
            preferences,
            i18n,
            keymap,
            events: EventBus::new(),
            render,
            runtime,
        })
    }

    pub fn listing_loader(&self) -> ListingLoader {
        ListingLoader::new(self.runtime.handle().clone())
    }

    /// Persist the language, then switch the UI to it
    pub fn set_language(&mut self, language: &str) -> Result<(), AppError> {
        self.preferences.set_language(language)?;
        self.i18n.set_locale(language);
        Ok(())
    }

    /// Clear every preference and return to the default language
    pub fn reset_preferences(&mut self) -> Result<(), AppError> {
        self.preferences.reset()?;
        self.i18n.set_locale(DEFAULT_LANGUAGE);
        Ok(())
    }

    /// Save the current configuration
    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::with_backend(AppConfig::default(), Box::new(MemoryBackend::new())).unwrap()
    }

    #[test]
    fn test_language_follows_preferences() {
        let mut state = state();
        assert_eq!(state.i18n.current_locale(), "ja");

        state.set_language("en").unwrap();
        assert_eq!(state.i18n.current_locale(), "en");
        assert_eq!(state.preferences.get().language, "en");

        state.reset_preferences().unwrap();
        assert_eq!(state.i18n.current_locale(), "ja");
    }

    #[test]
    fn test_rejected_language_changes_nothing() {
        let mut state = state();
        assert!(state.set_language("xx").is_err());
        assert_eq!(state.i18n.current_locale(), "ja");
    }
}
