//! Azami Reader core domain logic
//!
//! This crate contains:
//! - Configuration and persisted preferences
//! - Library filtering/sorting and virtualized layout math
//! - The reader navigation state machine
//! - Background work: directory listings, the render worker, thumbnails
//! - Localization, commands, window events

pub mod state;
pub mod config;
pub mod command;
pub mod error;
pub mod preferences;
pub mod library;
pub mod layout;
pub mod reader;
pub mod debounce;
pub mod events;
pub mod listing;
pub mod render;
pub mod thumbnail_manager;
pub mod i18n;
pub mod window;

pub use state::AppState;
pub use config::{
    AppConfig, GeneralConfig, WindowConfig, LibraryConfig, ReaderConfig, ThumbnailConfig,
    SortOrder, ViewMode,
};
pub use command::{Command, CommandId, KeyMap};
pub use error::AppError;
pub use preferences::{KeyValueBackend, MemoryBackend, Preferences, PreferencesStore};
pub use library::{filter_entries, LibraryModel, LibraryQuery};
pub use layout::{visible_range, GridLayout, ListLayout, ScrollMemory};
pub use reader::{Boundary, ReaderAction, ReaderSession, ReaderSource, ReaderTimings, SourceKind, Step};
pub use debounce::Debouncer;
pub use events::{AppEvent, EventBus, Subscription};
pub use listing::{Listing, ListingLoader, ListingResult, ListingTicket, ListingTracker};
pub use render::{Priority, RenderEvent, RenderRequest, RenderTarget, RenderWorker, RenderedImage};
pub use thumbnail_manager::{ThumbnailManager, ThumbnailState};
pub use i18n::I18n;
pub use window::{WindowCommand, WindowState};
