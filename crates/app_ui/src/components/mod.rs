//! UI Components

pub mod header;
pub mod title_bar;
pub mod library_view;
pub mod context_menu;
pub mod reader_view;
pub mod settings;
pub mod dialogs;
pub mod thumbnail;

pub use header::{Header, HeaderAction, HeaderState};
pub use title_bar::{TitleBar, TITLE_BAR_HEIGHT};
pub use library_view::{LibraryAction, LibraryProps, LibraryView};
pub use context_menu::{ContextAction, ContextMenu};
pub use reader_view::{DocumentState, ReaderView};
pub use settings::{SettingsAction, SettingsDialog};
pub use dialogs::{pick_directory, ConfirmDialog, Dialog, DialogResult};
