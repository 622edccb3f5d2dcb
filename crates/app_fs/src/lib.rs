//! Azami Reader file system layer
//!
//! Provides:
//! - Library listing: one level of subdirectories and PDF files per root
//! - Page listing: naturally sorted images inside a folder
//! - Natural (numeric-aware, case- and accent-insensitive) string ordering
//! - `media:` URL encoding/resolution for local resources
//! - Opening paths in the native file manager

mod natural;
mod library;
mod media;
mod shell;

pub use natural::{natural_cmp, natural_sort};
pub use library::{
    LibraryEntry, list_entries, read_entries, list_pages, read_pages,
    is_image_file, is_pdf_file, IMAGE_EXTENSIONS,
};
pub use media::{MediaResponse, encode_media_url, decode_media_url, fetch_media, MEDIA_SCHEME};
pub use shell::open_in_file_manager;

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Malformed media URL: {0}")]
    MalformedUrl(String),
}

impl FsError {
    /// Classify an io error for a given path
    pub fn from_io(path: &std::path::Path, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.display().to_string()),
            std::io::ErrorKind::PermissionDenied => FsError::AccessDenied(path.display().to_string()),
            _ => FsError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;
