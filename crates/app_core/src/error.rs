//! Application error types

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (notify user, continue) =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Preferences error: {0}")]
    Preferences(String),

    #[error("Worker unavailable: {0}")]
    Worker(String),

    // ===== Fatal Errors (application termination) =====
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Io(_)
                | AppError::FileNotFound(_)
                | AppError::AccessDenied(_)
                | AppError::UnsupportedFormat(_)
                | AppError::ImageDecode(_)
                | AppError::Document(_)
                | AppError::Preferences(_)
                | AppError::Worker(_)
        )
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::FileNotFound(path) => format!("File not found: {}", path),
            AppError::AccessDenied(path) => format!("Access denied: {}", path),
            AppError::UnsupportedFormat(ext) => format!("Unsupported format: {}", ext),
            AppError::ImageDecode(msg) => format!("Cannot load image: {}", msg),
            AppError::Document(msg) => format!("Cannot open document: {}", msg),
            AppError::Preferences(msg) => format!("Could not save settings: {}", msg),
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::FsError> for AppError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::NotFound(p) => AppError::FileNotFound(p),
            app_fs::FsError::AccessDenied(p) => AppError::AccessDenied(p),
            app_fs::FsError::Io(e) => AppError::Io(e),
            other => AppError::UnsupportedFormat(other.to_string()),
        }
    }
}

impl From<app_db::DbError> for AppError {
    fn from(e: app_db::DbError) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::ImageDecode(e.to_string())
    }
}

impl From<pdfium_render::prelude::PdfiumError> for AppError {
    fn from(e: pdfium_render::prelude::PdfiumError) -> Self {
        AppError::Document(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_errors_are_recoverable() {
        let err: AppError = app_fs::FsError::NotFound("/x".into()).into();
        assert!(matches!(err, AppError::FileNotFound(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_database_errors_are_fatal() {
        let err: AppError = app_db::DbError::Pool("closed".into()).into();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_user_message_for_document() {
        let err = AppError::Document("bad xref".into());
        assert_eq!(err.user_message(), "Cannot open document: bad xref");
    }
}
