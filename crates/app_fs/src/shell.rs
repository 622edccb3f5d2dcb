//! Native file manager integration

use std::path::Path;

/// Open `path` with the platform's default handler (a folder opens in the
/// file manager). Fire-and-forget: failures are logged, not returned.
#[cfg(feature = "open-external")]
pub fn open_in_file_manager<P: AsRef<Path>>(path: P) {
    let path = path.as_ref();
    tracing::info!("Opening path: {}", path.display());

    if let Err(e) = open::that_detached(path) {
        tracing::error!(path = %path.display(), "Failed to open path: {}", e);
    }
}

#[cfg(not(feature = "open-external"))]
pub fn open_in_file_manager<P: AsRef<Path>>(path: P) {
    tracing::warn!(
        "Opening external paths is disabled in this build: {}",
        path.as_ref().display()
    );
}
