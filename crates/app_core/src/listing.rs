//! Background directory listing with stale-result rejection
//!
//! Each request takes a ticket from a [`ListingTracker`]. Only results
//! carrying the latest ticket of their kind reach the UI, so a slow read of
//! an old folder can never overwrite a newer one.

use app_fs::LibraryEntry;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListingTicket(u64);

/// Hands out tickets; only the newest is current
#[derive(Debug, Default)]
pub struct ListingTracker {
    latest: u64,
}

impl ListingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> ListingTicket {
        self.latest += 1;
        ListingTicket(self.latest)
    }

    pub fn is_current(&self, ticket: ListingTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Make every outstanding ticket stale
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

#[derive(Debug, Clone)]
pub enum Listing {
    Library(Vec<LibraryEntry>),
    Pages(Vec<PathBuf>),
}

#[derive(Debug, Clone)]
pub struct ListingResult {
    pub ticket: ListingTicket,
    pub path: PathBuf,
    pub listing: Listing,
}

/// Runs `list_entries` / `list_pages` on tokio's blocking pool
pub struct ListingLoader {
    runtime: Handle,
    tx: Sender<ListingResult>,
    rx: Receiver<ListingResult>,
    library: ListingTracker,
    pages: ListingTracker,
}

impl ListingLoader {
    pub fn new(runtime: Handle) -> Self {
        let (tx, rx) = unbounded();
        Self {
            runtime,
            tx,
            rx,
            library: ListingTracker::new(),
            pages: ListingTracker::new(),
        }
    }

    pub fn request_library(&mut self, root: &Path) -> ListingTicket {
        let ticket = self.library.issue();
        self.spawn(ticket, root.to_path_buf(), |p| Listing::Library(app_fs::list_entries(p)));
        ticket
    }

    pub fn request_pages(&mut self, folder: &Path) -> ListingTicket {
        let ticket = self.pages.issue();
        self.spawn(ticket, folder.to_path_buf(), |p| Listing::Pages(app_fs::list_pages(p)));
        ticket
    }

    /// Forget any page listing in flight (the reader was closed)
    pub fn cancel_pages(&mut self) {
        self.pages.invalidate();
    }

    fn spawn(&self, ticket: ListingTicket, path: PathBuf, list: fn(&Path) -> Listing) {
        let tx = self.tx.clone();
        tracing::debug!(path = %path.display(), ?ticket, "Listing requested");

        self.runtime.spawn_blocking(move || {
            let listing = list(&path);
            let _ = tx.send(ListingResult { ticket, path, listing });
        });
    }

    fn is_current(&self, result: &ListingResult) -> bool {
        let current = match result.listing {
            Listing::Library(_) => self.library.is_current(result.ticket),
            Listing::Pages(_) => self.pages.is_current(result.ticket),
        };
        if !current {
            tracing::debug!(path = %result.path.display(), "Discarding stale listing");
        }
        current
    }

    /// Current results that have arrived so far
    pub fn poll(&self) -> Vec<ListingResult> {
        self.rx.try_iter().filter(|r| self.is_current(r)).collect()
    }

    /// Block until a current result arrives or `timeout` passes
    pub fn wait(&self, timeout: Duration) -> Option<ListingResult> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(result) if self.is_current(&result) => return Some(result),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let mut tracker = ListingTracker::new();
        let first = tracker.issue();
        let second = tracker.issue();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
        tracker.invalidate();
        assert!(!tracker.is_current(second));
    }

    #[test]
    fn test_stale_library_listing_is_dropped() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let old = TempDir::new().unwrap();
        let new = TempDir::new().unwrap();
        fs::create_dir(old.path().join("Old")).unwrap();
        fs::create_dir(new.path().join("New")).unwrap();

        let mut loader = ListingLoader::new(runtime.handle().clone());
        loader.request_library(old.path());
        let ticket = loader.request_library(new.path());

        let result = loader.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(result.ticket, ticket);
        match result.listing {
            Listing::Library(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].name, "New");
            }
            other => panic!("unexpected listing: {:?}", other),
        }
    }

    #[test]
    fn test_page_listing_is_independent_of_library() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("p10.png"), b"x").unwrap();
        fs::write(dir.path().join("p2.png"), b"x").unwrap();

        let mut loader = ListingLoader::new(runtime.handle().clone());
        loader.request_library(dir.path());
        loader.request_pages(dir.path());

        let mut saw_pages = false;
        for _ in 0..2 {
            if let Some(ListingResult { listing: Listing::Pages(pages), .. }) =
                loader.wait(Duration::from_secs(5))
            {
                let names: Vec<_> = pages
                    .iter()
                    .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                    .collect();
                assert_eq!(names, ["p2.png", "p10.png"]);
                saw_pages = true;
            }
        }
        assert!(saw_pages);
    }

    #[test]
    fn test_cancelled_pages_never_arrive() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = TempDir::new().unwrap();

        let mut loader = ListingLoader::new(runtime.handle().clone());
        loader.request_pages(dir.path());
        loader.cancel_pages();
        assert!(loader.wait(Duration::from_millis(300)).is_none());
    }
}
