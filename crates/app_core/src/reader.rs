//! Reader navigation state machine
//!
//! Times are passed in by the caller, so the machine never reads a clock.

use crate::command::Command;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What a reader session is paging through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderSource {
    /// Naturally sorted image files of one folder
    Images(Vec<PathBuf>),
    /// A PDF; its page count arrives once the document is open
    Document(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    ImageSequence,
    PaginatedDocument,
}

impl ReaderSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ReaderSource::Images(_) => SourceKind::ImageSequence,
            ReaderSource::Document(_) => SourceKind::PaginatedDocument,
        }
    }

    /// Image file for page `index`, if this is an image sequence
    pub fn image(&self, index: usize) -> Option<&Path> {
        match self {
            ReaderSource::Images(pages) => pages.get(index).map(PathBuf::as_path),
            ReaderSource::Document(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    First,
    Last,
}

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(usize),
    /// Already at an edge; the flash is now showing
    Flashed(Boundary),
    /// Swallowed (overlay open, wheel cooldown, or no pages yet)
    Ignored,
}

/// Something the reader asks its host to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderAction {
    None,
    BackToLibrary,
}

#[derive(Debug, Clone, Copy)]
pub struct ReaderTimings {
    pub boundary_flash: Duration,
    pub wheel_cooldown: Duration,
}

impl Default for ReaderTimings {
    fn default() -> Self {
        Self {
            boundary_flash: Duration::from_millis(1000),
            wheel_cooldown: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Flash {
    edge: Boundary,
    until: Instant,
}

/// One open book
#[derive(Debug)]
pub struct ReaderSession {
    source: ReaderSource,
    total_pages: usize,
    current_index: usize,
    overlay_open: bool,
    flash: Option<Flash>,
    last_wheel: Option<Instant>,
    timings: ReaderTimings,
}

impl ReaderSession {
    pub fn new(source: ReaderSource, timings: ReaderTimings) -> Self {
        let total_pages = match &source {
            ReaderSource::Images(pages) => pages.len(),
            ReaderSource::Document(_) => 0,
        };

        Self {
            source,
            total_pages,
            current_index: 0,
            overlay_open: false,
            flash: None,
            last_wheel: None,
            timings,
        }
    }

    pub fn source(&self) -> &ReaderSource {
        &self.source
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay_open
    }

    /// Document page count, once known
    pub fn set_page_count(&mut self, count: usize) {
        self.total_pages = count;
        self.current_index = self.current_index.min(count.saturating_sub(1));
    }

    pub fn next(&mut self, now: Instant) -> Step {
        if self.overlay_open || self.total_pages == 0 {
            return Step::Ignored;
        }
        if self.current_index + 1 < self.total_pages {
            self.current_index += 1;
            Step::Moved(self.current_index)
        } else {
            self.flash(Boundary::Last, now)
        }
    }

    pub fn prev(&mut self, now: Instant) -> Step {
        if self.overlay_open || self.total_pages == 0 {
            return Step::Ignored;
        }
        if self.current_index > 0 {
            self.current_index -= 1;
            Step::Moved(self.current_index)
        } else {
            self.flash(Boundary::First, now)
        }
    }

    /// Go to `index` (clamped) and close the index overlay
    pub fn jump(&mut self, index: usize) {
        self.current_index = index.min(self.total_pages.saturating_sub(1));
        self.overlay_open = false;
    }

    fn flash(&mut self, edge: Boundary, now: Instant) -> Step {
        self.flash = Some(Flash {
            edge,
            until: now + self.timings.boundary_flash,
        });
        Step::Flashed(edge)
    }

    /// Edge message to show at `now`, if any
    pub fn active_flash(&self, now: Instant) -> Option<Boundary> {
        self.flash.filter(|f| now < f.until).map(|f| f.edge)
    }

    /// When the current edge message disappears
    pub fn flash_deadline(&self) -> Option<Instant> {
        self.flash.map(|f| f.until)
    }

    pub fn open_overlay(&mut self) {
        self.overlay_open = true;
    }

    pub fn close_overlay(&mut self) {
        self.overlay_open = false;
    }

    pub fn toggle_overlay(&mut self) {
        self.overlay_open = !self.overlay_open;
    }

    /// Click on the page: right half goes forward, left half back
    pub fn on_click(&mut self, click_x: f32, page_width: f32, now: Instant) -> Step {
        if click_x > page_width / 2.0 {
            self.next(now)
        } else {
            self.prev(now)
        }
    }

    /// Wheel down goes forward; transitions are at least one cooldown apart
    pub fn on_wheel(&mut self, delta_y: f32, now: Instant) -> Step {
        if self.overlay_open || delta_y == 0.0 {
            return Step::Ignored;
        }
        if let Some(last) = self.last_wheel {
            if now.saturating_duration_since(last) < self.timings.wheel_cooldown {
                return Step::Ignored;
            }
        }

        self.last_wheel = Some(now);
        if delta_y > 0.0 {
            self.next(now)
        } else {
            self.prev(now)
        }
    }

    /// Keyboard commands. Only `ReaderBack` does anything while the overlay is open.
    pub fn on_command(&mut self, command: Command, now: Instant) -> ReaderAction {
        if self.overlay_open {
            if matches!(command, Command::ReaderBack | Command::ReaderToggleIndex) {
                self.close_overlay();
            }
            return ReaderAction::None;
        }

        match command {
            Command::ReaderNext => {
                self.next(now);
            }
            Command::ReaderPrev => {
                self.prev(now);
            }
            Command::ReaderToggleIndex => self.open_overlay(),
            Command::ReaderBack => return ReaderAction::BackToLibrary,
            _ => {}
        }
        ReaderAction::None
    }

    /// Fraction of the book read, `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        if self.total_pages == 0 {
            0.0
        } else {
            (self.current_index + 1) as f32 / self.total_pages as f32
        }
    }

    /// Pages worth rendering ahead of the current one
    pub fn preload_range(&self, count: usize) -> Range<usize> {
        let start = (self.current_index + 1).min(self.total_pages);
        start..(start + count).min(self.total_pages)
    }
}
