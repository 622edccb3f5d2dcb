//! Library filter/sort pipeline
//!
//! The listing from disk is never modified; each change to the query
//! produces a fresh derived view.

use crate::config::{SortOrder, ViewMode};
use crate::preferences::Preferences;
use app_fs::{natural_cmp, LibraryEntry};

/// Everything that shapes the visible library
#[derive(Debug, Clone, Copy)]
pub struct LibraryQuery<'a> {
    pub search: &'a str,
    pub ignored_patterns: &'a [String],
    pub favorites_only: bool,
    pub favorites: &'a [String],
    pub sort_order: SortOrder,
}

impl<'a> LibraryQuery<'a> {
    /// Does any filter hide entries (used to pick the empty-state message)
    pub fn is_filtering(&self) -> bool {
        !self.search.is_empty() || self.favorites_only
    }

    fn matches(&self, entry: &LibraryEntry, search_lower: &str) -> bool {
        if !search_lower.is_empty() && !entry.name.to_lowercase().contains(search_lower) {
            return false;
        }
        if self
            .ignored_patterns
            .iter()
            .any(|p| !p.is_empty() && entry.name.contains(p.as_str()))
        {
            return false;
        }
        if self.favorites_only {
            let key = entry.path_key();
            return self.favorites.iter().any(|f| *f == key);
        }
        true
    }
}

/// Filter then sort `entries` by `query`
pub fn filter_entries(entries: &[LibraryEntry], query: &LibraryQuery<'_>) -> Vec<LibraryEntry> {
    let search_lower = query.search.to_lowercase();

    let mut visible: Vec<LibraryEntry> = entries
        .iter()
        .filter(|e| query.matches(e, &search_lower))
        .cloned()
        .collect();

    visible.sort_by(|a, b| {
        let ord = natural_cmp(&a.name, &b.name);
        match query.sort_order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });

    visible
}

/// Library screen state: the raw listing plus the view-shaping inputs,
/// with the filtered result cached until an input changes
#[derive(Debug)]
pub struct LibraryModel {
    entries: Vec<LibraryEntry>,
    loading: bool,
    pub search: String,
    favorites_only: bool,
    sort_order: SortOrder,
    view_mode: ViewMode,
    visible: Vec<LibraryEntry>,
    dirty: bool,
    last_search: String,
}

impl LibraryModel {
    pub fn new(sort_order: SortOrder, view_mode: ViewMode) -> Self {
        Self {
            entries: Vec::new(),
            loading: false,
            search: String::new(),
            favorites_only: false,
            sort_order,
            view_mode,
            visible: Vec::new(),
            dirty: true,
            last_search: String::new(),
        }
    }

    /// A listing was requested; the old entries stay until it arrives
    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    pub fn set_entries(&mut self, entries: Vec<LibraryEntry>) {
        self.entries = entries;
        self.loading = false;
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.set_entries(Vec::new());
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn toggle_favorites_only(&mut self) {
        self.favorites_only = !self.favorites_only;
        self.dirty = true;
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggled();
        self.dirty = true;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
    }

    /// Favorites or ignore patterns changed
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Is a search or favorites filter narrowing the view
    pub fn is_filtering(&self) -> bool {
        !self.search.is_empty() || self.favorites_only
    }

    /// Entries to show, recomputed only when an input changed
    pub fn visible(&mut self, prefs: &Preferences) -> &[LibraryEntry] {
        if self.dirty || self.search != self.last_search {
            let query = LibraryQuery {
                search: &self.search,
                ignored_patterns: &prefs.ignored_patterns,
                favorites_only: self.favorites_only,
                favorites: &prefs.favorite_paths,
                sort_order: self.sort_order,
            };
            self.visible = filter_entries(&self.entries, &query);
            self.last_search = self.search.clone();
            self.dirty = false;
        }
        &self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn folder(name: &str, has_image: bool) -> LibraryEntry {
        let path = PathBuf::from("/root").join(name);
        LibraryEntry {
            name: name.to_string(),
            thumbnail: has_image.then(|| path.join("001.jpg")),
            path,
            is_file: false,
        }
    }

    fn listing() -> Vec<LibraryEntry> {
        vec![
            folder("B", true),
            folder("A", false),
            folder("Ch10", true),
            folder("Ch2", true),
        ]
    }

    fn query<'a>(ignored: &'a [String], favorites: &'a [String]) -> LibraryQuery<'a> {
        LibraryQuery {
            search: "",
            ignored_patterns: ignored,
            favorites_only: false,
            favorites,
            sort_order: SortOrder::Ascending,
        }
    }

    fn names(entries: &[LibraryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_natural_ascending_and_selectable() {
        let entries = listing();
        let out = filter_entries(&entries, &query(&[], &[]));
        assert_eq!(names(&out), ["A", "B", "Ch2", "Ch10"]);
        assert!(!out[0].is_selectable());
        assert!(out[1].is_selectable());
    }

    #[test]
    fn test_descending_is_reverse() {
        let entries = listing();
        let mut q = query(&[], &[]);
        let asc = filter_entries(&entries, &q);
        q.sort_order = SortOrder::Descending;
        let mut desc = filter_entries(&entries, &q);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_ignore_pattern_is_case_sensitive_substring() {
        let entries = listing();
        let ignored = vec!["B".to_string()];
        let out = filter_entries(&entries, &query(&ignored, &[]));
        assert_eq!(names(&out), ["A", "Ch2", "Ch10"]);

        let ignored = vec!["b".to_string()];
        let out = filter_entries(&entries, &query(&ignored, &[]));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let entries = listing();
        let mut q = query(&[], &[]);
        q.search = "ch";
        assert_eq!(names(&filter_entries(&entries, &q)), ["Ch2", "Ch10"]);
        assert!(q.is_filtering());
    }

    #[test]
    fn test_favorites_only() {
        let entries = listing();
        let favorites = vec![PathBuf::from("/root").join("Ch10").to_string_lossy().into_owned()];
        let mut q = query(&[], &favorites);
        q.favorites_only = true;
        assert_eq!(names(&filter_entries(&entries, &q)), ["Ch10"]);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut entries = listing();
        let ignored = vec!["10".to_string()];
        let a = filter_entries(&entries, &query(&ignored, &[]));
        entries.reverse();
        let b = filter_entries(&entries, &query(&ignored, &[]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_predicates_compose_in_any_order() {
        let entries = vec![
            folder("Ch1", true),
            folder("Ch2", true),
            folder("Ch10", true),
            folder("Chapter B", true),
            folder("B", true),
            folder("Extra", true),
        ];
        let favorites: Vec<String> = ["Ch2", "Ch10", "Chapter B", "B"]
            .iter()
            .map(|n| PathBuf::from("/root").join(n).to_string_lossy().into_owned())
            .collect();
        let ignored = vec!["10".to_string()];

        let mut combined = query(&ignored, &favorites);
        combined.search = "ch";
        combined.favorites_only = true;
        let expected = filter_entries(&entries, &combined);
        assert_eq!(names(&expected), ["Ch2", "Chapter B"]);

        let mut search_only = query(&[], &favorites);
        search_only.search = "ch";
        let ignore_only = query(&ignored, &favorites);
        let mut favorites_only = query(&[], &favorites);
        favorites_only.favorites_only = true;

        let orders = [
            [search_only, ignore_only, favorites_only],
            [favorites_only, ignore_only, search_only],
            [ignore_only, favorites_only, search_only],
        ];
        for order in orders {
            let out = order
                .iter()
                .fold(entries.clone(), |acc, q| filter_entries(&acc, q));
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn test_model_recomputes_on_change() {
        let mut model = LibraryModel::new(SortOrder::Ascending, ViewMode::Grid);
        let mut prefs = Preferences::default();
        model.begin_loading();
        assert!(model.is_loading());
        model.set_entries(listing());
        assert!(!model.is_loading());
        assert_eq!(names(model.visible(&prefs)), ["A", "B", "Ch2", "Ch10"]);

        model.search = "b".into();
        assert_eq!(names(model.visible(&prefs)), ["B"]);
        model.search.clear();

        prefs.ignored_patterns.push("Ch".into());
        model.invalidate();
        assert_eq!(names(model.visible(&prefs)), ["A", "B"]);

        model.toggle_sort_order();
        assert_eq!(names(model.visible(&prefs)), ["B", "A"]);
        assert_eq!(model.total(), 4);
    }

    #[test]
    fn test_model_favorites_toggle() {
        let mut model = LibraryModel::new(SortOrder::Ascending, ViewMode::List);
        let mut prefs = Preferences::default();
        model.set_entries(listing());
        prefs.favorite_paths.push(PathBuf::from("/root").join("B").to_string_lossy().into_owned());

        model.toggle_favorites_only();
        assert!(model.is_filtering());
        assert_eq!(names(model.visible(&prefs)), ["B"]);
        model.toggle_view_mode();
        assert_eq!(model.view_mode(), ViewMode::Grid);
    }
}
