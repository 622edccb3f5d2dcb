//! Virtualized layout math for the library grid/list and the page index
//!
//! Everything here is pure: given a viewport and a scroll offset, report
//! which item indices are on screen and where they go.

use std::ops::Range;

/// Index range of fixed-extent rows intersecting the viewport
pub fn visible_range(
    scroll_offset: f32,
    viewport_height: f32,
    item_extent: f32,
    count: usize,
) -> Range<usize> {
    if count == 0 || item_extent <= 0.0 || viewport_height <= 0.0 {
        return 0..0;
    }

    let top = scroll_offset.max(0.0);
    let start = ((top / item_extent).floor() as usize).min(count);
    let end = (((top + viewport_height) / item_extent).ceil() as usize).min(count);
    start..end.max(start)
}

/// Grid of 2:3 cells filling the viewport width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub column_width: f32,
    pub row_height: f32,
}

impl GridLayout {
    /// Cell height relative to width
    pub const ASPECT: f32 = 1.5;

    /// As many columns of at least `min_column_width` as fit
    pub fn compute(viewport_width: f32, min_column_width: f32) -> Self {
        let columns = if min_column_width > 0.0 {
            ((viewport_width / min_column_width).floor() as usize).max(1)
        } else {
            1
        };
        Self::with_columns(viewport_width, columns)
    }

    /// A fixed number of columns (the page index uses 8)
    pub fn with_columns(viewport_width: f32, columns: usize) -> Self {
        let columns = columns.max(1);
        let column_width = viewport_width.max(0.0) / columns as f32;
        Self {
            columns,
            column_width,
            row_height: column_width * Self::ASPECT,
        }
    }

    pub fn row_count(&self, count: usize) -> usize {
        count.div_ceil(self.columns)
    }

    pub fn content_height(&self, count: usize) -> f32 {
        self.row_count(count) as f32 * self.row_height
    }

    /// Item indices of every row touching the viewport
    pub fn visible_items(&self, scroll_offset: f32, viewport_height: f32, count: usize) -> Range<usize> {
        let rows = visible_range(scroll_offset, viewport_height, self.row_height, self.row_count(count));
        (rows.start * self.columns).min(count)..(rows.end * self.columns).min(count)
    }

    /// Top-left offset of item `index` relative to the content origin
    pub fn cell_origin(&self, index: usize) -> (f32, f32) {
        let row = index / self.columns;
        let col = index % self.columns;
        (col as f32 * self.column_width, row as f32 * self.row_height)
    }

    /// Scroll offset that brings `index`'s row to the top
    pub fn offset_of(&self, index: usize) -> f32 {
        (index / self.columns) as f32 * self.row_height
    }
}

/// Single column of fixed-height rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListLayout {
    pub row_height: f32,
}

impl ListLayout {
    pub fn new(row_height: f32) -> Self {
        Self { row_height }
    }

    pub fn content_height(&self, count: usize) -> f32 {
        count as f32 * self.row_height
    }

    pub fn visible_items(&self, scroll_offset: f32, viewport_height: f32, count: usize) -> Range<usize> {
        visible_range(scroll_offset, viewport_height, self.row_height, count)
    }
}

/// Library scroll position kept while the reader is open
#[derive(Debug, Default)]
pub struct ScrollMemory {
    saved: Option<f32>,
}

impl ScrollMemory {
    pub fn remember(&mut self, offset: f32) {
        self.saved = Some(offset);
    }

    /// Yields the saved offset once
    pub fn take_restore(&mut self) -> Option<f32> {
        self.saved.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_columns() {
        let grid = GridLayout::compute(1000.0, 200.0);
        assert_eq!(grid.columns, 5);
        assert_eq!(grid.column_width, 200.0);
        assert_eq!(grid.row_height, 300.0);

        let grid = GridLayout::compute(1099.0, 200.0);
        assert_eq!(grid.columns, 5);
        assert!((grid.column_width - 219.8).abs() < 1e-3);

        // Narrower than one column still shows one
        assert_eq!(GridLayout::compute(120.0, 200.0).columns, 1);
    }

    #[test]
    fn test_visible_range() {
        assert_eq!(visible_range(0.0, 700.0, 70.0, 100), 0..10);
        assert_eq!(visible_range(35.0, 700.0, 70.0, 100), 0..11);
        assert_eq!(visible_range(6800.0, 700.0, 70.0, 100), 97..100);
        assert_eq!(visible_range(-50.0, 140.0, 70.0, 100), 0..2);
        assert_eq!(visible_range(0.0, 700.0, 70.0, 0), 0..0);
        assert_eq!(visible_range(99_999.0, 700.0, 70.0, 5), 5..5);
    }

    #[test]
    fn test_grid_rows_expand_to_items() {
        let grid = GridLayout::compute(800.0, 200.0); // 4 cols, 300px rows
        assert_eq!(grid.row_count(10), 3);
        assert_eq!(grid.visible_items(0.0, 300.0, 10), 0..4);
        assert_eq!(grid.visible_items(450.0, 300.0, 10), 4..10);
        assert_eq!(grid.cell_origin(5), (200.0, 300.0));
    }

    #[test]
    fn test_index_overlay_grid() {
        let grid = GridLayout::with_columns(1600.0, 8);
        assert_eq!(grid.column_width, 200.0);
        assert_eq!(grid.offset_of(17), 600.0);
    }

    #[test]
    fn test_scroll_memory_restores_once() {
        let mut memory = ScrollMemory::default();
        assert_eq!(memory.take_restore(), None);
        memory.remember(1234.0);
        assert_eq!(memory.take_restore(), Some(1234.0));
        assert_eq!(memory.take_restore(), None);
    }
}
