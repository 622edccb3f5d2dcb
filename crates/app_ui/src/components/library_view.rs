//! Library view: virtualized grid and list of library entries
//!
//! Only entries inside the visible range are laid out, so folder sets of
//! any size cost the same per frame.

use super::context_menu::{ContextAction, ContextMenu};
use super::thumbnail::paint_thumbnail;
use crate::textures::TextureCache;
use crate::theme::Theme;
use app_core::config::{LibraryConfig, ViewMode};
use app_core::{GridLayout, I18n, ListLayout, RenderTarget, ScrollMemory, ThumbnailManager, ThumbnailState};
use app_fs::LibraryEntry;
use egui::text::{LayoutJob, TextWrapping};
use egui::{Align2, CursorIcon, FontId, Rect, Rounding, ScrollArea, Sense, Ui};
use std::time::Instant;

const CELL_PADDING: f32 = 12.0;
const TITLE_HEIGHT: f32 = 32.0;

/// Everything the view reads for one frame
pub struct LibraryProps<'a> {
    /// Filtered and sorted entries
    pub entries: &'a [LibraryEntry],
    pub favorites: &'a [String],
    pub view_mode: ViewMode,
    pub loading: bool,
    /// A search or favorites filter is active
    pub filtering: bool,
    pub config: &'a LibraryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryAction {
    Open(LibraryEntry),
    Context(ContextAction),
    OpenFolder,
}

/// What a grid cell shows as its cover
pub fn thumbnail_target(entry: &LibraryEntry) -> Option<RenderTarget> {
    if let Some(thumbnail) = &entry.thumbnail {
        Some(RenderTarget::Image(thumbnail.clone()))
    } else if entry.is_pdf() {
        Some(RenderTarget::PdfPage {
            path: entry.path.clone(),
            index: 0,
        })
    } else {
        None
    }
}

pub struct LibraryView {
    scroll: ScrollMemory,
    /// Offset seen on the last frame
    offset: f32,
    textures: TextureCache,
}

impl Default for LibraryView {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryView {
    pub fn new() -> Self {
        Self {
            scroll: ScrollMemory::default(),
            offset: 0.0,
            textures: TextureCache::new("library"),
        }
    }

    /// Call when leaving for the reader; the offset comes back once on return
    pub fn remember_scroll(&mut self) {
        self.scroll.remember(self.offset);
    }

    /// New root folder: start at the top
    pub fn reset_scroll(&mut self) {
        self.offset = 0.0;
        self.scroll.remember(0.0);
    }

    pub fn clear_textures(&mut self) {
        self.textures.clear();
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        props: &LibraryProps<'_>,
        thumbnails: &mut ThumbnailManager,
        i18n: &I18n,
        theme: &Theme,
        now: Instant,
    ) -> Option<LibraryAction> {
        if props.loading {
            ui.centered_and_justified(|ui| {
                ui.add(egui::Spinner::new().size(40.0).color(theme.accent));
            });
            thumbnails.set_visible(std::iter::empty(), now);
            return None;
        }

        if props.entries.is_empty() {
            thumbnails.set_visible(std::iter::empty(), now);
            return Self::empty_state(ui, props.filtering, i18n, theme);
        }

        let action = match props.view_mode {
            ViewMode::Grid => self.grid_ui(ui, props, thumbnails, i18n, theme, now),
            ViewMode::List => {
                thumbnails.set_visible(std::iter::empty(), now);
                self.list_ui(ui, props, i18n, theme)
            }
        };

        self.textures
            .retain(|target| matches!(thumbnails.state(target), ThumbnailState::Ready(_)));

        action
    }

    fn empty_state(ui: &mut Ui, filtering: bool, i18n: &I18n, theme: &Theme) -> Option<LibraryAction> {
        let mut action = None;
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 2.0 - 40.0);
            if filtering {
                ui.label(egui::RichText::new(i18n.get("library-no-results-found")).size(18.0).color(theme.text_secondary));
            } else {
                ui.label(egui::RichText::new(i18n.get("library-no-folders-found")).size(18.0).color(theme.text_secondary));
                ui.add_space(20.0);
                let button = egui::Button::new(egui::RichText::new(i18n.get("library-open-folder")).size(18.0))
                    .min_size(egui::vec2(180.0, 44.0));
                if ui.add(button).clicked() {
                    action = Some(LibraryAction::OpenFolder);
                }
            }
        });
        action
    }

    fn scroll_area(&mut self) -> ScrollArea {
        let mut area = ScrollArea::vertical()
            .id_salt("library_scroll")
            .auto_shrink([false, false]);
        if let Some(offset) = self.scroll.take_restore() {
            area = area.vertical_scroll_offset(offset);
        }
        area
    }

    fn grid_ui(
        &mut self,
        ui: &mut Ui,
        props: &LibraryProps<'_>,
        thumbnails: &mut ThumbnailManager,
        i18n: &I18n,
        theme: &Theme,
        now: Instant,
    ) -> Option<LibraryAction> {
        let mut action = None;
        let mut visible_targets = Vec::new();
        let area = self.scroll_area();
        let textures = &mut self.textures;
        let count = props.entries.len();

        let output = area.show_viewport(ui, |ui, viewport| {
            let grid = GridLayout::compute(ui.available_width(), props.config.min_column_width);
            ui.set_height(grid.content_height(count));
            let origin = ui.max_rect().min;

            for index in grid.visible_items(viewport.min.y, viewport.height(), count) {
                let entry = &props.entries[index];
                let (x, y) = grid.cell_origin(index);
                let cell = Rect::from_min_size(
                    origin + egui::vec2(x, y),
                    egui::vec2(grid.column_width, grid.row_height),
                )
                .shrink(CELL_PADDING);

                let target = thumbnail_target(entry);
                if let Some(t) = &target {
                    visible_targets.push(t.clone());
                }

                let response = ui.interact(cell, ui.id().with(&entry.path), Sense::click());
                let response = if entry.is_selectable() {
                    response.on_hover_cursor(CursorIcon::PointingHand)
                } else {
                    response
                };

                let rounding = Rounding::same(8.0);
                let image_rect = Rect::from_min_max(cell.min, egui::pos2(cell.max.x, cell.max.y - TITLE_HEIGHT));
                let placeholder = placeholder_label(entry, i18n);
                paint_thumbnail(ui, image_rect, rounding, target.as_ref(), thumbnails, textures, &placeholder, theme);

                let painter = ui.painter_at(cell);
                let title_rect = Rect::from_min_max(egui::pos2(cell.min.x, cell.max.y - TITLE_HEIGHT), cell.max);
                painter.rect_filled(title_rect, Rounding { sw: 8.0, se: 8.0, ..Default::default() }, theme.surface);
                let title = single_line(ui, &entry.name, title_rect.width() - 12.0, theme);
                painter.galley(title_rect.left_center() + egui::vec2(6.0, -title.size().y / 2.0), title, theme.text);

                if response.hovered() && entry.is_selectable() {
                    painter.rect_stroke(cell, rounding, egui::Stroke::new(2.0, theme.accent));
                }

                let is_favorite = props.favorites.contains(&entry.path_key());
                if is_favorite {
                    painter.text(
                        cell.right_top() + egui::vec2(-8.0, 6.0),
                        Align2::RIGHT_TOP,
                        "★",
                        FontId::proportional(20.0),
                        theme.favorite,
                    );
                }

                if response.clicked() && entry.is_selectable() {
                    action = Some(LibraryAction::Open(entry.clone()));
                }
                if let Some(context) = ContextMenu::attach(&response, entry, is_favorite, i18n) {
                    action = Some(LibraryAction::Context(context));
                }
            }
        });

        self.offset = output.state.offset.y;
        thumbnails.set_visible(visible_targets, now);
        action
    }

    fn list_ui(&mut self, ui: &mut Ui, props: &LibraryProps<'_>, i18n: &I18n, theme: &Theme) -> Option<LibraryAction> {
        let mut action = None;
        let layout = ListLayout::new(props.config.list_row_height);
        let count = props.entries.len();

        let output = self.scroll_area().show_viewport(ui, |ui, viewport| {
            ui.set_height(layout.content_height(count));
            let origin = ui.max_rect().min;
            let width = ui.available_width();

            for index in layout.visible_items(viewport.min.y, viewport.height(), count) {
                let entry = &props.entries[index];
                let row = Rect::from_min_size(
                    origin + egui::vec2(0.0, index as f32 * layout.row_height),
                    egui::vec2(width, layout.row_height),
                )
                .shrink2(egui::vec2(16.0, 4.0));

                let response = ui.interact(row, ui.id().with(&entry.path), Sense::click());
                let response = if entry.is_selectable() {
                    response.on_hover_cursor(CursorIcon::PointingHand)
                } else {
                    response
                };

                let painter = ui.painter_at(row);
                let fill = if response.hovered() && entry.is_selectable() {
                    theme.primary
                } else {
                    theme.surface
                };
                painter.rect_filled(row, Rounding::same(6.0), fill);

                let icon = if entry.is_file { "📄" } else { "📖" };
                painter.text(
                    row.left_center() + egui::vec2(16.0, 0.0),
                    Align2::LEFT_CENTER,
                    icon,
                    FontId::proportional(22.0),
                    theme.accent,
                );

                let name = single_line(ui, &entry.name, row.width() - 100.0, theme);
                painter.galley(row.left_center() + egui::vec2(52.0, -name.size().y / 2.0), name, theme.text);

                let is_favorite = props.favorites.contains(&entry.path_key());
                if is_favorite {
                    painter.text(
                        row.right_center() - egui::vec2(16.0, 0.0),
                        Align2::RIGHT_CENTER,
                        "★",
                        FontId::proportional(20.0),
                        theme.favorite,
                    );
                }

                if response.clicked() && entry.is_selectable() {
                    action = Some(LibraryAction::Open(entry.clone()));
                }
                if let Some(context) = ContextMenu::attach(&response, entry, is_favorite, i18n) {
                    action = Some(LibraryAction::Context(context));
                }
            }
        });

        self.offset = output.state.offset.y;
        action
    }
}

fn placeholder_label(entry: &LibraryEntry, i18n: &I18n) -> String {
    if entry.is_pdf() {
        i18n.get("library-pdf")
    } else if entry.is_file {
        i18n.get("library-file")
    } else {
        i18n.get("library-no-image")
    }
}

fn single_line(ui: &Ui, text: &str, max_width: f32, theme: &Theme) -> std::sync::Arc<egui::Galley> {
    let mut job = LayoutJob::simple_singleline(text.to_owned(), FontId::proportional(14.0), theme.text);
    job.wrap = TextWrapping::truncate_at_width(max_width.max(1.0));
    ui.fonts(|f| f.layout_job(job))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(name: &str, thumbnail: Option<&str>, is_file: bool) -> LibraryEntry {
        LibraryEntry {
            name: name.to_string(),
            path: PathBuf::from(format!("/lib/{}", name)),
            thumbnail: thumbnail.map(PathBuf::from),
            is_file,
        }
    }

    #[test]
    fn test_thumbnail_targets() {
        let folder = entry("Vol1", Some("/lib/Vol1/001.png"), false);
        assert_eq!(
            thumbnail_target(&folder),
            Some(RenderTarget::Image(PathBuf::from("/lib/Vol1/001.png")))
        );

        let pdf = entry("book.pdf", None, true);
        assert_eq!(
            thumbnail_target(&pdf),
            Some(RenderTarget::PdfPage {
                path: PathBuf::from("/lib/book.pdf"),
                index: 0
            })
        );

        assert_eq!(thumbnail_target(&entry("Empty", None, false)), None);
    }

    #[test]
    fn test_scroll_restored_once() {
        let mut view = LibraryView::new();
        view.offset = 840.0;
        view.remember_scroll();
        assert_eq!(view.scroll.take_restore(), Some(840.0));
        assert_eq!(view.scroll.take_restore(), None);

        view.reset_scroll();
        assert_eq!(view.offset, 0.0);
        assert_eq!(view.scroll.take_restore(), Some(0.0));
    }
}
