//! Reader view: one page at a time, with chrome and a page index overlay
//!
//! Navigation rules live in [`ReaderSession`]; this component turns input
//! into session calls and keeps the current page (plus a few ahead) rendered.

use super::thumbnail::{contain_rect, paint_thumbnail};
use crate::textures::TextureCache;
use crate::theme::Theme;
use app_core::{
    AppConfig, AppError, Boundary, Command, GridLayout, I18n, Priority, ReaderAction, ReaderSession, ReaderSource,
    RenderEvent, RenderRequest, RenderTarget, RenderWorker, RenderedImage, SourceKind, ThumbnailManager,
    ThumbnailState,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use egui::{Align2, Color32, FontId, Rect, RichText, Rounding, ScrollArea, Sense, Ui};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest edge pages are rendered at
pub const PAGE_MAX_EDGE: u32 = 2560;

/// While renders are in flight the frame loop polls at this rate
const POLL_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone)]
enum PageState {
    Loading,
    Ready(Arc<RenderedImage>),
    Failed,
}

/// Opening state of a PDF source; image folders are always `Ready`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Opening,
    Ready,
    /// Opened fine but has no pages to show
    Empty,
    Failed,
}

/// State a PDF moves to once its page count is known
pub fn opened_state(result: &Result<usize, AppError>) -> DocumentState {
    match result {
        Ok(0) => DocumentState::Empty,
        Ok(_) => DocumentState::Ready,
        Err(_) => DocumentState::Failed,
    }
}

/// Render target for page `index` of `source`
pub fn page_target(source: &ReaderSource, index: usize) -> Option<RenderTarget> {
    match source {
        ReaderSource::Images(pages) => pages.get(index).cloned().map(RenderTarget::Image),
        ReaderSource::Document(path) => Some(RenderTarget::PdfPage {
            path: path.clone(),
            index,
        }),
    }
}

/// Pages kept rendered: the previous one, the current one and `preload` ahead
pub fn wanted_pages(session: &ReaderSession, preload: usize) -> Vec<usize> {
    if session.total_pages() == 0 {
        return Vec::new();
    }
    let current = session.current_index();
    let mut wanted = vec![current];
    wanted.extend(session.preload_range(preload));
    if current > 0 {
        wanted.push(current - 1);
    }
    wanted
}

pub struct ReaderView {
    session: ReaderSession,
    worker: RenderWorker,
    reply_tx: Sender<RenderEvent>,
    reply_rx: Receiver<RenderEvent>,
    document: DocumentState,
    pages: HashMap<RenderTarget, PageState>,
    page_textures: TextureCache,
    index_thumbnails: ThumbnailManager,
    index_textures: TextureCache,
    last_pointer_move: Instant,
    controls_hide_after: Duration,
    preload_count: usize,
    index_columns: usize,
    overlay_was_open: bool,
}

impl ReaderView {
    pub fn new(source: ReaderSource, worker: RenderWorker, config: &AppConfig, now: Instant) -> Self {
        let (reply_tx, reply_rx) = unbounded();

        let document = match &source {
            ReaderSource::Images(_) => DocumentState::Ready,
            ReaderSource::Document(path) => match worker.page_count(path.clone(), &reply_tx) {
                Ok(()) => DocumentState::Opening,
                Err(e) => {
                    tracing::error!("Could not queue document open: {}", e);
                    DocumentState::Failed
                }
            },
        };

        tracing::info!(kind = ?source.kind(), "Reader opened");

        let index_thumbnails = ThumbnailManager::new(worker.clone(), &config.thumbnails);

        Self {
            session: ReaderSession::new(source, config.reader.timings()),
            worker,
            reply_tx,
            reply_rx,
            document,
            pages: HashMap::new(),
            page_textures: TextureCache::new("page"),
            index_thumbnails,
            index_textures: TextureCache::new("index"),
            last_pointer_move: now,
            controls_hide_after: config.reader.controls_hide_after(),
            preload_count: config.reader.preload_count,
            index_columns: config.reader.index_columns.max(1),
            overlay_was_open: false,
        }
    }

    pub fn session(&self) -> &ReaderSession {
        &self.session
    }

    pub fn document_state(&self) -> DocumentState {
        self.document
    }

    /// Keyboard command routed from the host
    pub fn on_command(&mut self, command: Command, now: Instant) -> ReaderAction {
        self.session.on_command(command, now)
    }

    /// Collect worker replies. Returns whether anything changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = false;

        while let Ok(event) = self.reply_rx.try_recv() {
            match event {
                RenderEvent::PageCount { result, .. } => {
                    if self.document != DocumentState::Opening {
                        continue;
                    }
                    self.document = opened_state(&result);
                    if let Ok(count) = result {
                        tracing::debug!(pages = count, "Document ready");
                        self.session.set_page_count(count);
                    }
                    changed = true;
                }
                RenderEvent::Rendered { request, result } => {
                    // Pages already dropped from the window are ignored
                    if !matches!(self.pages.get(&request.target), Some(PageState::Loading)) {
                        continue;
                    }
                    let state = match result {
                        Ok(image) => PageState::Ready(Arc::new(image)),
                        Err(_) => PageState::Failed,
                    };
                    self.pages.insert(request.target, state);
                    changed = true;
                }
            }
        }

        self.request_pages();
        changed | self.index_thumbnails.tick(now)
    }

    /// Queue the current page first, then the preload window; drop the rest
    fn request_pages(&mut self) {
        let wanted: Vec<RenderTarget> = wanted_pages(&self.session, self.preload_count)
            .into_iter()
            .filter_map(|i| page_target(self.session.source(), i))
            .collect();

        self.pages.retain(|target, _| wanted.contains(target));
        self.page_textures.retain(|target| wanted.contains(target));

        for target in wanted {
            if self.pages.contains_key(&target) {
                continue;
            }
            let request = RenderRequest {
                target: target.clone(),
                max_edge: PAGE_MAX_EDGE,
            };
            let state = match self.worker.render(request, Priority::Interactive, &self.reply_tx) {
                Ok(()) => PageState::Loading,
                Err(e) => {
                    tracing::warn!("Page not queued: {}", e);
                    PageState::Failed
                }
            };
            self.pages.insert(target, state);
        }
    }

    fn has_work(&self) -> bool {
        self.document == DocumentState::Opening
            || self.pages.values().any(|s| matches!(s, PageState::Loading))
            || self.index_thumbnails.has_work()
    }

    fn controls_visible(&self, now: Instant) -> bool {
        self.session.overlay_open() || now.saturating_duration_since(self.last_pointer_move) < self.controls_hide_after
    }

    /// Next moment the view changes on its own
    fn next_wake(&self, now: Instant) -> Option<Instant> {
        let mut wake: Vec<Instant> = Vec::new();
        if let Some(until) = self.session.flash_deadline().filter(|t| *t > now) {
            wake.push(until);
        }
        if !self.session.overlay_open() {
            let hide_at = self.last_pointer_move + self.controls_hide_after;
            if hide_at > now {
                wake.push(hide_at);
            }
        }
        if let Some(deadline) = self.index_thumbnails.next_deadline() {
            wake.push(deadline);
        }
        if self.has_work() {
            wake.push(now + POLL_INTERVAL);
        }
        wake.into_iter().min()
    }

    pub fn ui(&mut self, ctx: &egui::Context, i18n: &I18n, theme: &Theme, now: Instant) -> ReaderAction {
        self.poll(now);

        if ctx.input(|i| i.pointer.is_moving()) {
            self.last_pointer_move = now;
        }

        let mut action = ReaderAction::None;

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                let full = ui.max_rect();

                match (self.session.kind(), self.document) {
                    (SourceKind::ImageSequence, _) if self.session.total_pages() == 0 => {
                        self.message_ui(ui, full, &i18n.get("reader-no-images"), theme);
                    }
                    (_, DocumentState::Empty) => {
                        self.message_ui(ui, full, &i18n.get("reader-no-pages"), theme);
                    }
                    (_, DocumentState::Failed) => {
                        self.message_ui(ui, full, &i18n.get("reader-open-failed"), theme);
                    }
                    (_, DocumentState::Opening) => {
                        spinner_at(ui, full, theme);
                    }
                    _ => self.page_ui(ui, full, theme, now),
                }

                let controls = self.controls_visible(now);
                if controls && self.chrome_ui(ui, full, i18n, theme, now) {
                    action = ReaderAction::BackToLibrary;
                }

                if let Some(edge) = self.session.active_flash(now) {
                    flash_ui(ui, full, edge, i18n);
                }

                if self.session.overlay_open() {
                    self.index_ui(ui, full, i18n, theme, now);
                } else {
                    self.index_thumbnails.set_visible(std::iter::empty(), now);
                }
                self.overlay_was_open = self.session.overlay_open();
            });

        if let Some(wake) = self.next_wake(now) {
            ctx.request_repaint_after(wake.saturating_duration_since(now));
        }

        action
    }

    fn message_ui(&self, ui: &mut Ui, full: Rect, text: &str, theme: &Theme) {
        ui.painter().text(
            full.center(),
            Align2::CENTER_CENTER,
            text,
            FontId::proportional(20.0),
            theme.text_secondary,
        );
    }

    fn page_ui(&mut self, ui: &mut Ui, full: Rect, theme: &Theme, now: Instant) {
        let current = self.session.current_index();
        let Some(target) = page_target(self.session.source(), current) else {
            return;
        };

        let page_rect = match self.pages.get(&target) {
            Some(PageState::Ready(image)) => {
                let texture = self.page_textures.get_or_upload(ui.ctx(), &target, image);
                let rect = contain_rect(texture.size(), full);
                ui.painter().image(
                    texture.id(),
                    rect,
                    Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
                Some(rect)
            }
            Some(PageState::Failed) => {
                ui.painter().text(
                    full.center(),
                    Align2::CENTER_CENTER,
                    "⚠",
                    FontId::proportional(48.0),
                    theme.text_secondary,
                );
                None
            }
            Some(PageState::Loading) | None => {
                spinner_at(ui, full, theme);
                None
            }
        };

        if self.session.overlay_open() {
            return;
        }

        // Click halves are measured on the page as drawn
        if let Some(rect) = page_rect {
            let response = ui.interact(rect, ui.id().with("reader_page"), Sense::click());
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.session.on_click(pos.x - rect.left(), rect.width(), now);
                }
            }
        }

        let hovered = ui.rect_contains_pointer(full);
        let delta = ui.input(|i| i.raw_scroll_delta.y);
        if hovered && delta != 0.0 {
            // egui reports wheel-down as a negative delta
            self.session.on_wheel(-delta, now);
        }
    }

    /// Back, index, side buttons, progress. Returns true when Back was clicked.
    fn chrome_ui(&mut self, ui: &mut Ui, full: Rect, i18n: &I18n, theme: &Theme, now: Instant) -> bool {
        let mut back = false;
        let overlay_open = self.session.overlay_open();

        let back_rect = Rect::from_min_size(full.min + egui::vec2(16.0, 16.0), egui::vec2(110.0, 36.0));
        if ui
            .put(back_rect, egui::Button::new(format!("← {}", i18n.get("reader-back"))))
            .clicked()
        {
            back = true;
        }

        let index_rect = Rect::from_min_size(
            egui::pos2(full.max.x - 126.0, full.min.y + 16.0),
            egui::vec2(110.0, 36.0),
        );
        if ui
            .put(index_rect, egui::Button::new(RichText::new(i18n.get("reader-index")).strong()))
            .clicked()
        {
            self.session.toggle_overlay();
        }

        let side = egui::vec2(48.0, 96.0);
        let prev_rect = Rect::from_center_size(egui::pos2(full.min.x + 40.0, full.center().y), side);
        let next_rect = Rect::from_center_size(egui::pos2(full.max.x - 40.0, full.center().y), side);
        let side_button = |ui: &mut Ui, rect: Rect, label: &str| {
            ui.add_enabled_ui(!overlay_open, |ui| {
                ui.put(rect, egui::Button::new(RichText::new(label).size(28.0)))
            })
            .inner
            .clicked()
        };
        if side_button(ui, prev_rect, "<") {
            self.session.prev(now);
        }
        if side_button(ui, next_rect, ">") {
            self.session.next(now);
        }

        let total = self.session.total_pages();
        if total > 0 {
            let track = Rect::from_min_max(egui::pos2(full.min.x, full.max.y - 4.0), full.max);
            ui.painter().rect_filled(track, Rounding::ZERO, Color32::from_white_alpha(40));
            let mut fill = track;
            fill.set_width(track.width() * self.session.progress());
            ui.painter().rect_filled(fill, Rounding::ZERO, theme.accent);

            let counter = app_core::t!(
                i18n,
                "reader-page-counter",
                current = self.session.current_index() + 1,
                total = total
            );
            ui.painter().text(
                egui::pos2(full.center().x, full.max.y - 16.0),
                Align2::CENTER_BOTTOM,
                counter,
                FontId::proportional(14.0),
                Color32::from_white_alpha(200),
            );
        }

        back
    }

    fn index_ui(&mut self, ui: &mut Ui, full: Rect, i18n: &I18n, theme: &Theme, now: Instant) {
        ui.painter().rect_filled(full, Rounding::ZERO, Color32::from_black_alpha(230));

        // Registered first so the cells and the close button sit above it.
        // The top strip stays clear for the back and index buttons.
        let backdrop_rect = Rect::from_min_max(egui::pos2(full.min.x, full.min.y + 64.0), full.max);
        let backdrop = ui.interact(backdrop_rect, ui.id().with("index_backdrop"), Sense::click());

        let close_rect = Rect::from_min_size(
            egui::pos2(full.max.x - 56.0, full.min.y + 72.0),
            egui::vec2(40.0, 40.0),
        );
        if ui
            .put(close_rect, egui::Button::new(RichText::new("×").size(24.0)))
            .on_hover_text(i18n.get("reader-close"))
            .clicked()
        {
            self.session.close_overlay();
            return;
        }

        let area_rect = Rect::from_min_max(egui::pos2(full.min.x + 24.0, full.min.y + 120.0), full.max - egui::vec2(24.0, 16.0));
        let total = self.session.total_pages();
        let current = self.session.current_index();
        let columns = self.index_columns;

        let mut area = ScrollArea::vertical().id_salt("reader_index").auto_shrink([false, false]);
        if !self.overlay_was_open {
            let grid = GridLayout::with_columns(area_rect.width(), columns);
            area = area.vertical_scroll_offset(grid.offset_of(current));
        }

        let mut chosen = None;
        let mut visible = Vec::new();
        let source = self.session.source().clone();
        let thumbnails = &self.index_thumbnails;
        let textures = &mut self.index_textures;

        ui.allocate_new_ui(egui::UiBuilder::new().max_rect(area_rect), |ui| {
            area.show_viewport(ui, |ui, viewport| {
                let grid = GridLayout::with_columns(ui.available_width(), columns);
                ui.set_height(grid.content_height(total));
                let origin = ui.max_rect().min;

                for index in grid.visible_items(viewport.min.y, viewport.height(), total) {
                    let (x, y) = grid.cell_origin(index);
                    let cell = Rect::from_min_size(origin + egui::vec2(x, y), egui::vec2(grid.column_width, grid.row_height))
                        .shrink(8.0);
                    let target = page_target(&source, index);
                    if let Some(t) = &target {
                        visible.push(t.clone());
                    }

                    let response = ui.interact(cell, ui.id().with(("index_cell", index)), Sense::click());
                    paint_thumbnail(ui, cell, Rounding::same(4.0), target.as_ref(), thumbnails, textures, "", theme);

                    let painter = ui.painter_at(cell);
                    let label = Rect::from_min_max(egui::pos2(cell.min.x, cell.max.y - 22.0), cell.max);
                    painter.rect_filled(label, Rounding::ZERO, Color32::from_black_alpha(160));
                    painter.text(
                        label.center(),
                        Align2::CENTER_CENTER,
                        (index + 1).to_string(),
                        FontId::proportional(13.0),
                        Color32::WHITE,
                    );

                    if index == current {
                        painter.rect_stroke(cell, Rounding::same(4.0), egui::Stroke::new(3.0, theme.accent));
                    } else if response.hovered() {
                        painter.rect_stroke(cell, Rounding::same(4.0), egui::Stroke::new(1.0, theme.text_secondary));
                    }

                    if response.clicked() {
                        chosen = Some(index);
                    }
                }
            });
        });

        self.index_thumbnails.set_visible(visible, now);
        let thumbnails = &self.index_thumbnails;
        self.index_textures
            .retain(|t| matches!(thumbnails.state(t), ThumbnailState::Ready(_)));

        if let Some(index) = chosen {
            self.session.jump(index);
        } else if backdrop.clicked() {
            self.session.close_overlay();
        }
    }
}

fn spinner_at(ui: &Ui, full: Rect, theme: &Theme) {
    let rect = Rect::from_center_size(full.center(), egui::vec2(48.0, 48.0));
    egui::Spinner::new().color(theme.accent).paint_at(ui, rect);
}

fn flash_ui(ui: &Ui, full: Rect, edge: Boundary, i18n: &I18n) {
    let text = match edge {
        Boundary::First => i18n.get("reader-first-page"),
        Boundary::Last => i18n.get("reader-last-page"),
    };
    let galley = ui.painter().layout_no_wrap(text, FontId::proportional(20.0), Color32::WHITE);
    let rect = Rect::from_center_size(full.center(), galley.size() + egui::vec2(48.0, 24.0));
    ui.painter().rect_filled(rect, Rounding::same(8.0), Color32::from_black_alpha(200));
    ui.painter().galley(rect.center() - galley.size() / 2.0, galley, Color32::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_core::ReaderTimings;
    use std::path::PathBuf;

    fn images(n: usize) -> ReaderSource {
        ReaderSource::Images((0..n).map(|i| PathBuf::from(format!("/b/{:03}.png", i))).collect())
    }

    #[test]
    fn test_page_targets() {
        assert_eq!(
            page_target(&images(3), 1),
            Some(RenderTarget::Image(PathBuf::from("/b/001.png")))
        );
        assert_eq!(page_target(&images(3), 3), None);

        let doc = ReaderSource::Document(PathBuf::from("/b.pdf"));
        assert_eq!(
            page_target(&doc, 7),
            Some(RenderTarget::PdfPage {
                path: PathBuf::from("/b.pdf"),
                index: 7
            })
        );
    }

    #[test]
    fn test_wanted_pages_window() {
        let now = Instant::now();
        let mut session = ReaderSession::new(images(5), ReaderTimings::default());
        assert_eq!(wanted_pages(&session, 2), vec![0, 1, 2]);

        session.jump(3);
        assert_eq!(wanted_pages(&session, 2), vec![3, 4, 2]);

        session.next(now);
        assert_eq!(wanted_pages(&session, 2), vec![4, 3]);

        let empty = ReaderSession::new(ReaderSource::Document(PathBuf::from("/b.pdf")), ReaderTimings::default());
        assert!(wanted_pages(&empty, 2).is_empty());
    }

    #[test]
    fn test_empty_document_is_not_left_opening() {
        assert_eq!(opened_state(&Ok(0)), DocumentState::Empty);
        assert_eq!(opened_state(&Ok(12)), DocumentState::Ready);
        assert_eq!(
            opened_state(&Err(AppError::Worker("broken".into()))),
            DocumentState::Failed
        );

        // Nothing is ever requested for an empty document, so only a message can end the wait
        let empty = ReaderSession::new(ReaderSource::Document(PathBuf::from("/b.pdf")), ReaderTimings::default());
        assert!(wanted_pages(&empty, 2).is_empty());
    }

    #[test]
    fn test_missing_page_fails_alone() {
        let worker = RenderWorker::spawn().unwrap();
        let now = Instant::now();
        let mut view = ReaderView::new(images(2), worker, &AppConfig::default(), now);
        assert_eq!(view.document_state(), DocumentState::Ready);

        view.poll(now);
        let deadline = Instant::now() + Duration::from_secs(10);
        while view.pages.values().any(|s| matches!(s, PageState::Loading)) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            view.poll(now);
        }

        assert_eq!(view.pages.len(), 2);
        assert!(view.pages.values().all(|s| matches!(s, PageState::Failed)));
        // Navigation still works around failed pages
        view.on_command(Command::ReaderNext, now);
        assert_eq!(view.session().current_index(), 1);
    }

    #[test]
    fn test_clicking_index_background_closes_it() {
        let worker = RenderWorker::spawn().unwrap();
        let now = Instant::now();
        let i18n = I18n::with_embedded("en").unwrap();
        let theme = Theme::dark();
        let mut view = ReaderView::new(images(3), worker, &AppConfig::default(), now);
        view.on_command(Command::ReaderToggleIndex, now);
        assert!(view.session().overlay_open());

        let ctx = egui::Context::default();
        let screen = Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0));
        // Left margin beside the page grid, below the top buttons
        let pos = egui::pos2(10.0, 200.0);
        let button = |pressed| egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        };

        for events in [vec![egui::Event::PointerMoved(pos)], vec![button(true)], vec![button(false)]] {
            let input = egui::RawInput {
                screen_rect: Some(screen),
                events,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                view.ui(ctx, &i18n, &theme, now);
            });
        }

        assert!(!view.session().overlay_open());
        assert_eq!(view.session().current_index(), 0);
    }

    #[test]
    fn test_controls_hide_after_idle() {
        let worker = RenderWorker::spawn().unwrap();
        let t0 = Instant::now();
        let mut view = ReaderView::new(images(1), worker, &AppConfig::default(), t0);

        assert!(view.controls_visible(t0 + Duration::from_millis(2999)));
        assert!(!view.controls_visible(t0 + Duration::from_millis(3000)));

        view.on_command(Command::ReaderToggleIndex, t0);
        assert!(view.controls_visible(t0 + Duration::from_secs(60)));
    }
}
