//! Library header bar: search, filters, view toggles, root folder

use crate::theme::Theme;
use app_core::config::{SortOrder, ViewMode};
use app_core::I18n;
use egui::{Align, Layout, RichText, Ui};

/// What the header shows; the search text is edited in place
pub struct HeaderState<'a> {
    pub search: &'a mut String,
    pub favorites_only: bool,
    pub sort_order: SortOrder,
    pub view_mode: ViewMode,
    pub fullscreen: bool,
    pub root_path: Option<&'a str>,
}

/// Actions from the header bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    SearchChanged,
    ToggleFavoritesOnly,
    ToggleSortOrder,
    ToggleViewMode,
    ToggleFullscreen,
    Reload,
    OpenFolder,
    OpenSettings,
}

pub struct Header;

impl Header {
    pub fn ui(ui: &mut Ui, state: HeaderState<'_>, i18n: &I18n, theme: &Theme) -> Option<HeaderAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 8.0;
            ui.label(RichText::new(i18n.get("app-title")).size(22.0).strong().color(theme.accent));
            ui.add_space(8.0);

            let search = ui.add(
                egui::TextEdit::singleline(state.search)
                    .hint_text(i18n.get("header-search-placeholder"))
                    .desired_width(220.0),
            );
            if search.changed() {
                action = Some(HeaderAction::SearchChanged);
            }
            if !state.search.is_empty()
                && ui
                    .small_button("×")
                    .on_hover_text(i18n.get("header-clear-search"))
                    .clicked()
            {
                state.search.clear();
                action = Some(HeaderAction::SearchChanged);
            }

            let star = if state.favorites_only {
                RichText::new("★").color(theme.favorite)
            } else {
                RichText::new("☆")
            };
            let hint = if state.favorites_only {
                i18n.get("header-show-all")
            } else {
                i18n.get("header-show-favorites")
            };
            if ui.button(star.size(18.0)).on_hover_text(hint).clicked() {
                action = Some(HeaderAction::ToggleFavoritesOnly);
            }

            let sort_label = match state.sort_order {
                SortOrder::Ascending => i18n.get("header-sort-asc"),
                SortOrder::Descending => i18n.get("header-sort-desc"),
            };
            if ui.button(format!("⇅ {}", sort_label)).clicked() {
                action = Some(HeaderAction::ToggleSortOrder);
            }

            // The button names the mode it switches to
            let view_label = match state.view_mode {
                ViewMode::Grid => format!("☰ {}", i18n.get("header-view-list")),
                ViewMode::List => format!("▦ {}", i18n.get("header-view-grid")),
            };
            if ui.button(view_label).clicked() {
                action = Some(HeaderAction::ToggleViewMode);
            }

            let (icon, hint) = if state.fullscreen {
                ("🗗", i18n.get("header-fullscreen-exit"))
            } else {
                ("⛶", i18n.get("header-fullscreen-enter"))
            };
            if ui.button(icon).on_hover_text(hint).clicked() {
                action = Some(HeaderAction::ToggleFullscreen);
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("⚙").on_hover_text(i18n.get("header-settings")).clicked() {
                    action = Some(HeaderAction::OpenSettings);
                }

                if state.root_path.is_some()
                    && ui.button("⟳").on_hover_text(i18n.get("header-reload")).clicked()
                {
                    action = Some(HeaderAction::Reload);
                }

                let root_text = state
                    .root_path
                    .map(str::to_string)
                    .unwrap_or_else(|| i18n.get("header-no-folder-selected"));
                let root = ui
                    .add(
                        egui::Label::new(RichText::new(format!("🔗 {}", root_text)).color(theme.text_secondary).underline())
                            .truncate()
                            .sense(egui::Sense::click()),
                    )
                    .on_hover_text(i18n.get("header-change-folder"));
                if root.clicked() {
                    action = Some(HeaderAction::OpenFolder);
                }
            });
        });

        action
    }
}
