//! Custom title bar for the frameless window

use crate::theme::Theme;
use app_core::{I18n, WindowCommand};
use egui::{Align, Layout, RichText, Sense, Ui};

pub const TITLE_BAR_HEIGHT: f32 = 32.0;

pub struct TitleBar;

impl TitleBar {
    /// Draw the bar; the returned command goes to the host window
    pub fn ui(ui: &mut Ui, i18n: &I18n, theme: &Theme, maximized: bool) -> Option<WindowCommand> {
        let mut command = None;

        let (rect, drag) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), TITLE_BAR_HEIGHT),
            Sense::click_and_drag(),
        );

        if drag.double_clicked() {
            command = Some(WindowCommand::ToggleMaximize);
        } else if drag.drag_started() {
            command = Some(WindowCommand::StartDrag);
        }

        let mut child = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(rect)
                .layout(Layout::left_to_right(Align::Center)),
        );
        child.add_space(12.0);
        child.label(RichText::new(i18n.get("app-title")).color(theme.accent).strong());

        child.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            let button = |ui: &mut Ui, icon: &str, hint: String| {
                ui.add_sized([46.0, TITLE_BAR_HEIGHT], egui::Button::new(icon).frame(false))
                    .on_hover_text(hint)
                    .clicked()
            };

            if button(ui, "✕", i18n.get("title-close")) {
                command = Some(WindowCommand::Close);
            }
            let (icon, hint) = if maximized {
                ("❐", i18n.get("title-restore"))
            } else {
                ("☐", i18n.get("title-maximize"))
            };
            if button(ui, icon, hint) {
                command = Some(WindowCommand::ToggleMaximize);
            }
            if button(ui, "🗕", i18n.get("title-minimize")) {
                command = Some(WindowCommand::Minimize);
            }
        });

        command
    }
}
