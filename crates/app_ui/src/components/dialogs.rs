//! Modal dialogs and the native folder picker

use app_core::I18n;
use egui::{Align2, Context, RichText, Window};
use std::path::PathBuf;

/// Result of dialog interaction
#[derive(Debug, PartialEq)]
pub enum DialogResult<T> {
    /// Still open, nothing decided
    None,
    Ok(T),
    Cancel,
}

/// Common dialog trait
pub trait Dialog {
    type Output;
    fn ui(&mut self, ctx: &Context) -> DialogResult<Self::Output>;
    fn is_open(&self) -> bool;
    fn close(&mut self);
}

/// Confirmation dialog
pub struct ConfirmDialog {
    pub open: bool,
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    /// Paint the confirm button in the danger colour
    pub dangerous: bool,
}

impl ConfirmDialog {
    /// "Reset app" confirmation: clears every preference
    pub fn reset_app(i18n: &I18n) -> Self {
        Self {
            open: true,
            title: i18n.get("dialog-confirm-title"),
            message: i18n.get("settings-reset-confirm"),
            confirm_text: i18n.get("settings-reset-app"),
            cancel_text: i18n.get("dialog-cancel"),
            dangerous: true,
        }
    }
}

impl Dialog for ConfirmDialog {
    type Output = bool;

    fn ui(&mut self, ctx: &Context) -> DialogResult<bool> {
        if !self.open {
            return DialogResult::None;
        }

        let mut result = DialogResult::None;

        Window::new(&self.title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&self.message);
                ui.add_space(16.0);

                ui.horizontal(|ui| {
                    let confirm_btn = if self.dangerous {
                        ui.button(RichText::new(&self.confirm_text).color(ui.visuals().error_fg_color))
                    } else {
                        ui.button(&self.confirm_text)
                    };

                    if confirm_btn.clicked() {
                        result = DialogResult::Ok(true);
                        self.open = false;
                    }

                    if ui.button(&self.cancel_text).clicked() {
                        result = DialogResult::Cancel;
                        self.open = false;
                    }
                });
            });

        if result == DialogResult::None && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            result = DialogResult::Cancel;
            self.open = false;
        }

        result
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// Ask the user for a library root. Cancelling is `None`, not an error.
pub fn pick_directory(start: Option<&str>) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new();
    if let Some(dir) = start {
        dialog = dialog.set_directory(dir);
    }

    let picked = dialog.pick_folder();
    match &picked {
        Some(path) => tracing::info!("Folder selected: {}", path.display()),
        None => tracing::debug!("Folder selection cancelled"),
    }
    picked
}
