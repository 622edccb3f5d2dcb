//! Settings dialog: language, ignore list, reset

use super::dialogs::{ConfirmDialog, Dialog, DialogResult};
use crate::theme::Theme;
use app_core::preferences::SUPPORTED_LANGUAGES;
use app_core::{I18n, Preferences};
use egui::{ComboBox, RichText, Ui};

/// Settings dialog state
#[derive(Default)]
pub struct SettingsDialog {
    /// Currently open
    pub open: bool,
    /// Text in the "add pattern" box
    pub new_pattern: String,
    confirm: Option<ConfirmDialog>,
}

/// Preference changes requested by the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    SetLanguage(String),
    AddIgnorePattern(String),
    RemoveIgnorePattern(String),
    /// Confirmed "reset app"
    ResetApp,
}

impl SettingsDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
        self.new_pattern.clear();
        self.confirm = None;
    }

    /// Close the dialog
    pub fn close(&mut self) {
        self.open = false;
        self.confirm = None;
    }

    /// Take the typed pattern if it would change the list.
    /// Empty and already-listed patterns leave the box untouched.
    pub fn submit_pattern(&mut self, existing: &[String]) -> Option<String> {
        if self.new_pattern.is_empty() || existing.contains(&self.new_pattern) {
            return None;
        }
        Some(std::mem::take(&mut self.new_pattern))
    }

    /// Render the settings dialog
    pub fn ui(
        &mut self,
        ctx: &egui::Context,
        i18n: &I18n,
        theme: &Theme,
        prefs: &Preferences,
    ) -> Option<SettingsAction> {
        if !self.open {
            return None;
        }

        let mut action = None;
        let mut window_open = true;

        egui::Window::new(i18n.get("settings-title"))
            .open(&mut window_open)
            .resizable(false)
            .collapsible(false)
            .default_width(420.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                if let Some(a) = self.ui_language(ui, i18n, prefs) {
                    action = Some(a);
                }
                ui.add_space(12.0);
                if let Some(a) = self.ui_ignore_list(ui, i18n, prefs) {
                    action = Some(a);
                }
                ui.add_space(16.0);
                ui.separator();
                self.ui_danger_zone(ui, i18n, theme);
            });

        if let Some(confirm) = &mut self.confirm {
            match confirm.ui(ctx) {
                DialogResult::Ok(true) => {
                    action = Some(SettingsAction::ResetApp);
                    self.confirm = None;
                }
                DialogResult::Ok(false) | DialogResult::Cancel => self.confirm = None,
                DialogResult::None => {}
            }
        } else if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            window_open = false;
        }

        if !window_open {
            self.close();
        }

        action
    }

    fn ui_language(&mut self, ui: &mut Ui, i18n: &I18n, prefs: &Preferences) -> Option<SettingsAction> {
        ui.heading(i18n.get("settings-language"));

        let mut selected = prefs.language.clone();
        ComboBox::from_id_salt("settings_language")
            .width(ui.available_width())
            .selected_text(i18n.get(&format!("language-{}", selected)))
            .show_ui(ui, |ui| {
                for lang in SUPPORTED_LANGUAGES {
                    ui.selectable_value(&mut selected, lang.to_string(), i18n.get(&format!("language-{}", lang)));
                }
            });

        (selected != prefs.language).then_some(SettingsAction::SetLanguage(selected))
    }

    fn ui_ignore_list(&mut self, ui: &mut Ui, i18n: &I18n, prefs: &Preferences) -> Option<SettingsAction> {
        let mut action = None;

        ui.heading(i18n.get("settings-ignore-list"));
        ui.label(RichText::new(i18n.get("settings-ignore-description")).weak());
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            let input = ui.add(
                egui::TextEdit::singleline(&mut self.new_pattern)
                    .hint_text(i18n.get("settings-placeholder"))
                    .desired_width(ui.available_width() - 80.0),
            );
            let entered = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui.button(i18n.get("settings-add-pattern")).clicked();

            if entered || clicked {
                if let Some(pattern) = self.submit_pattern(&prefs.ignored_patterns) {
                    action = Some(SettingsAction::AddIgnorePattern(pattern));
                }
                if entered {
                    input.request_focus();
                }
            }
        });

        egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
            for pattern in &prefs.ignored_patterns {
                ui.horizontal(|ui| {
                    ui.label(pattern);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(i18n.get("settings-remove")).clicked() {
                            action = Some(SettingsAction::RemoveIgnorePattern(pattern.clone()));
                        }
                    });
                });
            }
        });

        action
    }

    fn ui_danger_zone(&mut self, ui: &mut Ui, i18n: &I18n, theme: &Theme) {
        ui.label(RichText::new(i18n.get("settings-danger-zone")).color(theme.danger).strong());
        let reset = egui::Button::new(RichText::new(i18n.get("settings-reset-app")).color(theme.danger))
            .stroke(egui::Stroke::new(1.0, theme.danger))
            .min_size(egui::vec2(ui.available_width(), 28.0));
        if ui.add(reset).clicked() {
            self.confirm = Some(ConfirmDialog::reset_app(i18n));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_pattern() {
        let existing = vec!["raw".to_string()];
        let mut dialog = SettingsDialog::new();

        assert_eq!(dialog.submit_pattern(&existing), None);

        dialog.new_pattern = "raw".into();
        assert_eq!(dialog.submit_pattern(&existing), None);
        assert_eq!(dialog.new_pattern, "raw");

        dialog.new_pattern = "draft".into();
        assert_eq!(dialog.submit_pattern(&existing), Some("draft".to_string()));
        assert!(dialog.new_pattern.is_empty());
    }

    #[test]
    fn test_open_resets_input() {
        let mut dialog = SettingsDialog::new();
        dialog.new_pattern = "left over".into();
        dialog.open();
        assert!(dialog.open);
        assert!(dialog.new_pattern.is_empty());
        dialog.close();
        assert!(!dialog.open);
    }
}
