//! Right-click menu on library entries

use app_core::I18n;
use app_fs::LibraryEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAction {
    AddFavorite(String),
    RemoveFavorite(String),
    /// Hide every entry whose name contains this text
    AddToIgnore(String),
    OpenInFileManager(std::path::PathBuf),
}

pub struct ContextMenu;

impl ContextMenu {
    /// Attach the menu to an entry's response
    pub fn attach(
        response: &egui::Response,
        entry: &LibraryEntry,
        is_favorite: bool,
        i18n: &I18n,
    ) -> Option<ContextAction> {
        let mut action = None;

        response.context_menu(|ui| {
            ui.set_min_width(180.0);

            let favorite = if is_favorite {
                ui.button(format!("★ {}", i18n.get("context-remove-from-favorites")))
            } else {
                ui.button(format!("☆ {}", i18n.get("context-add-to-favorites")))
            };
            if favorite.clicked() {
                action = Some(if is_favorite {
                    ContextAction::RemoveFavorite(entry.path_key())
                } else {
                    ContextAction::AddFavorite(entry.path_key())
                });
                ui.close_menu();
            }

            if ui.button(format!("⊘ {}", i18n.get("context-add-to-ignore"))).clicked() {
                action = Some(ContextAction::AddToIgnore(entry.name.clone()));
                ui.close_menu();
            }

            if ui.button(format!("📂 {}", i18n.get("context-open-folder"))).clicked() {
                action = Some(ContextAction::OpenInFileManager(entry.path.clone()));
                ui.close_menu();
            }
        });

        action
    }
}
