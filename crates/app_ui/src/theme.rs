//! Application theming

use egui::{Color32, Visuals};

/// Application theme
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub surface: Color32,
    pub primary: Color32,
    pub text: Color32,
    pub text_secondary: Color32,
    pub accent: Color32,
    pub favorite: Color32,
    pub danger: Color32,
    pub placeholder: Color32,
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x12, 0x12, 0x12),
            surface: Color32::from_rgb(0x1e, 0x1e, 0x1e),
            primary: Color32::from_rgb(0x2a, 0x2a, 0x2a),
            text: Color32::from_rgb(0xe0, 0xe0, 0xe0),
            text_secondary: Color32::from_rgb(0xa0, 0xa0, 0xa0),
            accent: Color32::from_rgb(0xa6, 0x8e, 0xc9), // thistle
            favorite: Color32::from_rgb(0xff, 0xc1, 0x07),
            danger: Color32::from_rgb(0xe5, 0x48, 0x4d),
            placeholder: Color32::from_rgb(0x33, 0x33, 0x33),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(250, 250, 250),
            surface: Color32::from_rgb(255, 255, 255),
            primary: Color32::from_rgb(230, 230, 230),
            text: Color32::from_rgb(32, 32, 32),
            text_secondary: Color32::from_rgb(100, 100, 100),
            accent: Color32::from_rgb(0x7e, 0x5f, 0xa8),
            favorite: Color32::from_rgb(0xe0, 0xa0, 0x00),
            danger: Color32::from_rgb(220, 38, 38),
            placeholder: Color32::from_rgb(210, 210, 210),
        }
    }

    /// Apply theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let mut visuals = if self.name == "dark" {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        visuals.panel_fill = self.background;
        visuals.window_fill = self.surface;
        visuals.extreme_bg_color = self.background;
        visuals.faint_bg_color = self.primary;

        visuals.widgets.noninteractive.bg_fill = self.surface;
        visuals.widgets.noninteractive.fg_stroke.color = self.text;

        visuals.widgets.inactive.bg_fill = self.primary;
        visuals.widgets.inactive.weak_bg_fill = self.primary;
        visuals.widgets.inactive.fg_stroke.color = self.text;

        visuals.widgets.hovered.bg_fill = self.accent.linear_multiply(0.3);
        visuals.widgets.hovered.fg_stroke.color = self.text;

        visuals.widgets.active.bg_fill = self.accent.linear_multiply(0.5);
        visuals.widgets.active.fg_stroke.color = self.text;

        visuals.selection.bg_fill = self.accent.linear_multiply(0.4);
        visuals.selection.stroke.color = self.accent;

        style.visuals = visuals;
        ctx.set_style(style);
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Add a system CJK font as a fallback so Japanese labels render
pub fn install_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    match load_cjk_font_bytes() {
        Some(bytes) => {
            let name = "cjk".to_string();
            fonts.font_data.insert(name.clone(), egui::FontData::from_owned(bytes));
            for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                if let Some(list) = fonts.families.get_mut(&family) {
                    list.push(name.clone());
                }
            }
        }
        None => tracing::warn!("No CJK font found; Japanese text may not render"),
    }

    ctx.set_fonts(fonts);
}

fn load_cjk_font_bytes() -> Option<Vec<u8>> {
    let mut candidates: Vec<&str> = Vec::new();

    #[cfg(windows)]
    candidates.extend([
        r"C:\Windows\Fonts\YuGothM.ttc",
        r"C:\Windows\Fonts\meiryo.ttc",
        r"C:\Windows\Fonts\msgothic.ttc",
    ]);

    #[cfg(target_os = "macos")]
    candidates.extend([
        "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
        "/System/Library/Fonts/Hiragino Sans GB.ttc",
    ]);

    #[cfg(all(unix, not(target_os = "macos")))]
    candidates.extend([
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansJP-Regular.otf",
    ]);

    candidates.into_iter().find_map(|path| std::fs::read(path).ok())
}
