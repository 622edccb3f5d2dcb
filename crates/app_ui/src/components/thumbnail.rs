//! Thumbnail painting shared by the library grid and the page index

use crate::textures::TextureCache;
use crate::theme::Theme;
use app_core::{RenderTarget, ThumbnailManager, ThumbnailState};
use egui::{Align2, FontId, Rect, Rounding, Ui, Vec2};

/// UV rectangle that crops an image to fill `frame` (CSS `object-fit: cover`)
pub fn cover_uv(image: [usize; 2], frame: Vec2) -> Rect {
    let (iw, ih) = (image[0] as f32, image[1] as f32);
    if iw <= 0.0 || ih <= 0.0 || frame.x <= 0.0 || frame.y <= 0.0 {
        return Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    }

    let image_aspect = iw / ih;
    let frame_aspect = frame.x / frame.y;
    if image_aspect > frame_aspect {
        // Wider than the frame: trim the sides
        let visible = frame_aspect / image_aspect;
        let margin = (1.0 - visible) / 2.0;
        Rect::from_min_max(egui::pos2(margin, 0.0), egui::pos2(1.0 - margin, 1.0))
    } else {
        let visible = image_aspect / frame_aspect;
        let margin = (1.0 - visible) / 2.0;
        Rect::from_min_max(egui::pos2(0.0, margin), egui::pos2(1.0, 1.0 - margin))
    }
}

/// Largest rectangle with the image's aspect ratio centred in `frame`
pub fn contain_rect(image: [usize; 2], frame: Rect) -> Rect {
    let (iw, ih) = (image[0] as f32, image[1] as f32);
    if iw <= 0.0 || ih <= 0.0 {
        return frame;
    }
    let scale = (frame.width() / iw).min(frame.height() / ih);
    Rect::from_center_size(frame.center(), egui::vec2(iw * scale, ih * scale))
}

/// Paint the thumbnail for `target` into `rect`, or a placeholder.
///
/// `placeholder` is shown when there is no target or the render failed.
pub fn paint_thumbnail(
    ui: &Ui,
    rect: Rect,
    rounding: Rounding,
    target: Option<&RenderTarget>,
    thumbnails: &ThumbnailManager,
    textures: &mut TextureCache,
    placeholder: &str,
    theme: &Theme,
) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, rounding, theme.placeholder);

    let Some(target) = target else {
        paint_placeholder_text(&painter, rect, placeholder, theme);
        return;
    };

    match thumbnails.state(target) {
        ThumbnailState::Ready(image) => {
            let texture = textures.get_or_upload(ui.ctx(), target, &image);
            let uv = cover_uv(texture.size(), rect.size());
            painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
        }
        ThumbnailState::Pending | ThumbnailState::Loading => {
            let spinner = Rect::from_center_size(rect.center(), egui::vec2(20.0, 20.0));
            egui::Spinner::new().color(theme.text_secondary).paint_at(ui, spinner);
        }
        ThumbnailState::Failed => paint_placeholder_text(&painter, rect, placeholder, theme),
    }
}

fn paint_placeholder_text(painter: &egui::Painter, rect: Rect, text: &str, theme: &Theme) {
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(16.0),
        theme.text_secondary,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_cover_uv_trims_wide_images() {
        // 400x200 into a 2:3 cell keeps the middle third of the width
        let uv = cover_uv([400, 200], egui::vec2(200.0, 300.0));
        assert!(approx(uv.min.y, 0.0) && approx(uv.max.y, 1.0));
        assert!(approx(uv.width(), 1.0 / 3.0));
        assert!(approx(uv.center().x, 0.5));
    }

    #[test]
    fn test_cover_uv_trims_tall_images() {
        let uv = cover_uv([100, 400], egui::vec2(200.0, 300.0));
        assert!(approx(uv.min.x, 0.0) && approx(uv.max.x, 1.0));
        assert!(approx(uv.height(), 0.375));
    }

    #[test]
    fn test_contain_rect_letterboxes() {
        let frame = Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1000.0, 500.0));
        let r = contain_rect([800, 1200], frame);
        assert!(approx(r.height(), 500.0));
        assert!(approx(r.width(), 500.0 * 800.0 / 1200.0));
        assert!(approx(r.center().x, 500.0));
    }
}
