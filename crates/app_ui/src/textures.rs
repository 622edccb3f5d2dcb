//! GPU texture handles for decoded pages and thumbnails

use app_core::{RenderTarget, RenderedImage};
use std::collections::HashMap;

/// Keeps one egui texture per render target.
///
/// Handles free their GPU memory when dropped, so `retain` is what
/// releases textures that scrolled out of the cache.
#[derive(Default)]
pub struct TextureCache {
    label: &'static str,
    handles: HashMap<RenderTarget, egui::TextureHandle>,
}

impl TextureCache {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            handles: HashMap::new(),
        }
    }

    pub fn get(&self, target: &RenderTarget) -> Option<&egui::TextureHandle> {
        self.handles.get(target)
    }

    /// Upload `image` the first time `target` is seen
    pub fn get_or_upload(
        &mut self,
        ctx: &egui::Context,
        target: &RenderTarget,
        image: &RenderedImage,
    ) -> egui::TextureHandle {
        if let Some(handle) = self.handles.get(target) {
            return handle.clone();
        }

        let color = egui::ColorImage::from_rgba_unmultiplied(
            [image.width as usize, image.height as usize],
            &image.rgba,
        );
        let name = format!("{}:{}", self.label, target.path().display());
        let handle = ctx.load_texture(name, color, egui::TextureOptions::LINEAR);
        self.handles.insert(target.clone(), handle.clone());
        handle
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&RenderTarget) -> bool) {
        self.handles.retain(|target, _| keep(target));
    }

    pub fn remove(&mut self, target: &RenderTarget) {
        self.handles.remove(target);
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn image() -> RenderedImage {
        RenderedImage {
            width: 2,
            height: 1,
            rgba: vec![255; 8],
        }
    }

    #[test]
    fn test_upload_once_per_target() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::new("thumb");
        let a = RenderTarget::Image(PathBuf::from("/lib/a/001.png"));
        let b = RenderTarget::PdfPage {
            path: PathBuf::from("/lib/b.pdf"),
            index: 0,
        };

        let first = cache.get_or_upload(&ctx, &a, &image());
        let again = cache.get_or_upload(&ctx, &a, &image());
        assert_eq!(first.id(), again.id());
        assert_eq!(first.size(), [2, 1]);

        cache.get_or_upload(&ctx, &b, &image());
        assert_eq!(cache.len(), 2);

        cache.retain(|t| t == &b);
        assert!(cache.get(&a).is_none());
        assert!(cache.get(&b).is_some());
    }
}
