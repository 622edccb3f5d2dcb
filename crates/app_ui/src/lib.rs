//! Azami Reader UI layer
//!
//! Provides:
//! - egui components for the library, the reader and the dialogs
//! - wgpu surface and egui painting
//! - Keyboard → command resolution
//! - Texture uploads for decoded pages and thumbnails

pub mod renderer;
pub mod components;
pub mod input;
pub mod theme;
pub mod textures;

pub use renderer::Renderer;
pub use input::InputHandler;
pub use theme::{install_fonts, Theme};
pub use textures::TextureCache;
