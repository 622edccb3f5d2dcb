//! Host window controls

use crate::events::AppEvent;

/// Requests from the UI to the native window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    Minimize,
    ToggleMaximize,
    ToggleFullscreen,
    Close,
    /// Begin an OS window move from the custom title bar
    StartDrag,
}

/// Last known native window state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowState {
    pub fullscreen: bool,
    pub maximized: bool,
}

impl WindowState {
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::FullscreenChanged(on) => self.fullscreen = on,
            AppEvent::MaximizedChanged(on) => self.maximized = on,
        }
    }

    /// The title bar and header are hidden in fullscreen
    pub fn show_chrome(&self) -> bool {
        !self.fullscreen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_events() {
        let mut state = WindowState::default();
        state.apply(AppEvent::FullscreenChanged(true));
        assert!(!state.show_chrome());
        state.apply(AppEvent::MaximizedChanged(true));
        state.apply(AppEvent::FullscreenChanged(false));
        assert_eq!(
            state,
            WindowState {
                fullscreen: false,
                maximized: true
            }
        );
    }
}
