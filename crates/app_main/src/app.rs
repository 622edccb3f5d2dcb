//! Application main loop
//!
//! Owns the window, the egui context and the two screens (library and
//! reader), and routes keyboard commands, worker results and window state
//! between them.

use anyhow::Result;
use app_core::{
    AppEvent, AppState, Command, Listing, ListingLoader, LibraryModel, ReaderAction, ReaderSource, Subscription,
    ThumbnailManager, WindowCommand, WindowState,
};
use app_fs::LibraryEntry;
use app_ui::components::{
    pick_directory, ContextAction, Header, HeaderAction, HeaderState, LibraryAction, LibraryProps, LibraryView,
    ReaderView, SettingsAction, SettingsDialog, TitleBar, TITLE_BAR_HEIGHT,
};
use app_ui::{InputHandler, Renderer, Theme};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

/// While listings or thumbnails are in flight the loop polls at this rate
const POLL_INTERVAL: Duration = Duration::from_millis(16);

enum Screen {
    Library,
    Reader(Box<ReaderView>),
}

/// Main application state for the event loop
struct App {
    state: AppState,

    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,

    input: InputHandler,
    theme: Theme,

    window_state: WindowState,
    window_events: Subscription<AppEvent>,

    listing: ListingLoader,
    library: LibraryModel,
    library_view: LibraryView,
    thumbnails: ThumbnailManager,
    /// A folder was clicked and its pages are being listed
    opening_folder: bool,

    screen: Screen,
    settings: SettingsDialog,

    next_repaint: Option<Instant>,
    exit_requested: bool,
}

impl App {
    fn new(state: AppState) -> Self {
        let config = &state.config;
        let theme = Theme::by_name(&config.general.theme);
        let input = InputHandler::new(state.keymap.clone());
        let library = LibraryModel::new(config.library.sort_order, config.library.view_mode);
        let thumbnails = ThumbnailManager::new(state.render.clone(), &config.thumbnails);
        let listing = state.listing_loader();
        let window_events = state.events.subscribe();

        let mut app = Self {
            state,
            window: None,
            renderer: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,
            input,
            theme,
            window_state: WindowState::default(),
            window_events,
            listing,
            library,
            library_view: LibraryView::new(),
            thumbnails,
            opening_folder: false,
            screen: Screen::Library,
            settings: SettingsDialog::new(),
            next_repaint: None,
            exit_requested: false,
        };

        if let Some(root) = app.state.preferences.get().root_path.clone() {
            app.load_library(Path::new(&root));
        }

        app
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let config = &self.state.config;
        let window_attrs = Window::default_attributes()
            .with_title(self.state.i18n.get("app-title"))
            .with_inner_size(winit::dpi::LogicalSize::new(config.window.width, config.window.height))
            .with_min_inner_size(winit::dpi::LogicalSize::new(480, 360))
            .with_decorations(false)
            .with_maximized(config.general.start_maximized);

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // Initialize renderer
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        // Initialize egui
        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        app_ui::install_fonts(&self.egui_ctx);
        self.theme.apply(&self.egui_ctx);

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.egui_state = Some(egui_state);
        self.sync_window_state();

        Ok(())
    }

    /// Publish maximize / fullscreen changes seen on the native window
    fn sync_window_state(&self) {
        let Some(window) = &self.window else {
            return;
        };

        let fullscreen = window.fullscreen().is_some();
        if fullscreen != self.window_state.fullscreen {
            self.state.events.publish(AppEvent::FullscreenChanged(fullscreen));
        }
        let maximized = window.is_maximized();
        if maximized != self.window_state.maximized {
            self.state.events.publish(AppEvent::MaximizedChanged(maximized));
        }
    }

    fn window_command(&mut self, command: WindowCommand) {
        let Some(window) = &self.window else {
            return;
        };

        match command {
            WindowCommand::Minimize => window.set_minimized(true),
            WindowCommand::ToggleMaximize => window.set_maximized(!window.is_maximized()),
            WindowCommand::ToggleFullscreen => {
                let fullscreen = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                window.set_fullscreen(fullscreen);
            }
            WindowCommand::Close => self.exit_requested = true,
            WindowCommand::StartDrag => {
                if let Err(e) = window.drag_window() {
                    tracing::debug!("Window drag unavailable: {}", e);
                }
            }
        }
        self.sync_window_state();
    }

    // ------------------------------------------------------------------
    // Library
    // ------------------------------------------------------------------

    fn load_library(&mut self, root: &Path) {
        tracing::info!(root = %root.display(), "Loading library");
        self.library.begin_loading();
        self.listing.request_library(root);
        self.thumbnails.clear();
        self.library_view.clear_textures();
    }

    fn reload_library(&mut self) {
        if let Some(root) = self.state.preferences.get().root_path.clone() {
            self.load_library(Path::new(&root));
        }
    }

    /// Ask for a new root folder; cancelling keeps the current one
    fn choose_root(&mut self) {
        let current = self.state.preferences.get().root_path.clone();
        let Some(path) = pick_directory(current.as_deref()) else {
            return;
        };

        let root = path.to_string_lossy().into_owned();
        if let Err(e) = self.state.preferences.set_root_path(Some(root)) {
            tracing::error!("Failed to save library folder: {}", e);
        }
        self.library_view.reset_scroll();
        self.load_library(&path);
    }

    fn poll_listings(&mut self) {
        for result in self.listing.poll() {
            match result.listing {
                Listing::Library(entries) => {
                    tracing::info!(root = %result.path.display(), count = entries.len(), "Library loaded");
                    self.library.set_entries(entries);
                }
                Listing::Pages(pages) => {
                    self.opening_folder = false;
                    tracing::info!(folder = %result.path.display(), pages = pages.len(), "Opening folder");
                    self.enter_reader(ReaderSource::Images(pages));
                }
            }
        }
    }

    fn open_entry(&mut self, entry: LibraryEntry) {
        if !entry.is_selectable() {
            return;
        }
        if entry.is_file {
            self.enter_reader(ReaderSource::Document(entry.path));
        } else {
            self.opening_folder = true;
            self.listing.request_pages(&entry.path);
        }
    }

    fn enter_reader(&mut self, source: ReaderSource) {
        self.library_view.remember_scroll();
        let view = ReaderView::new(source, self.state.render.clone(), &self.state.config, Instant::now());
        self.screen = Screen::Reader(Box::new(view));
    }

    fn back_to_library(&mut self) {
        self.listing.cancel_pages();
        self.opening_folder = false;
        self.screen = Screen::Library;
    }

    fn context_action(&mut self, action: ContextAction) {
        let prefs = &mut self.state.preferences;
        let result = match action {
            ContextAction::AddFavorite(path) => prefs.add_favorite(&path).map(|_| ()),
            ContextAction::RemoveFavorite(path) => prefs.remove_favorite(&path).map(|_| ()),
            ContextAction::AddToIgnore(name) => prefs.add_ignore_pattern(&name).map(|_| ()),
            ContextAction::OpenInFileManager(path) => {
                app_fs::open_in_file_manager(&path);
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::error!("Failed to update preferences: {}", e);
        }
        self.library.invalidate();
    }

    fn settings_action(&mut self, action: SettingsAction) {
        let result = match action {
            SettingsAction::SetLanguage(language) => self.state.set_language(&language),
            SettingsAction::AddIgnorePattern(pattern) => {
                self.state.preferences.add_ignore_pattern(&pattern).map(|_| ())
            }
            SettingsAction::RemoveIgnorePattern(pattern) => {
                self.state.preferences.remove_ignore_pattern(&pattern).map(|_| ())
            }
            SettingsAction::ResetApp => {
                tracing::warn!("Resetting all preferences");
                let result = self.state.reset_preferences();
                self.settings.close();
                self.back_to_library();
                self.library.search.clear();
                self.library.clear();
                self.thumbnails.clear();
                self.library_view.clear_textures();
                self.library_view.reset_scroll();
                result
            }
        };

        if let Err(e) = result {
            tracing::error!("Failed to update preferences: {}", e);
        }
        self.library.invalidate();
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn execute_command(&mut self, command: Command) {
        tracing::debug!(command = command.id().as_str(), "Command");
        let now = Instant::now();

        match command {
            Command::ToggleFullscreen => self.window_command(WindowCommand::ToggleFullscreen),
            Command::OpenSettings => self.settings.open(),
            _ if self.settings.open => {}
            Command::ReloadLibrary => {
                if matches!(self.screen, Screen::Library) {
                    self.reload_library();
                }
            }
            Command::ReaderNext | Command::ReaderPrev | Command::ReaderBack | Command::ReaderToggleIndex => {
                let action = match &mut self.screen {
                    Screen::Reader(view) => view.on_command(command, now),
                    Screen::Library => ReaderAction::None,
                };
                if action == ReaderAction::BackToLibrary {
                    self.back_to_library();
                }
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    fn ui(&mut self, ctx: &egui::Context) {
        let now = Instant::now();

        for event in self.window_events.try_iter() {
            self.window_state.apply(event);
        }
        self.poll_listings();
        self.thumbnails.tick(now);

        let mut window_command = None;
        if self.window_state.show_chrome() {
            egui::TopBottomPanel::top("title_bar")
                .exact_height(TITLE_BAR_HEIGHT)
                .frame(egui::Frame::none().fill(self.theme.surface))
                .show(ctx, |ui| {
                    window_command = TitleBar::ui(ui, &self.state.i18n, &self.theme, self.window_state.maximized);
                });
        }

        let back = match &mut self.screen {
            Screen::Reader(view) => view.ui(ctx, &self.state.i18n, &self.theme, now) == ReaderAction::BackToLibrary,
            Screen::Library => false,
        };
        if back {
            self.back_to_library();
        } else if matches!(self.screen, Screen::Library) {
            self.library_ui(ctx, now);
        }

        if let Some(action) = self
            .settings
            .ui(ctx, &self.state.i18n, &self.theme, self.state.preferences.get())
        {
            self.settings_action(action);
        }

        if let Some(command) = window_command {
            self.window_command(command);
        }

        if self.library.is_loading() || self.opening_folder || self.thumbnails.has_work() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
        if let Some(deadline) = self.thumbnails.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    fn library_ui(&mut self, ctx: &egui::Context, now: Instant) {
        let mut header_action = None;

        if self.window_state.show_chrome() {
            let favorites_only = self.library.favorites_only();
            let sort_order = self.library.sort_order();
            let view_mode = self.library.view_mode();
            let root = self.state.preferences.get().root_path.clone();

            egui::TopBottomPanel::top("header")
                .frame(
                    egui::Frame::none()
                        .fill(self.theme.background)
                        .inner_margin(egui::Margin::symmetric(16.0, 10.0)),
                )
                .show(ctx, |ui| {
                    let header = HeaderState {
                        search: &mut self.library.search,
                        favorites_only,
                        sort_order,
                        view_mode,
                        fullscreen: self.window_state.fullscreen,
                        root_path: root.as_deref(),
                    };
                    header_action = Header::ui(ui, header, &self.state.i18n, &self.theme);
                });
        }

        let mut library_action = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.background))
            .show(ctx, |ui| {
                let prefs = self.state.preferences.get();
                let loading = self.library.is_loading() || self.opening_folder;
                let filtering = self.library.is_filtering();
                let view_mode = self.library.view_mode();
                let props = LibraryProps {
                    entries: self.library.visible(prefs),
                    favorites: &prefs.favorite_paths,
                    view_mode,
                    loading,
                    filtering,
                    config: &self.state.config.library,
                };
                library_action =
                    self.library_view
                        .ui(ui, &props, &mut self.thumbnails, &self.state.i18n, &self.theme, now);
            });

        match header_action {
            Some(HeaderAction::SearchChanged) | None => {}
            Some(HeaderAction::ToggleFavoritesOnly) => self.library.toggle_favorites_only(),
            Some(HeaderAction::ToggleSortOrder) => self.library.toggle_sort_order(),
            Some(HeaderAction::ToggleViewMode) => self.library.toggle_view_mode(),
            Some(HeaderAction::ToggleFullscreen) => self.window_command(WindowCommand::ToggleFullscreen),
            Some(HeaderAction::Reload) => self.reload_library(),
            Some(HeaderAction::OpenFolder) => self.choose_root(),
            Some(HeaderAction::OpenSettings) => self.settings.open(),
        }

        match library_action {
            Some(LibraryAction::Open(entry)) => self.open_entry(entry),
            Some(LibraryAction::Context(action)) => self.context_action(action),
            Some(LibraryAction::OpenFolder) => self.choose_root(),
            None => {}
        }
    }

    fn render(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };

        let raw_input = egui_state.take_egui_input(&window);
        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| self.ui(ctx));

        if let Some(egui_state) = &mut self.egui_state {
            egui_state.handle_platform_output(&window, full_output.platform_output);
        }

        let delay = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map_or(Duration::MAX, |v| v.repaint_delay);
        self.next_repaint = Instant::now().checked_add(delay);

        if let Some(renderer) = &mut self.renderer {
            renderer.paint(
                &ctx,
                full_output.textures_delta,
                full_output.shapes,
                full_output.pixels_per_point,
                self.theme.background,
            );
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("Failed to initialize window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.repaint {
                window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize((size.width, size.height));
                }
                self.sync_window_state();
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.input.update_modifiers(modifiers.state());
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(command) = self.input.handle_key(&event) {
                    self.execute_command(command);
                }
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match self.next_repaint {
            Some(at) if at <= Instant::now() => {
                self.next_repaint = None;
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                event_loop.set_control_flow(ControlFlow::Wait);
            }
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

/// Run the application
pub fn run(state: AppState) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(state);
    event_loop.run_app(&mut app)?;

    tracing::info!("Azami Reader exiting");
    Ok(())
}
