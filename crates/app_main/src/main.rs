//! Azami Reader - image folder and PDF library viewer
//!
//! Startup order: logging, config, preferences, localization, workers, window.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use anyhow::Result;

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    let _log_guard = app_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("Azami Reader starting...");

    // Load configuration
    let config = app_core::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {}", e);
        app_core::AppConfig::default()
    });

    // Preferences, localization and workers
    let state = app_core::AppState::new(config)?;

    // Run the application
    app::run(state)
}
