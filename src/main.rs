// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tunascope - Sports Tracking Review
//!
//! A cross-platform desktop application for reviewing multi-camera
//! sports footage with tracking overlays, correcting player identities,
//! and round-tripping them through a tracking service.

mod app;
mod io;
mod models;
mod net;
mod overlay;
mod settings;
mod ui;
mod util;

use app::TunascopeApp;
use settings::Settings;
use anyhow::Result;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let settings = Settings::load();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_width, settings.window_height])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Tunascope - Sports Tracking Review"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Tunascope",
        options,
        Box::new(move |_cc| Ok(Box::new(TunascopeApp::new(settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
