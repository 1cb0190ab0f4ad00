// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Crop Recorder
//!
//! A desktop screen recorder: pick a screen or window, optionally drag out
//! a region on the live preview, and record just that region together with
//! the microphone.

mod app;
mod capture;
mod compositor;
mod config;
mod io;
mod models;
mod recording;
mod studio;
mod ui;
mod util;

#[cfg(test)]
mod testing;

use app::CropRecorderApp;
use anyhow::Result;
use config::Config;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = Config::load();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Crop Recorder"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Crop Recorder",
        options,
        Box::new(|_cc| Ok(Box::new(CropRecorderApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
