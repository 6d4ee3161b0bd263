// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PazhamPazhutho - banana ripeness grading
//!
//! A desktop application that sends a photo of a banana to a multimodal
//! model, shows the ripeness verdict and plays a matching sound.

mod analysis;
mod app;
mod audio;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::PazhamApp;
use clap::Parser;
use config::{AppConfig, Overrides};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pazhampazhutho", version, about = "Grade banana ripeness from a photo")]
struct Cli {
    /// Config file (defaults to <config dir>/pazhampazhutho/config.yaml)
    #[arg(long, env = "PAZHAM_CONFIG")]
    config: Option<PathBuf>,

    /// Inference API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name, e.g. gemini-1.5-flash
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the inference API
    #[arg(long)]
    endpoint: Option<String>,

    /// Disable audio cues
    #[arg(long)]
    no_sound: bool,

    /// Image to analyze on startup
    image: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply(Overrides {
        api_key: cli.api_key,
        model: cli.model,
        endpoint: cli.endpoint,
        no_sound: cli.no_sound,
    });

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 720.0])
            .with_min_inner_size([720.0, 540.0])
            .with_drag_and_drop(true)
            .with_title("PazhamPazhutho - Banana Ripeness"),
        ..Default::default()
    };

    let initial_image = cli.image;
    let app_creator: eframe::AppCreator = Box::new(move |cc| {
        let app = PazhamApp::new(cc, config, initial_image)?;
        Ok(Box::new(app))
    });

    // Run the application
    eframe::run_native("PazhamPazhutho", options, app_creator)
        .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
