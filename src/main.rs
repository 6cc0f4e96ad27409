mod app;
mod color;
mod state;
mod ui;

use anyhow::Context;
use app::GreenhouseApp;
use eframe::egui;
use greenhouse_dashboard::{AppConfig, Dashboard};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::default();

    // Both inputs are required before a window makes sense.
    let dashboard = Dashboard::load(&config)
        .inspect_err(|e| log::error!("Startup failed: {e}"))
        .context("loading greenhouse data and model")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.inner_size)
            .with_min_inner_size(config.min_inner_size),
        ..Default::default()
    };

    eframe::run_native(
        &config.window_title,
        options,
        Box::new(|_cc| Ok(Box::new(GreenhouseApp::new(dashboard)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
