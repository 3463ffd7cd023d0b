//! Energy Dashboard - Country Energy Data Viewer
//!
//! Loads the OWID energy dataset, filters it to one country and a year range,
//! and shows the rows alongside line, bar, box and correlation charts.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use config::{DashboardConfig, CONFIG_FILE_NAME};
use eframe::egui;
use gui::EnergyDashboardApp;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE_NAME))?;
    log::info!("Starting dashboard for {}", config.country);

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title(config.title()),
        ..Default::default()
    };

    eframe::run_native(
        "Energy Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(EnergyDashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run dashboard: {e}"))
}
