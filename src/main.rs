mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use app::TradeScopeApp;
use config::Config;
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();

    // Optional first argument: path to a JSON config file.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::resolve(config_path.as_deref())?;

    // The dataset loads once, up front. No files or a schema mismatch is
    // a fatal startup error, not something the UI recovers from.
    let dataset = data::loader::load_dir(&config.data_dir)
        .with_context(|| format!("loading trade data from {}", config.data_dir.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "TradeScope – SEA Trade Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(TradeScopeApp::new(config, dataset)))),
    )
    .map_err(|e| anyhow!("eframe terminated with an error: {e}"))
}
