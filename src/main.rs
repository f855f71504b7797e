mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{anyhow, Context, Result};
use app::EstateLensApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env().context("loading configuration")?;

    // The sheet is loaded once, before the window opens; failure is fatal.
    let table = data::loader::load_file(&config.data_path)
        .with_context(|| format!("loading listings from {}", config.data_path.display()))
        .inspect_err(|e| log::error!("{e:#}"))?;

    let mut state = AppState::new(config.clone());
    state.set_table(table, Some(config.data_path.clone()));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Estate Lens – Real Estate Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(EstateLensApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard: {e}"))
}
