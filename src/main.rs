mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::TabulaApp;
use config::AppConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config_path = AppConfig::default_path();
    let config = match &config_path {
        Some(path) => {
            log::info!("preferences: {}", path.display());
            AppConfig::load_from(path)
        }
        None => {
            log::warn!("no config directory available; preferences will not be saved");
            AppConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tabula – Data Workbench",
        options,
        Box::new(move |_cc| Ok(Box::new(TabulaApp::new(AppState::new(config, config_path))))),
    )
}
