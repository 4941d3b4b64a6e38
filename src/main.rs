mod app;
mod color;
mod ui;

use app::PandaExplorerApp;
use eframe::egui;
use panda_explorer::ExplorerConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ExplorerConfig::from_env().unwrap_or_else(|e| {
        log::warn!("Falling back to default configuration: {e:#}");
        ExplorerConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Panda Explorer – File Uploader and Data Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(PandaExplorerApp::new(config)))),
    )
}
