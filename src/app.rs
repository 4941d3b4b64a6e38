use eframe::egui;
use panda_explorer::{ExplorerConfig, Session};

use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PandaExplorerApp {
    pub session: Session,
}

impl PandaExplorerApp {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            session: Session::new(config),
        }
    }
}

impl eframe::App for PandaExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.session);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session);
            });

        // ---- Central panel: overview, filtered data, analysis ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                panels::overview(ui, &mut self.session);
                plot::analysis_section(ui, &mut self.session);
            });
        });
    }
}
