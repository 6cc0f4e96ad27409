use eframe::egui;

use greenhouse_dashboard::Dashboard;

use crate::state::AppState;
use crate::ui::{form, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GreenhouseApp {
    pub state: AppState,
}

impl GreenhouseApp {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            state: AppState::new(dashboard),
        }
    }
}

impl eframe::App for GreenhouseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and dataset summary ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Bottom panel: footer ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui);
        });

        // ---- Left side panel: plotting controls ----
        egui::SidePanel::left("plotting_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: daily charts + prediction form ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    panels::intro(ui);
                    plot::daily_charts(ui, &self.state);
                    ui.add_space(16.0);
                    form::prediction_form(ui, &mut self.state);
                });
        });
    }
}
