use eframe::egui::{self, RichText};

use crate::state::AppState;
use crate::ui::{panels, tabs};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EstateLensApp {
    pub state: AppState,
}

impl EstateLensApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for EstateLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("🏙 Real Estate Analytics Platform");
            ui.label(
                "Visualise, filter and analyse the listings market at both macro and micro level. \
                 Data is filterable via the left panel.",
            );
            panels::tab_bar(ui, &mut self.state);
            ui.separator();

            let state = &self.state;
            let Some(table) = &state.table else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a file to view listings  (File → Open…)");
                });
                return;
            };

            if state.view.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.heading("No matching listings");
                    ui.label(
                        RichText::new("No listing satisfies every active filter. Widen or reset the filters.")
                            .weak(),
                    );
                });
                return;
            }

            tabs::show(ui, state, table);
        });
    }
}
