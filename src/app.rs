use eframe::egui;

use crate::state::AppState;
use crate::ui::{listings, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyWheelsApp {
    pub state: AppState,
}

impl RustyWheelsApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for RustyWheelsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: selected listing ----
        if let Some(listing) = self.state.selected_listing() {
            let ads = &self.state.ads;
            egui::SidePanel::right("detail_panel")
                .default_width(300.0)
                .resizable(true)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        listings::detail_panel(ui, listing, ads);
                    });
                });
        }

        // ---- Bottom panel: price / year scatter ----
        egui::TopBottomPanel::bottom("plot_panel")
            .default_height(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::price_year_plot(ui, &mut self.state);
            });

        // ---- Central panel: listing table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            listings::listing_table(ui, &mut self.state);
        });

        panels::taxonomy_window(ctx, &mut self.state);
    }
}
