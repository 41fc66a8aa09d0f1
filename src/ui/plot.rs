use std::collections::BTreeMap;

use eframe::egui::{self, Color32, Ui};
use egui_plot::{Legend, Plot, Points};

use crate::data::model::Facet;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Price / year scatter (bottom panel)
// ---------------------------------------------------------------------------

/// Render visible listings as price (millions) against model year, one
/// series per value of the colour facet.
pub fn price_year_plot(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Color by");
        let current = state.color_facet;
        egui::ComboBox::from_id_salt("color_by")
            .selected_text(current.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for facet in Facet::ALL {
                    if ui.selectable_label(current == facet, facet.to_string()).clicked() {
                        state.set_color_facet(facet);
                    }
                }
            });
    });

    if state.collection.is_none() {
        return;
    }

    let facet = state.color_facet;
    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for (_, listing) in state.visible_listings() {
        series
            .entry(listing.facet(facet))
            .or_default()
            .push([listing.year as f64, listing.price / 1_000_000.0]);
    }

    let color_map = &state.color_map;

    Plot::new("price_year_plot")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Price (Rs. M)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (value, points) in series {
                let color = color_map
                    .as_ref()
                    .map(|cm| cm.color_for(value))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let name = if value.is_empty() { "<none>" } else { value };

                plot_ui.points(
                    Points::new(points)
                        .name(name)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}
