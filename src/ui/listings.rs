use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::ads::{next_inline_ad, AdCursor, AdSettings, Placement};
use crate::data::model::{format_price, Listing};
use crate::state::AppState;

/// An inline ad slot follows every this many listing rows.
const AD_EVERY: usize = 6;

/// One row of the listing table.
#[derive(Debug, Clone, PartialEq)]
pub enum Row<'a> {
    Listing(usize),
    Ad(&'a str),
}

/// Interleave inline ads into the visible listing indices. The rotation
/// cursor starts fresh for every render pass.
pub fn listing_rows<'a>(visible: &[usize], ads: &'a AdSettings) -> Vec<Row<'a>> {
    let mut rows = Vec::with_capacity(visible.len() + visible.len() / AD_EVERY);
    let mut cursor = AdCursor::default();
    for (n, &idx) in visible.iter().enumerate() {
        rows.push(Row::Listing(idx));
        if (n + 1) % AD_EVERY == 0 {
            let (code, next) = next_inline_ad(ads, cursor);
            cursor = next;
            if let Some(code) = code {
                rows.push(Row::Ad(code));
            }
        }
    }
    rows
}

/// Placeholder for an ad code. The markup itself is never interpreted.
fn ad_slot(ui: &mut Ui, code: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(RichText::new("Advertisement").weak().small())
            .on_hover_text(code);
    });
}

// ---------------------------------------------------------------------------
// Listing table (central panel)
// ---------------------------------------------------------------------------

pub fn listing_table(ui: &mut Ui, state: &mut AppState) {
    let Some(collection) = &state.collection else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file to browse vehicles  (File → Open…)");
        });
        return;
    };

    if let Some(code) = state.ads.leaderboard() {
        ad_slot(ui, code);
    }

    if state.visible_indices.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No vehicles match your filters");
        });
        return;
    }

    let rows = listing_rows(&state.visible_indices, &state.ads);
    let selected = state.selected;
    let mut clicked = None;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .sense(egui::Sense::click())
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::remainder().at_least(180.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(110.0))
        .column(Column::auto().at_least(90.0))
        .header(20.0, |mut header| {
            for title in ["Title", "Price", "Year", "Make", "Model", "District"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for row in &rows {
                match *row {
                    Row::Listing(idx) => {
                        let listing = &collection.listings[idx];
                        body.row(22.0, |mut table_row| {
                            table_row.set_selected(selected == Some(idx));
                            let cells = [
                                listing.display_title(),
                                format_price(listing.price),
                                listing.year.to_string(),
                                listing.make.clone(),
                                listing.model.clone(),
                                listing.district.clone(),
                            ];
                            for text in cells {
                                table_row.col(|ui: &mut Ui| {
                                    ui.label(text);
                                });
                            }
                            if table_row.response().clicked() {
                                clicked = Some(idx);
                            }
                        });
                    }
                    Row::Ad(code) => {
                        body.row(22.0, |mut table_row| {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(RichText::new("Advertisement").weak().small())
                                    .on_hover_text(code);
                            });
                            for _ in 0..5 {
                                table_row.col(|_ui: &mut Ui| {});
                            }
                        });
                    }
                }
            }
        });

    if let Some(idx) = clicked {
        state.selected = if state.selected == Some(idx) { None } else { Some(idx) };
    }
}

// ---------------------------------------------------------------------------
// Listing detail (right side panel)
// ---------------------------------------------------------------------------

fn image_uri(path: &str) -> String {
    if path.contains("://") {
        path.to_string()
    } else {
        format!("file://{path}")
    }
}

pub fn detail_panel(ui: &mut Ui, listing: &Listing, ads: &AdSettings) {
    ui.heading(listing.display_title());
    ui.label(RichText::new(format_price(listing.price)).strong().size(18.0));
    ui.separator();

    if let Some(image) = listing.images.first() {
        ui.add(
            egui::Image::new(image_uri(image))
                .max_width(ui.available_width())
                .max_height(200.0),
        );
    }
    if let Some(code) = ads.detail_ad(Placement::AfterImage) {
        ad_slot(ui, code);
    }

    egui::Grid::new("listing_details")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            let mileage = format!("{} km", listing.mileage);
            let location = match (listing.city.as_str(), listing.district.as_str()) {
                ("", district) => district.to_string(),
                (city, district) if city == district => city.to_string(),
                (city, district) => format!("{city}, {district}"),
            };
            let fields = [
                ("Make", listing.make.as_str()),
                ("Model", listing.model.as_str()),
                ("Type", listing.listing_type.as_str()),
                ("Condition", listing.condition.as_str()),
                ("Transmission", listing.transmission.as_str()),
                ("Fuel type", listing.fuel_type.as_str()),
                ("Mileage", mileage.as_str()),
                ("Location", location.as_str()),
                ("Seller", listing.seller_name.as_str()),
                ("Posted", listing.posted_date.as_str()),
            ];
            ui.label("Year");
            ui.label(listing.year.to_string());
            ui.end_row();
            for (name, value) in fields.into_iter().filter(|(_, v)| !v.is_empty()) {
                ui.label(name);
                ui.label(value);
                ui.end_row();
            }
        });

    if let Some(code) = ads.detail_ad(Placement::AfterDetails) {
        ad_slot(ui, code);
    }
    if let Some(code) = ads.detail_ad(Placement::AboveFooter) {
        ui.add_space(8.0);
        ad_slot(ui, code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ad_rows_without_codes() {
        let settings = AdSettings::default();
        let rows = listing_rows(&(0..13).collect::<Vec<_>>(), &settings);
        assert_eq!(rows.len(), 13);
        assert!(rows.iter().all(|r| matches!(r, Row::Listing(_))));
    }

    #[test]
    fn test_ads_rotate_after_every_sixth_listing() {
        let ads = AdSettings {
            inline_ad_codes: vec!["a".into(), "".into(), "b".into()],
            ..AdSettings::default()
        };
        let visible: Vec<usize> = (0..19).collect();
        let rows = listing_rows(&visible, &ads);

        let ad_positions: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| matches!(r, Row::Ad(_)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(ad_positions, vec![6, 13, 20]);
        assert_eq!(rows[6], Row::Ad("a"));
        assert_eq!(rows[13], Row::Ad("b"));
        assert_eq!(rows[20], Row::Ad("a"));

        // A second render pass starts the rotation over.
        assert_eq!(listing_rows(&visible, &ads)[6], Row::Ad("a"));
    }

    #[test]
    fn test_image_uri() {
        assert_eq!(image_uri("/tmp/car.jpg"), "file:///tmp/car.jpg");
        assert_eq!(image_uri("https://cdn/x.png"), "https://cdn/x.png");
    }
}
