use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::category::CategoryKey;
use crate::data::model::{CONDITIONS, DISTRICTS, FUEL_TYPES, MAX_YEAR, MIN_YEAR, PRICE_RANGES, TRANSMISSIONS};
use crate::state::AppState;

const ANY: &str = "Any";

/// Combo box over string options where an empty selection means "Any".
/// Returns the newly picked value, if any.
fn choice_combo<'a>(
    ui: &mut Ui,
    id: &str,
    label: &str,
    current: &str,
    options: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let mut picked = None;
    ui.strong(label);
    let shown = if current.is_empty() { ANY } else { current };
    egui::ComboBox::from_id_salt(id)
        .selected_text(shown)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_empty(), ANY).clicked() {
                picked = Some(String::new());
            }
            for option in options {
                if ui.selectable_label(current == option, option).clicked() {
                    picked = Some(option.to_string());
                }
            }
        });
    ui.add_space(4.0);
    picked
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Make ----
            let makes = state.make_options();
            let current = state.draft.make.clone();
            if let Some(make) = choice_combo(ui, "make", "Make", &current, makes.iter().map(String::as_str)) {
                state.set_make(&make);
            }

            // ---- Type (category pages are already scoped) ----
            if state.scope.is_none() {
                let types = state.type_options();
                let current = state.draft.listing_type.clone();
                if let Some(label) = choice_combo(ui, "type", "Type", &current, types.iter().map(String::as_str)) {
                    state.set_type(&label);
                }
            }

            // ---- Model ----
            model_autocomplete(ui, state);

            // ---- Exact-match fields ----
            if let Some(v) = choice_combo(ui, "condition", "Condition", &state.draft.condition, CONDITIONS) {
                state.draft.condition = v;
            }
            if let Some(v) = choice_combo(ui, "transmission", "Transmission", &state.draft.transmission, TRANSMISSIONS) {
                state.draft.transmission = v;
            }
            if let Some(v) = choice_combo(ui, "fuel", "Fuel type", &state.draft.fuel_type, FUEL_TYPES) {
                state.draft.fuel_type = v;
            }
            if let Some(v) = choice_combo(ui, "district", "District", &state.draft.district, DISTRICTS) {
                state.draft.district = v;
            }
            if let Some(v) = choice_combo(
                ui,
                "price",
                "Price range",
                &state.draft.price_range,
                PRICE_RANGES.iter().map(|r| r.label),
            ) {
                state.draft.price_range = v;
            }

            // ---- Year range ----
            ui.strong("Year");
            ui.horizontal(|ui: &mut Ui| {
                ui.add(egui::DragValue::new(&mut state.draft.year_min).range(MIN_YEAR..=MAX_YEAR));
                ui.label("to");
                ui.add(egui::DragValue::new(&mut state.draft.year_max).range(MIN_YEAR..=MAX_YEAR));
            });
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Search").clicked() {
                    state.search();
                }
                if ui.button("Reset").clicked() {
                    state.reset_filters();
                }
            });
        });
}

/// Model text box with a suggestion list underneath.
fn model_autocomplete(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Model");
    let mut query = state.draft.model.clone();
    let hint = format!(
        "Type a model (min {} letters for suggestions)",
        state.config.min_chars
    );
    let response = ui.add(
        egui::TextEdit::singleline(&mut query)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        state.set_model_query(&query);
    }

    // Nothing to suggest once the box holds exactly the only suggestion.
    let settled = state.suggestions.len() == 1 && state.suggestions[0] == state.draft.model;
    if !state.suggestions.is_empty() && !settled {
        let suggestions = state.suggestions.clone();
        egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
            ScrollArea::vertical()
                .id_salt("model_suggestions")
                .max_height(160.0)
                .show(ui, |ui: &mut Ui| {
                    for model in &suggestions {
                        if ui.selectable_label(*model == state.draft.model, model).clicked() {
                            state.pick_suggestion(model);
                        }
                    }
                });
        });
    }
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export taxonomy…").clicked() {
                export_taxonomy_dialog(state);
                ui.close_menu();
            }
        });

        if ui.button("Taxonomy…").clicked() {
            state.taxonomy_form.open = !state.taxonomy_form.open;
        }

        ui.separator();

        let scope_text = state.scope.map_or("All categories", CategoryKey::as_str);
        egui::ComboBox::from_id_salt("scope")
            .selected_text(scope_text)
            .show_ui(ui, |ui: &mut Ui| {
                if ui.selectable_label(state.scope.is_none(), "All categories").clicked() {
                    state.set_scope(None);
                }
                for key in CategoryKey::ALL {
                    if ui.selectable_label(state.scope == Some(key), key.as_str()).clicked() {
                        state.set_scope(Some(key));
                    }
                }
            });

        ui.separator();

        if let Some(collection) = &state.collection {
            ui.label(format!(
                "{} listings loaded, {} visible",
                collection.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Taxonomy window – make/model administration
// ---------------------------------------------------------------------------

pub fn taxonomy_window(ctx: &egui::Context, state: &mut AppState) {
    let mut open = state.taxonomy_form.open;
    egui::Window::new("Taxonomy")
        .open(&mut open)
        .default_width(360.0)
        .show(ctx, |ui: &mut Ui| {
            ui.label(format!(
                "{} categories, {} models",
                state.taxonomy.categories().count(),
                state.taxonomy.model_count()
            ));
            ui.separator();

            ui.strong("Category");
            egui::ComboBox::from_id_salt("taxonomy_category")
                .selected_text(state.taxonomy_form.category.as_str())
                .show_ui(ui, |ui: &mut Ui| {
                    for key in CategoryKey::ALL {
                        ui.selectable_value(&mut state.taxonomy_form.category, key, key.as_str());
                    }
                });

            // ---- Makes of the category ----
            let category = state.taxonomy_form.category;
            let makes: Vec<String> = state.taxonomy.makes(category).into_iter().map(str::to_string).collect();
            ScrollArea::vertical()
                .id_salt("taxonomy_makes")
                .max_height(100.0)
                .show(ui, |ui: &mut Ui| {
                    for make in &makes {
                        if ui.selectable_label(state.taxonomy_form.make == *make, make).clicked() {
                            state.taxonomy_form.make = make.clone();
                            state.taxonomy_form.model.clear();
                        }
                    }
                });

            ui.strong("Make");
            ui.text_edit_singleline(&mut state.taxonomy_form.make);

            // ---- Models of the selected make ----
            let models = state.taxonomy.models(category, &state.taxonomy_form.make).to_vec();
            if !models.is_empty() {
                ScrollArea::vertical()
                    .id_salt("taxonomy_models")
                    .max_height(120.0)
                    .show(ui, |ui: &mut Ui| {
                        for model in &models {
                            if ui.selectable_label(state.taxonomy_form.model == *model, model).clicked() {
                                state.taxonomy_form.model = model.clone();
                            }
                        }
                    });
            }

            ui.strong("Model");
            ui.text_edit_singleline(&mut state.taxonomy_form.model);

            ui.strong("New name");
            ui.text_edit_singleline(&mut state.taxonomy_form.new_name);

            ui.horizontal(|ui: &mut Ui| {
                ui.label("Make:");
                if ui.button("Add").clicked() {
                    state.add_make();
                }
                if ui.button("Rename").clicked() {
                    state.rename_make();
                }
                if ui.button("Delete").clicked() {
                    state.delete_make();
                }
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Model:");
                if ui.button("Add").clicked() {
                    state.add_model();
                }
                if ui.button("Rename").clicked() {
                    state.rename_model();
                }
                if ui.button("Delete").clicked() {
                    state.delete_model();
                }
            });
            ui.separator();

            ui.strong("Bulk import (one per line)");
            ui.add(
                egui::TextEdit::multiline(&mut state.taxonomy_form.bulk)
                    .desired_rows(6)
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Import as models").clicked() {
                    state.import_models();
                }
                if ui.button("Import as makes").clicked() {
                    state.import_makes();
                }
            });
        });
    state.taxonomy_form.open = open;
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_listings(&path);
    }
}

fn export_taxonomy_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export taxonomy")
        .set_file_name("taxonomy.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_taxonomy(&path) {
            Ok(()) => state.status_message = Some(format!("Taxonomy saved to {}", path.display())),
            Err(e) => {
                log::error!("Failed to export taxonomy: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
