use anyhow::{Context, Result};
use eframe::egui;

use rusty_wheels::ads::AdSettings;
use rusty_wheels::app::RustyWheelsApp;
use rusty_wheels::config::Config;
use rusty_wheels::data::category::resolve_category_key;
use rusty_wheels::data::taxonomy::Taxonomy;
use rusty_wheels::state::AppState;

/// Build the initial state from configuration. A broken taxonomy override
/// falls back to the built-in catalog; a broken built-in catalog is fatal.
fn initial_state(config: Config) -> Result<AppState> {
    let mut notices = Vec::new();

    let taxonomy = match &config.taxonomy_path {
        Some(path) => Taxonomy::load(path).or_else(|e| {
            log::error!("Failed to load taxonomy override: {e:#}");
            notices.push(format!("Error: {e:#}"));
            Taxonomy::builtin().context("parsing built-in taxonomy")
        })?,
        None => Taxonomy::builtin().context("parsing built-in taxonomy")?,
    };
    log::info!(
        "Taxonomy ready: {} categories, {} models",
        taxonomy.categories().count(),
        taxonomy.model_count()
    );

    let ads = match &config.ads_path {
        Some(path) => AdSettings::load(path).unwrap_or_else(|e| {
            log::warn!("Ignoring ad settings: {e:#}");
            AdSettings::default()
        }),
        None => AdSettings::default(),
    };

    let listings_path = config.listings_path.clone();
    let scope = resolve_category_key(config.category.as_deref(), None);
    if scope.is_none() {
        if let Some(slug) = &config.category {
            log::warn!("Unknown category {slug:?}, showing all categories");
        }
    }
    let mut state = AppState::new(config, taxonomy, ads);
    state.set_scope(scope);
    if let Some(path) = listings_path {
        state.open_listings(&path);
    }
    if state.status_message.is_none() {
        state.status_message = notices.pop();
    }
    Ok(state)
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load();
    log::debug!("{config:?}");
    let state = initial_state(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Wheels – Vehicle Listings",
        options,
        Box::new(|cc| {
            // Install image loaders so listing photos can be shown.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(RustyWheelsApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}
