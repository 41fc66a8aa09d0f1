use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::ads::AdSettings;
use crate::color::ColorMap;
use crate::config::Config;
use crate::data::autocomplete::{filter_models, resolve_models};
use crate::data::category::{CategoryKey, TYPE_LABELS};
use crate::data::filter::{filtered_indices, in_category};
use crate::data::model::{Facet, Filter, Listing, ListingCollection};
use crate::data::taxonomy::{EditError, Taxonomy};

// ---------------------------------------------------------------------------
// Taxonomy administration form
// ---------------------------------------------------------------------------

/// Inputs of the taxonomy administration window.
#[derive(Debug, Clone)]
pub struct TaxonomyForm {
    pub open: bool,
    pub category: CategoryKey,
    pub make: String,
    pub model: String,
    /// Replacement name for rename actions.
    pub new_name: String,
    /// One entry per line for bulk imports.
    pub bulk: String,
}

impl Default for TaxonomyForm {
    fn default() -> Self {
        Self {
            open: false,
            category: CategoryKey::Cars,
            make: String::new(),
            model: String::new(),
            new_name: String::new(),
            bulk: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    /// Current taxonomy snapshot. Imports replace it wholesale.
    pub taxonomy: Taxonomy,

    /// Loaded listings (None until a file is opened).
    pub collection: Option<ListingCollection>,

    /// Filter being edited in the side panel.
    pub draft: Filter,

    /// Filter behind `visible_indices`; updated on "Search".
    pub applied: Filter,

    /// Category page the browser is scoped to, if any.
    pub scope: Option<CategoryKey>,

    /// Model names valid for the draft's category/make selection.
    pub candidates: Vec<String>,

    /// Autocomplete suggestions for the draft's model text.
    pub suggestions: Vec<String>,

    /// Indices of listings passing the applied filter (cached).
    pub visible_indices: Vec<usize>,

    /// Listing shown in the detail panel.
    pub selected: Option<usize>,

    /// Facet used for colouring the scatter plot.
    pub color_facet: Facet,
    pub color_map: Option<ColorMap>,

    pub ads: AdSettings,

    pub taxonomy_form: TaxonomyForm,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config, taxonomy: Taxonomy, ads: AdSettings) -> Self {
        let mut state = Self {
            config,
            taxonomy,
            collection: None,
            draft: Filter::default(),
            applied: Filter::default(),
            scope: None,
            candidates: Vec::new(),
            suggestions: Vec::new(),
            visible_indices: Vec::new(),
            selected: None,
            color_facet: Facet::Make,
            color_map: None,
            ads,
            taxonomy_form: TaxonomyForm::default(),
            status_message: None,
        };
        state.refresh_candidates();
        state
    }

    /// Ingest a newly loaded listing collection and show everything that
    /// passes the current filter.
    pub fn set_collection(&mut self, collection: ListingCollection) {
        self.collection = Some(collection);
        self.selected = None;
        self.rebuild_color_map();
        self.refilter();
        self.status_message = None;
    }

    /// Load a listing file, reporting failures through `status_message`.
    pub fn open_listings(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(collection) => {
                log::info!(
                    "Loaded {} listings from {}",
                    collection.len(),
                    path.display()
                );
                self.set_collection(collection);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    // -- Category / make / model selection --

    /// Category constraint for model resolution: the page scope, else the
    /// draft's type, which may be a form label or a stored category key.
    pub fn category_constraint(&self) -> Option<CategoryKey> {
        self.scope
            .or_else(|| CategoryKey::from_listing_type(&self.draft.listing_type))
    }

    /// Re-resolve candidate models and drop a model value that is no longer
    /// among them.
    fn refresh_candidates(&mut self) {
        self.candidates = resolve_models(
            &self.taxonomy,
            self.category_constraint(),
            Some(self.draft.make.as_str()),
        );
        if !self.draft.model.is_empty() && !self.candidates.contains(&self.draft.model) {
            self.draft.model.clear();
        }
        self.update_suggestions();
    }

    fn update_suggestions(&mut self) {
        self.suggestions = filter_models(
            &self.candidates,
            &self.draft.model,
            self.config.min_chars,
            self.config.suggestion_limit,
        );
    }

    pub fn set_scope(&mut self, scope: Option<CategoryKey>) {
        if self.scope == scope {
            return;
        }
        self.scope = scope;
        self.draft.listing_type.clear();
        self.applied.listing_type.clear();
        self.refresh_candidates();
        self.refilter();
    }

    pub fn set_make(&mut self, make: &str) {
        if self.draft.make != make {
            self.draft.make = make.to_string();
            self.refresh_candidates();
        }
    }

    pub fn set_type(&mut self, label: &str) {
        if self.draft.listing_type != label {
            self.draft.listing_type = label.to_string();
            self.refresh_candidates();
        }
    }

    /// The model text box changed.
    pub fn set_model_query(&mut self, query: &str) {
        self.draft.model = query.to_string();
        self.update_suggestions();
    }

    /// A suggestion was picked: fill the box and close the list.
    pub fn pick_suggestion(&mut self, model: &str) {
        self.draft.model = model.to_string();
        self.suggestions.clear();
    }

    /// Types offered by the type selector: the form labels, then any other
    /// type stored on loaded listings (e.g. category keys).
    pub fn type_options(&self) -> Vec<String> {
        let mut options: Vec<String> = TYPE_LABELS.iter().map(|l| l.to_string()).collect();
        if let Some(collection) = &self.collection {
            for value in collection.values(Facet::Type) {
                if !TYPE_LABELS.contains(&value) {
                    options.push(value.to_string());
                }
            }
        }
        options
    }

    /// Makes offered by the make selector for the current category.
    pub fn make_options(&self) -> Vec<String> {
        let mut makes: BTreeSet<String> = match self.category_constraint() {
            Some(category) => self.taxonomy.makes(category).into_iter().map(str::to_string).collect(),
            None => self.taxonomy.all_makes().into_iter().map(str::to_string).collect(),
        };
        if let Some(collection) = &self.collection {
            match self.category_constraint() {
                Some(key) => makes.extend(
                    collection
                        .listings
                        .iter()
                        .filter(|l| in_category(l, key))
                        .map(|l| l.make.clone()),
                ),
                None => makes.extend(collection.values(Facet::Make).map(str::to_string)),
            }
        }
        makes.into_iter().collect()
    }

    // -- Filtering --

    /// Apply the draft filter ("Search").
    pub fn search(&mut self) {
        self.applied = self.draft.clone();
        self.suggestions.clear();
        self.refilter();
    }

    /// Clear every constraint.
    pub fn reset_filters(&mut self) {
        self.draft = Filter::default();
        self.applied = Filter::default();
        self.refresh_candidates();
        self.refilter();
    }

    /// Recompute `visible_indices` after a filter or scope change.
    pub fn refilter(&mut self) {
        if let Some(collection) = &self.collection {
            self.visible_indices = filtered_indices(collection, &self.applied, self.scope);
            log::debug!(
                "{} of {} listings visible",
                self.visible_indices.len(),
                collection.len()
            );
        }
        if let Some(sel) = self.selected {
            if !self.visible_indices.contains(&sel) {
                self.selected = None;
            }
        }
    }

    pub fn visible_listings(&self) -> impl Iterator<Item = (usize, &Listing)> + '_ {
        let listings = self
            .collection
            .as_ref()
            .map(|c| c.listings.as_slice())
            .unwrap_or(&[]);
        self.visible_indices
            .iter()
            .filter_map(move |&i| listings.get(i).map(|l| (i, l)))
    }

    pub fn selected_listing(&self) -> Option<&Listing> {
        let idx = self.selected?;
        self.collection.as_ref()?.listings.get(idx)
    }

    // -- Colouring --

    pub fn set_color_facet(&mut self, facet: Facet) {
        self.color_facet = facet;
        self.rebuild_color_map();
    }

    fn rebuild_color_map(&mut self) {
        self.color_map = self.collection.as_ref().and_then(|c| {
            c.unique_values
                .get(&self.color_facet)
                .map(|vals| ColorMap::new(self.color_facet, vals))
        });
    }

    // -- Taxonomy administration --

    /// Swap in an edited snapshot, or report why the edit was rejected.
    fn commit_edit(&mut self, edit: Result<Taxonomy, EditError>, done: String) -> bool {
        match edit {
            Ok(next) => {
                log::info!("{done}");
                self.taxonomy = next;
                self.status_message = Some(done);
                self.refresh_candidates();
                true
            }
            Err(e) => {
                log::warn!("Taxonomy edit rejected: {e}");
                self.status_message = Some(format!("Error: {e}"));
                false
            }
        }
    }

    /// Bulk-import the models typed into the form, one per line.
    pub fn import_models(&mut self) -> usize {
        let form = &self.taxonomy_form;
        let (next, added) = self
            .taxonomy
            .with_imported_models(form.category, &form.make, &form.bulk);
        self.status_message = Some(format!(
            "Imported {added} models into {}/{}",
            form.category,
            form.make.trim()
        ));
        if added > 0 {
            self.taxonomy = next;
            self.taxonomy_form.bulk.clear();
            self.refresh_candidates();
        }
        added
    }

    /// Bulk-import the makes typed into the form, one per line.
    pub fn import_makes(&mut self) -> usize {
        let form = &self.taxonomy_form;
        let (next, added) = self.taxonomy.with_imported_makes(form.category, &form.bulk);
        self.status_message = Some(format!("Imported {added} makes into {}", form.category));
        if added > 0 {
            self.taxonomy = next;
            self.taxonomy_form.bulk.clear();
        }
        added
    }

    pub fn add_make(&mut self) -> bool {
        let form = &self.taxonomy_form;
        let edit = self.taxonomy.with_make_added(form.category, &form.make);
        let done = format!("Added make {}/{}", form.category, form.make.trim());
        self.commit_edit(edit, done)
    }

    pub fn rename_make(&mut self) -> bool {
        let form = &self.taxonomy_form;
        let edit = self
            .taxonomy
            .with_make_renamed(form.category, &form.make, &form.new_name);
        let done = format!("Renamed make {} to {}", form.make, form.new_name.trim());
        let renamed = self.commit_edit(edit, done);
        if renamed {
            let form = &mut self.taxonomy_form;
            form.make = std::mem::take(&mut form.new_name).trim().to_string();
        }
        renamed
    }

    pub fn delete_make(&mut self) -> bool {
        let form = &self.taxonomy_form;
        let edit = self.taxonomy.without_make(form.category, &form.make);
        let done = format!("Deleted make {}/{}", form.category, form.make);
        let deleted = self.commit_edit(edit, done);
        if deleted {
            self.taxonomy_form.make.clear();
            self.taxonomy_form.model.clear();
        }
        deleted
    }

    pub fn add_model(&mut self) -> bool {
        let form = &self.taxonomy_form;
        let edit = self
            .taxonomy
            .with_model_added(form.category, &form.make, &form.model);
        let done = format!("Added model {} {}", form.make.trim(), form.model.trim());
        self.commit_edit(edit, done)
    }

    pub fn rename_model(&mut self) -> bool {
        let form = &self.taxonomy_form;
        let edit = self.taxonomy.with_model_renamed(
            form.category,
            &form.make,
            &form.model,
            &form.new_name,
        );
        let done = format!("Renamed model {} to {}", form.model, form.new_name.trim());
        let renamed = self.commit_edit(edit, done);
        if renamed {
            let form = &mut self.taxonomy_form;
            form.model = std::mem::take(&mut form.new_name).trim().to_string();
        }
        renamed
    }

    pub fn delete_model(&mut self) -> bool {
        let form = &self.taxonomy_form;
        let edit = self
            .taxonomy
            .without_model(form.category, &form.make, &form.model);
        let done = format!("Deleted model {} {}", form.make, form.model);
        let deleted = self.commit_edit(edit, done);
        if deleted {
            self.taxonomy_form.model.clear();
        }
        deleted
    }

    pub fn export_taxonomy(&self, path: &Path) -> Result<()> {
        let json = self.taxonomy.to_json_pretty()?;
        std::fs::write(path, json)
            .with_context(|| format!("writing taxonomy {}", path.display()))?;
        log::info!("Exported taxonomy to {}", path.display());
        Ok(())
    }
}
