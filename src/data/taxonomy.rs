use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::category::CategoryKey;

/// Built-in catalog shipped with the application.
const BUILTIN_TAXONOMY: &str = include_str!("../../assets/taxonomy.json");

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A taxonomy document that does not have the `Category -> Make -> [Model]`
/// shape. Raised once when a snapshot is loaded, never per lookup.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("taxonomy is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("taxonomy root must be an object of categories")]
    RootNotObject,

    #[error("unknown category {0:?}")]
    UnknownCategory(String),

    #[error("category {0:?} must map makes to model lists")]
    CategoryNotObject(String),

    #[error("{category}/{make}: model list must be an array")]
    ModelsNotArray { category: String, make: String },

    #[error("{category}/{make}: model #{index} is not a non-empty string")]
    InvalidModel {
        category: String,
        make: String,
        index: usize,
    },
}

/// A rejected administrative edit. The snapshot it was applied to is
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("make {0:?} already exists in this category")]
    MakeExists(String),

    #[error("make {0:?} not found")]
    MakeNotFound(String),

    #[error("model {0:?} already exists for this make")]
    ModelExists(String),

    #[error("model {0:?} not found")]
    ModelNotFound(String),
}

fn non_empty_name(name: &str) -> Result<&str, EditError> {
    let name = name.trim();
    if name.is_empty() {
        Err(EditError::EmptyName)
    } else {
        Ok(name)
    }
}

// ---------------------------------------------------------------------------
// Taxonomy – immutable Category -> Make -> [Model] snapshot
// ---------------------------------------------------------------------------

/// Nested vehicle catalog. Model lists keep their curated order; consumers
/// that need a stable sequence sort the de-duplicated union themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Taxonomy {
    categories: BTreeMap<CategoryKey, BTreeMap<String, Vec<String>>>,
}

impl Taxonomy {
    /// Parse the catalog compiled into the binary.
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_json(BUILTIN_TAXONOMY)
    }

    /// Load a taxonomy override from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading taxonomy {}", path.display()))?;
        let taxonomy = Self::from_json(&text)
            .with_context(|| format!("validating taxonomy {}", path.display()))?;
        Ok(taxonomy)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, TaxonomyError> {
        let root: JsonValue = serde_json::from_str(text)?;
        let root = root.as_object().ok_or(TaxonomyError::RootNotObject)?;

        let mut categories = BTreeMap::new();
        for (category_name, makes_value) in root {
            let key: CategoryKey = category_name
                .parse()
                .map_err(|_| TaxonomyError::UnknownCategory(category_name.clone()))?;
            let makes_obj = makes_value
                .as_object()
                .ok_or_else(|| TaxonomyError::CategoryNotObject(category_name.clone()))?;

            let mut makes = BTreeMap::new();
            for (make, models_value) in makes_obj {
                let entries =
                    models_value
                        .as_array()
                        .ok_or_else(|| TaxonomyError::ModelsNotArray {
                            category: category_name.clone(),
                            make: make.clone(),
                        })?;

                let models = entries
                    .iter()
                    .enumerate()
                    .map(|(index, v)| match v.as_str() {
                        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
                        _ => Err(TaxonomyError::InvalidModel {
                            category: category_name.clone(),
                            make: make.clone(),
                            index,
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                makes.insert(make.clone(), models);
            }
            categories.insert(key, makes);
        }

        Ok(Taxonomy { categories })
    }

    /// Categories present in the snapshot, in catalog order.
    pub fn categories(&self) -> impl Iterator<Item = CategoryKey> + '_ {
        self.categories.keys().copied()
    }

    /// Makes listed under a category (sorted). Unknown category → empty.
    pub fn makes(&self, category: CategoryKey) -> Vec<&str> {
        self.categories
            .get(&category)
            .map(|makes| makes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every make across all categories, de-duplicated and sorted.
    pub fn all_makes(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .categories
            .values()
            .flat_map(|makes| makes.keys().map(String::as_str))
            .collect();
        set.into_iter().collect()
    }

    /// The curated model list for one category/make pair. An absent pair
    /// yields an empty slice.
    pub fn models(&self, category: CategoryKey, make: &str) -> &[String] {
        self.categories
            .get(&category)
            .and_then(|makes| makes.get(make))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All `(make, models)` pairs of one category.
    pub fn makes_in(&self, category: CategoryKey) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.categories
            .get(&category)
            .into_iter()
            .flat_map(|makes| makes.iter().map(|(m, list)| (m.as_str(), list.as_slice())))
    }

    /// All model lists filed under `make`, across every category.
    pub fn lists_for_make<'a>(&'a self, make: &'a str) -> impl Iterator<Item = &'a [String]> + 'a {
        self.categories
            .values()
            .filter_map(move |makes| makes.get(make).map(Vec::as_slice))
    }

    /// Every model list in the snapshot.
    pub fn all_lists(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.categories
            .values()
            .flat_map(|makes| makes.values().map(Vec::as_slice))
    }

    /// Bulk-add models to a make, one per line.
    ///
    /// Lines are trimmed, blanks dropped and models already present for the
    /// make skipped. Returns a new snapshot and the number of models added;
    /// `self` is left untouched, and nothing is added when no line survives.
    pub fn with_imported_models(&self, category: CategoryKey, make: &str, lines: &str) -> (Taxonomy, usize) {
        let make = make.trim();
        if make.is_empty() {
            return (self.clone(), 0);
        }

        let existing = self.models(category, make);
        let mut fresh: Vec<&str> = Vec::new();
        for line in lines.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !existing.iter().any(|m| m == line) && !fresh.contains(&line) {
                fresh.push(line);
            }
        }
        if fresh.is_empty() {
            return (self.clone(), 0);
        }

        let mut next = self.clone();
        next.categories
            .entry(category)
            .or_default()
            .entry(make.to_string())
            .or_default()
            .extend(fresh.iter().map(|m| m.to_string()));

        let added = fresh.len();
        log::info!("Imported {added} models into {category}/{make}");
        (next, added)
    }

    /// Bulk-add makes to a category, one per line. Existing makes are
    /// skipped; new makes start with no models.
    pub fn with_imported_makes(&self, category: CategoryKey, lines: &str) -> (Taxonomy, usize) {
        let mut next = self.clone();
        let makes = next.categories.entry(category).or_default();
        let mut added = 0;
        for line in lines.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !makes.contains_key(line) {
                makes.insert(line.to_string(), Vec::new());
                added += 1;
            }
        }
        if added == 0 {
            return (self.clone(), 0);
        }
        log::info!("Imported {added} makes into {category}");
        (next, added)
    }

    // -- Single-entry edits; each returns a new snapshot --

    pub fn with_make_added(&self, category: CategoryKey, make: &str) -> Result<Taxonomy, EditError> {
        let make = non_empty_name(make)?;
        if self.has_make(category, make) {
            return Err(EditError::MakeExists(make.to_string()));
        }
        let mut next = self.clone();
        next.categories
            .entry(category)
            .or_default()
            .insert(make.to_string(), Vec::new());
        Ok(next)
    }

    /// Rename a make, keeping its models.
    pub fn with_make_renamed(&self, category: CategoryKey, make: &str, new_name: &str) -> Result<Taxonomy, EditError> {
        let new_name = non_empty_name(new_name)?;
        if !self.has_make(category, make) {
            return Err(EditError::MakeNotFound(make.to_string()));
        }
        if new_name == make {
            return Ok(self.clone());
        }
        if self.has_make(category, new_name) {
            return Err(EditError::MakeExists(new_name.to_string()));
        }
        let mut next = self.clone();
        let makes = next.categories.entry(category).or_default();
        let models = makes.remove(make).unwrap_or_default();
        makes.insert(new_name.to_string(), models);
        Ok(next)
    }

    /// Remove a make together with its models.
    pub fn without_make(&self, category: CategoryKey, make: &str) -> Result<Taxonomy, EditError> {
        let mut next = self.clone();
        next.categories
            .get_mut(&category)
            .and_then(|makes| makes.remove(make))
            .ok_or_else(|| EditError::MakeNotFound(make.to_string()))?;
        Ok(next)
    }

    /// Add one model; the make is created when missing.
    pub fn with_model_added(&self, category: CategoryKey, make: &str, model: &str) -> Result<Taxonomy, EditError> {
        let make = non_empty_name(make)?;
        let model = non_empty_name(model)?;
        if self.models(category, make).iter().any(|m| m == model) {
            return Err(EditError::ModelExists(model.to_string()));
        }
        let mut next = self.clone();
        next.categories
            .entry(category)
            .or_default()
            .entry(make.to_string())
            .or_default()
            .push(model.to_string());
        Ok(next)
    }

    /// Rename a model in place, keeping its position in the curated list.
    pub fn with_model_renamed(
        &self,
        category: CategoryKey,
        make: &str,
        model: &str,
        new_name: &str,
    ) -> Result<Taxonomy, EditError> {
        let new_name = non_empty_name(new_name)?;
        let models = self.models(category, make);
        let position = models
            .iter()
            .position(|m| m == model)
            .ok_or_else(|| EditError::ModelNotFound(model.to_string()))?;
        if new_name != model && models.iter().any(|m| m == new_name) {
            return Err(EditError::ModelExists(new_name.to_string()));
        }
        let mut next = self.clone();
        if let Some(list) = next.models_mut(category, make) {
            list[position] = new_name.to_string();
        }
        Ok(next)
    }

    pub fn without_model(&self, category: CategoryKey, make: &str, model: &str) -> Result<Taxonomy, EditError> {
        let mut next = self.clone();
        let list = next
            .models_mut(category, make)
            .ok_or_else(|| EditError::ModelNotFound(model.to_string()))?;
        let before = list.len();
        list.retain(|m| m != model);
        if list.len() == before {
            return Err(EditError::ModelNotFound(model.to_string()));
        }
        Ok(next)
    }

    fn has_make(&self, category: CategoryKey, make: &str) -> bool {
        self.categories
            .get(&category)
            .is_some_and(|makes| makes.contains_key(make))
    }

    fn models_mut(&mut self, category: CategoryKey, make: &str) -> Option<&mut Vec<String>> {
        self.categories.get_mut(&category)?.get_mut(make)
    }

    /// Serialise the snapshot in its load format.
    pub fn to_json_pretty(&self) -> Result<String, TaxonomyError> {
        Ok(serde_json::to_string_pretty(&self.categories)?)
    }

    /// Total number of model entries (duplicates across makes included).
    pub fn model_count(&self) -> usize {
        self.all_lists().map(<[String]>::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_well_formed() {
        let taxonomy = Taxonomy::builtin().expect("built-in taxonomy");
        assert_eq!(taxonomy.categories().count(), CategoryKey::ALL.len());
        assert!(taxonomy.models(CategoryKey::Cars, "Toyota").contains(&"Corolla".to_string()));
        assert!(taxonomy.model_count() > 1000);
        for list in taxonomy.all_lists() {
            assert!(list.iter().all(|m| !m.is_empty()));
        }
    }

    #[test]
    fn test_categories_enumerate_in_catalog_order() {
        let taxonomy = Taxonomy::from_json(r#"{"Vans": {}, "Cars": {}, "Pickups": {}}"#).unwrap();
        let keys: Vec<_> = taxonomy.categories().collect();
        assert_eq!(keys, vec![CategoryKey::Cars, CategoryKey::Vans, CategoryKey::Pickups]);
    }

    #[test]
    fn test_make_without_models_is_empty_list() {
        let taxonomy = Taxonomy::from_json(r#"{"Cars": {"Xiali": []}}"#).unwrap();
        assert!(taxonomy.models(CategoryKey::Cars, "Xiali").is_empty());
        assert!(taxonomy.models(CategoryKey::Cars, "Nobody").is_empty());
        assert!(taxonomy.models(CategoryKey::Vans, "Xiali").is_empty());
        assert_eq!(taxonomy.makes(CategoryKey::Cars), vec!["Xiali"]);
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(matches!(Taxonomy::from_json("[]"), Err(TaxonomyError::RootNotObject)));
        assert!(matches!(
            Taxonomy::from_json(r#"{"Cars": ["Toyota"]}"#),
            Err(TaxonomyError::CategoryNotObject(c)) if c == "Cars"
        ));
        assert!(matches!(
            Taxonomy::from_json(r#"{"Cars": {"Toyota": "Corolla"}}"#),
            Err(TaxonomyError::ModelsNotArray { .. })
        ));
        assert!(matches!(
            Taxonomy::from_json(r#"{"Cars": {"Toyota": ["Corolla", ""]}}"#),
            Err(TaxonomyError::InvalidModel { index: 1, .. })
        ));
        assert!(matches!(
            Taxonomy::from_json(r#"{"Cars": {"Toyota": [42]}}"#),
            Err(TaxonomyError::InvalidModel { index: 0, .. })
        ));
        assert!(matches!(
            Taxonomy::from_json(r#"{"Boats": {}}"#),
            Err(TaxonomyError::UnknownCategory(c)) if c == "Boats"
        ));
        assert!(matches!(Taxonomy::from_json("{"), Err(TaxonomyError::Json(_))));
    }

    #[test]
    fn test_bulk_import_returns_new_snapshot() {
        let original = Taxonomy::from_json(r#"{"Cars": {"Toyota": ["Corolla"]}}"#).unwrap();
        let (next, added) = original.with_imported_models(
            CategoryKey::Cars,
            " Toyota ",
            "Camry\n\n  Corolla \nYaris\r\nCamry\n",
        );

        assert_eq!(added, 2);
        assert_eq!(next.models(CategoryKey::Cars, "Toyota"), ["Corolla", "Camry", "Yaris"]);
        assert_eq!(original.models(CategoryKey::Cars, "Toyota"), ["Corolla"]);
    }

    #[test]
    fn test_bulk_import_creates_missing_branches() {
        let original = Taxonomy::default();
        let (next, added) = original.with_imported_models(CategoryKey::Taxis, "LEVC", "TX\nTX4");
        assert_eq!(added, 2);
        assert_eq!(next.makes(CategoryKey::Taxis), vec!["LEVC"]);

        let (unchanged, none) = next.with_imported_models(CategoryKey::Taxis, "  ", "TX5");
        assert_eq!(none, 0);
        assert_eq!(unchanged, next);
    }

    #[test]
    fn test_bulk_import_of_blank_lines_changes_nothing() {
        let original = Taxonomy::from_json(r#"{"Cars": {"Toyota": ["Corolla"]}}"#).unwrap();
        let (next, added) = original.with_imported_models(CategoryKey::Vans, "Nissan", "\n  \n");
        assert_eq!(added, 0);
        assert_eq!(next, original);
        assert!(next.makes(CategoryKey::Vans).is_empty());

        let (next, added) = original.with_imported_models(CategoryKey::Cars, "Toyota", "Corolla\n");
        assert_eq!(added, 0);
        assert_eq!(next, original);
    }

    #[test]
    fn test_bulk_import_skips_repeated_lines() {
        let (next, added) = Taxonomy::default().with_imported_models(CategoryKey::Cars, "Suzuki", "Alto\nAlto\nWagon R");
        assert_eq!(added, 2);
        assert_eq!(next.models(CategoryKey::Cars, "Suzuki"), ["Alto", "Wagon R"]);
    }

    #[test]
    fn test_bulk_import_makes() {
        let original = Taxonomy::from_json(r#"{"Vans": {"Toyota": ["HiAce"]}}"#).unwrap();
        let (next, added) = original.with_imported_makes(CategoryKey::Vans, "Nissan\n Toyota \n\nMazda");
        assert_eq!(added, 2);
        assert_eq!(next.makes(CategoryKey::Vans), vec!["Mazda", "Nissan", "Toyota"]);
        assert_eq!(next.models(CategoryKey::Vans, "Toyota"), ["HiAce"]);

        let (same, none) = original.with_imported_makes(CategoryKey::Vans, "Toyota\n");
        assert_eq!(none, 0);
        assert_eq!(same, original);
    }

    #[test]
    fn test_make_edits() {
        let original = Taxonomy::from_json(r#"{"Cars": {"Toyota": ["Corolla"], "Honda": ["Civic"]}}"#).unwrap();

        let added = original.with_make_added(CategoryKey::Cars, " Mazda ").unwrap();
        assert_eq!(added.makes(CategoryKey::Cars), vec!["Honda", "Mazda", "Toyota"]);
        assert_eq!(
            original.with_make_added(CategoryKey::Cars, "Honda"),
            Err(EditError::MakeExists("Honda".to_string()))
        );
        assert_eq!(original.with_make_added(CategoryKey::Cars, " "), Err(EditError::EmptyName));

        let renamed = original.with_make_renamed(CategoryKey::Cars, "Toyota", "TOYOTA").unwrap();
        assert_eq!(renamed.models(CategoryKey::Cars, "TOYOTA"), ["Corolla"]);
        assert!(renamed.models(CategoryKey::Cars, "Toyota").is_empty());
        assert_eq!(
            original.with_make_renamed(CategoryKey::Cars, "Toyota", ""),
            Err(EditError::EmptyName)
        );
        assert_eq!(
            original.with_make_renamed(CategoryKey::Cars, "Toyota", "Honda"),
            Err(EditError::MakeExists("Honda".to_string()))
        );
        assert_eq!(
            original.with_make_renamed(CategoryKey::Vans, "Toyota", "Lexus"),
            Err(EditError::MakeNotFound("Toyota".to_string()))
        );

        let removed = original.without_make(CategoryKey::Cars, "Honda").unwrap();
        assert_eq!(removed.makes(CategoryKey::Cars), vec!["Toyota"]);
        assert!(original.without_make(CategoryKey::Cars, "Lada").is_err());
        assert_eq!(original.makes(CategoryKey::Cars), vec!["Honda", "Toyota"]);
    }

    #[test]
    fn test_model_edits() {
        let original = Taxonomy::from_json(r#"{"Cars": {"Toyota": ["Corolla", "Camry", "Aqua"]}}"#).unwrap();

        let added = original.with_model_added(CategoryKey::Cars, "Toyota", " Yaris ").unwrap();
        assert_eq!(added.models(CategoryKey::Cars, "Toyota"), ["Corolla", "Camry", "Aqua", "Yaris"]);
        let new_make = original.with_model_added(CategoryKey::Taxis, "LEVC", "TX").unwrap();
        assert_eq!(new_make.models(CategoryKey::Taxis, "LEVC"), ["TX"]);
        assert_eq!(
            original.with_model_added(CategoryKey::Cars, "Toyota", "Camry"),
            Err(EditError::ModelExists("Camry".to_string()))
        );

        let renamed = original
            .with_model_renamed(CategoryKey::Cars, "Toyota", "Camry", "Camry Hybrid")
            .unwrap();
        assert_eq!(renamed.models(CategoryKey::Cars, "Toyota"), ["Corolla", "Camry Hybrid", "Aqua"]);
        assert_eq!(
            original.with_model_renamed(CategoryKey::Cars, "Toyota", "Camry", "  "),
            Err(EditError::EmptyName)
        );
        assert_eq!(
            original.with_model_renamed(CategoryKey::Cars, "Toyota", "Camry", "Aqua"),
            Err(EditError::ModelExists("Aqua".to_string()))
        );
        assert_eq!(
            original.with_model_renamed(CategoryKey::Cars, "Toyota", "Supra", "GR Supra"),
            Err(EditError::ModelNotFound("Supra".to_string()))
        );

        let removed = original.without_model(CategoryKey::Cars, "Toyota", "Corolla").unwrap();
        assert_eq!(removed.models(CategoryKey::Cars, "Toyota"), ["Camry", "Aqua"]);
        assert!(original.without_model(CategoryKey::Cars, "Toyota", "Supra").is_err());
        assert!(original.without_model(CategoryKey::Cars, "Honda", "Civic").is_err());
        assert_eq!(original.models(CategoryKey::Cars, "Toyota").len(), 3);
    }

    #[test]
    fn test_export_reloads_to_same_snapshot() {
        let taxonomy = Taxonomy::from_json(
            r#"{"Cars": {"Toyota": ["Corolla", "Camry"], "Honda": ["Civic"]}, "Three Wheel": {"Bajaj": ["RE"]}}"#,
        )
        .unwrap();
        let exported = taxonomy.to_json_pretty().unwrap();
        assert!(exported.contains("\"Three Wheel\""));
        assert_eq!(Taxonomy::from_json(&exported).unwrap(), taxonomy);
    }

    #[test]
    fn test_load_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxonomy.json");
        std::fs::write(&path, r#"{"Cars": 3}"#).unwrap();
        let err = Taxonomy::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("taxonomy.json"));
    }
}
