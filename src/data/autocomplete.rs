use std::collections::BTreeSet;

use super::category::CategoryKey;
use super::taxonomy::Taxonomy;

/// Minimum query length before suggestions are shown.
pub const DEFAULT_MIN_CHARS: usize = 2;
/// Maximum number of suggestions shown at once.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Model resolver
// ---------------------------------------------------------------------------

fn sorted_union<'a>(lists: impl Iterator<Item = &'a [String]>) -> Vec<String> {
    let set: BTreeSet<&str> = lists.flatten().map(String::as_str).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Candidate model names for the current category/make selection.
///
/// The result is always de-duplicated and sorted ascending (byte-wise), and
/// narrows as constraints are added:
///
/// | category | make | candidates |
/// |---|---|---|
/// | yes | yes | that make's list in that category |
/// | yes | no  | every make in the category |
/// | no  | yes | the make across every category |
/// | no  | no  | the whole taxonomy |
///
/// An empty `make` counts as absent. Combinations missing from the
/// taxonomy yield an empty list.
pub fn resolve_models(taxonomy: &Taxonomy, category: Option<CategoryKey>, make: Option<&str>) -> Vec<String> {
    let make = make.filter(|m| !m.is_empty());
    match (category, make) {
        (Some(category), Some(make)) => {
            sorted_union(std::iter::once(taxonomy.models(category, make)))
        }
        (Some(category), None) => sorted_union(taxonomy.makes_in(category).map(|(_, models)| models)),
        (None, Some(make)) => sorted_union(taxonomy.lists_for_make(make)),
        (None, None) => sorted_union(taxonomy.all_lists()),
    }
}

// ---------------------------------------------------------------------------
// Autocomplete matcher
// ---------------------------------------------------------------------------

/// Suggestions for a partially typed model name.
///
/// Returns nothing until `query` has at least `min_chars` characters. After
/// that, every candidate containing the query (case-insensitive, anywhere in
/// the name) is returned in candidate order, capped at `limit`.
pub fn filter_models<S: AsRef<str>>(candidates: &[S], query: &str, min_chars: usize, limit: usize) -> Vec<String> {
    if query.chars().count() < min_chars {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|model| model.to_lowercase().contains(&needle))
        .take(limit)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Taxonomy {
        Taxonomy::from_json(
            r#"{
                "Cars": {"Toyota": ["Corolla", "Camry", "Prius"], "Honda": ["Civic", "Fit"]},
                "SUVs": {"Toyota": ["Prado", "Corolla Cross"], "Honda": ["Vezel", "CR-V"]},
                "Vans": {"Toyota": ["HiAce", "Prius"]}
            }"#,
        )
        .unwrap()
    }

    fn is_subset(a: &[String], b: &[String]) -> bool {
        a.iter().all(|m| b.contains(m))
    }

    #[test]
    fn test_end_to_end_scenario() {
        let taxonomy =
            Taxonomy::from_json(r#"{"Cars": {"Toyota": ["Corolla", "Camry"], "Honda": ["Civic"]}}"#).unwrap();
        let candidates = resolve_models(&taxonomy, Some(CategoryKey::Cars), Some("Toyota"));
        assert_eq!(candidates, ["Camry", "Corolla"]);
        assert_eq!(filter_models(&candidates, "cor", 2, 50), ["Corolla"]);
    }

    #[test]
    fn test_resolution_priorities() {
        let taxonomy = small();
        assert_eq!(
            resolve_models(&taxonomy, Some(CategoryKey::Cars), None),
            ["Camry", "Civic", "Corolla", "Fit", "Prius"]
        );
        assert_eq!(
            resolve_models(&taxonomy, None, Some("Toyota")),
            ["Camry", "Corolla", "Corolla Cross", "HiAce", "Prado", "Prius"]
        );
        assert_eq!(resolve_models(&taxonomy, None, None).len(), 10);
        assert_eq!(resolve_models(&taxonomy, None, Some("")), resolve_models(&taxonomy, None, None));
    }

    #[test]
    fn test_missing_branches_are_empty() {
        let taxonomy = small();
        assert!(resolve_models(&taxonomy, Some(CategoryKey::Vans), Some("Honda")).is_empty());
        assert!(resolve_models(&taxonomy, Some(CategoryKey::Taxis), None).is_empty());
        assert!(resolve_models(&taxonomy, None, Some("Lada")).is_empty());
    }

    #[test]
    fn test_candidates_narrow_as_constraints_are_added() {
        let taxonomy = Taxonomy::builtin().unwrap();
        let everything = resolve_models(&taxonomy, None, None);
        for category in CategoryKey::ALL {
            let in_category = resolve_models(&taxonomy, Some(category), None);
            assert!(is_subset(&in_category, &everything), "{category}");
            for make in taxonomy.makes(category) {
                let narrow = resolve_models(&taxonomy, Some(category), Some(make));
                assert!(is_subset(&narrow, &in_category), "{category}/{make}");
                assert!(is_subset(&narrow, &resolve_models(&taxonomy, None, Some(make))));
            }
        }
    }

    #[test]
    fn test_output_is_sorted_unique_and_stable() {
        let taxonomy = Taxonomy::builtin().unwrap();
        let first = resolve_models(&taxonomy, None, None);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(first, resolve_models(&taxonomy, None, None));

        let prius = resolve_models(&small(), None, Some("Toyota"));
        assert_eq!(prius.iter().filter(|m| *m == "Prius").count(), 1);
    }

    #[test]
    fn test_short_queries_are_gated() {
        let candidates = ["Corolla", "Civic"];
        assert!(filter_models(&candidates, "", 2, 50).is_empty());
        assert!(filter_models(&candidates, "c", 2, 50).is_empty());
        assert_eq!(filter_models(&candidates, "ci", 2, 50), ["Civic"]);
        // Counted in characters, not bytes.
        assert!(filter_models(&["Mégane"], "é", 2, 50).is_empty());
        assert_eq!(filter_models(&["Mégane E-Tech"], "MÉG", 2, 50), ["Mégane E-Tech"]);
    }

    #[test]
    fn test_substring_matching_keeps_candidate_order() {
        let candidates = ["Corolla", "Corolla Cross", "Camry"];
        assert_eq!(filter_models(&candidates, "corol", 2, 50), ["Corolla", "Corolla Cross"]);
        assert_eq!(filter_models(&candidates, "ross", 2, 50), ["Corolla Cross"]);
        assert!(filter_models(&candidates, "crl", 2, 50).is_empty());
    }

    #[test]
    fn test_limit_truncates() {
        let candidates: Vec<String> = (0..80).map(|i| format!("Model {i}")).collect();
        let result = filter_models(&candidates, "model", 2, 50);
        assert_eq!(result.len(), 50);
        assert_eq!(result[0], "Model 0");
        assert!(filter_models(&candidates, "model", 2, 0).is_empty());
    }
}
