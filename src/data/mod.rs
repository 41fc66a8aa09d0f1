/// Data layer: core types, loading, taxonomy resolution and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv          assets/taxonomy.json
///        │                                 │
///        ▼                                 ▼
///   ┌──────────┐                    ┌────────────┐
///   │  loader   │ → ListingCollection│  taxonomy   │  Category → Make → [Model]
///   └──────────┘                    └────────────┘
///        │                                 │
///        │          ┌──────────┐           ▼
///        │          │ category  │ → ┌──────────────┐
///        │          └──────────┘   │ autocomplete  │  candidates → suggestions
///        ▼                         └──────────────┘
///   ┌──────────┐
///   │  filter   │  apply Filter predicates → visible listings
///   └──────────┘
/// ```

pub mod autocomplete;
pub mod category;
pub mod filter;
pub mod loader;
pub mod model;
pub mod taxonomy;
