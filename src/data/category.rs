use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CategoryKey – the canonical taxonomy grouping
// ---------------------------------------------------------------------------

/// Canonical vehicle category.
///
/// Three vocabularies name the same concept: the taxonomy key (`"Pickups"`),
/// the URL slug (`"pickups"`) and the listing-form type label
/// (`"Pickup/Double Cab"`). All of them map into this type.
///
/// Variant order is catalog order, so `BTreeMap<CategoryKey, _>` enumerates
/// categories the way the marketplace lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryKey {
    #[serde(rename = "Cars")]
    Cars,
    #[serde(rename = "SUVs")]
    Suvs,
    #[serde(rename = "Vans")]
    Vans,
    #[serde(rename = "Motorbikes")]
    Motorbikes,
    #[serde(rename = "Lorries")]
    Lorries,
    #[serde(rename = "Three Wheel")]
    ThreeWheel,
    #[serde(rename = "Pickups")]
    Pickups,
    #[serde(rename = "Heavy-Duty")]
    HeavyDuty,
    #[serde(rename = "Military")]
    Military,
    #[serde(rename = "ATVs")]
    Atvs,
    #[serde(rename = "Side-by-Sides")]
    SideBySides,
    #[serde(rename = "Taxis")]
    Taxis,
    #[serde(rename = "Spare Parts")]
    SpareParts,
}

/// Labels offered by the listing form's "Type" selector, in display order.
pub const TYPE_LABELS: [&str; 10] = [
    "Car",
    "Van",
    "SUV/Jeep",
    "Three Wheel",
    "Pickup/Double Cab",
    "Crew Cab",
    "Lorry/Tipper",
    "Heavy-Duty",
    "Motorcycle",
    "Bus",
];

impl CategoryKey {
    pub const ALL: [CategoryKey; 13] = [
        CategoryKey::Cars,
        CategoryKey::Suvs,
        CategoryKey::Vans,
        CategoryKey::Motorbikes,
        CategoryKey::Lorries,
        CategoryKey::ThreeWheel,
        CategoryKey::Pickups,
        CategoryKey::HeavyDuty,
        CategoryKey::Military,
        CategoryKey::Atvs,
        CategoryKey::SideBySides,
        CategoryKey::Taxis,
        CategoryKey::SpareParts,
    ];

    /// Taxonomy key text, e.g. `"Three Wheel"`.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKey::Cars => "Cars",
            CategoryKey::Suvs => "SUVs",
            CategoryKey::Vans => "Vans",
            CategoryKey::Motorbikes => "Motorbikes",
            CategoryKey::Lorries => "Lorries",
            CategoryKey::ThreeWheel => "Three Wheel",
            CategoryKey::Pickups => "Pickups",
            CategoryKey::HeavyDuty => "Heavy-Duty",
            CategoryKey::Military => "Military",
            CategoryKey::Atvs => "ATVs",
            CategoryKey::SideBySides => "Side-by-Sides",
            CategoryKey::Taxis => "Taxis",
            CategoryKey::SpareParts => "Spare Parts",
        }
    }

    /// URL slug, e.g. `"three-wheel"`.
    pub fn slug(self) -> &'static str {
        match self {
            CategoryKey::Cars => "cars",
            CategoryKey::Suvs => "suvs",
            CategoryKey::Vans => "vans",
            CategoryKey::Motorbikes => "motorbikes",
            CategoryKey::Lorries => "lorries",
            CategoryKey::ThreeWheel => "three-wheel",
            CategoryKey::Pickups => "pickups",
            CategoryKey::HeavyDuty => "heavy-duty",
            CategoryKey::Military => "military",
            CategoryKey::Atvs => "atvs",
            CategoryKey::SideBySides => "side-by-sides",
            CategoryKey::Taxis => "taxis",
            CategoryKey::SpareParts => "spare-parts",
        }
    }

    /// Look up a URL slug. Case and surrounding whitespace are ignored.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|key| key.slug() == slug)
    }

    /// Collapse a listing-form type label onto its taxonomy category.
    pub fn from_type_label(label: &str) -> Option<Self> {
        match label {
            "Car" => Some(CategoryKey::Cars),
            "Van" | "Bus" => Some(CategoryKey::Vans),
            "SUV/Jeep" => Some(CategoryKey::Suvs),
            "Three Wheel" => Some(CategoryKey::ThreeWheel),
            "Pickup/Double Cab" | "Crew Cab" => Some(CategoryKey::Pickups),
            "Lorry/Tipper" => Some(CategoryKey::Lorries),
            "Heavy-Duty" => Some(CategoryKey::HeavyDuty),
            "Motorcycle" => Some(CategoryKey::Motorbikes),
            _ => None,
        }
    }

    /// Classify a stored listing type. Fixture rows carry form labels while
    /// database rows carry the taxonomy key, so both are accepted.
    pub fn from_listing_type(value: &str) -> Option<Self> {
        Self::from_type_label(value)
            .or_else(|| value.parse().ok())
            .or_else(|| Self::from_slug(value))
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category key: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for CategoryKey {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Normalise the category context of a page or form.
///
/// A URL slug wins over a type label when both are present. `None` means
/// "no category constraint", never an error.
pub fn resolve_category_key(slug: Option<&str>, type_label: Option<&str>) -> Option<CategoryKey> {
    let slug = slug.filter(|s| !s.is_empty());
    let type_label = type_label.filter(|s| !s.is_empty());
    match (slug, type_label) {
        (Some(slug), _) => CategoryKey::from_slug(slug),
        (None, Some(label)) => CategoryKey::from_type_label(label),
        (None, None) => None,
    }
}
