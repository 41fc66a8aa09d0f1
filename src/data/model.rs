use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fixed vocabularies
// ---------------------------------------------------------------------------

/// Oldest model year a filter can express.
pub const MIN_YEAR: i32 = 1950;
/// Newest model year a filter can express.
pub const MAX_YEAR: i32 = 2030;

pub const CONDITIONS: [&str; 3] = ["Brand New", "Used", "Reconditioned"];
pub const TRANSMISSIONS: [&str; 2] = ["Automatic", "Manual"];
pub const FUEL_TYPES: [&str; 4] = ["Petrol", "Diesel", "Hybrid", "Electric"];

pub const DISTRICTS: [&str; 25] = [
    "Ampara",
    "Anuradhapura",
    "Badulla",
    "Batticaloa",
    "Colombo",
    "Galle",
    "Gampaha",
    "Hambantota",
    "Jaffna",
    "Kalutara",
    "Kandy",
    "Kegalle",
    "Kilinochchi",
    "Kurunegala",
    "Mannar",
    "Matale",
    "Matara",
    "Monaragala",
    "Mullaitivu",
    "Nuwara Eliya",
    "Polonnaruwa",
    "Puttalam",
    "Ratnapura",
    "Trincomalee",
    "Vavuniya",
];

// ---------------------------------------------------------------------------
// PriceRange – fixed price bucket catalog
// ---------------------------------------------------------------------------

/// A labelled, inclusive price bucket in rupees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Inclusive on both ends.
    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }
}

pub const PRICE_RANGES: [PriceRange; 6] = [
    PriceRange { label: "Under Rs. 1M", min: 0.0, max: 1_000_000.0 },
    PriceRange { label: "Rs. 1M - 2.5M", min: 1_000_000.0, max: 2_500_000.0 },
    PriceRange { label: "Rs. 2.5M - 5M", min: 2_500_000.0, max: 5_000_000.0 },
    PriceRange { label: "Rs. 5M - 10M", min: 5_000_000.0, max: 10_000_000.0 },
    PriceRange { label: "Rs. 10M - 20M", min: 10_000_000.0, max: 20_000_000.0 },
    PriceRange { label: "Above Rs. 20M", min: 20_000_000.0, max: f64::MAX },
];

/// Exact label lookup. `None` for anything not in the catalog.
pub fn find_price_range(label: &str) -> Option<&'static PriceRange> {
    PRICE_RANGES.iter().find(|r| r.label == label)
}

/// Card-style price text: `Rs. 1.25M` or `Rs. 850k`.
pub fn format_price(price: f64) -> String {
    if price >= 1_000_000.0 {
        format!("Rs. {:.2}M", price / 1_000_000.0)
    } else {
        format!("Rs. {:.0}k", price / 1_000.0)
    }
}

/// Split a `"City, District"` location. Without a comma the whole string is
/// used for both parts.
pub fn split_location(location: &str) -> (String, String) {
    let location = location.trim();
    match location.split_once(',') {
        Some((city, district)) if !district.trim().is_empty() => {
            (city.trim().to_string(), district.trim().to_string())
        }
        Some((city, _)) => (city.trim().to_string(), city.trim().to_string()),
        None => (location.to_string(), location.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Listing – one vehicle advertisement
// ---------------------------------------------------------------------------

/// A vehicle listing as materialised by the data layer. Read-only input to
/// the filter core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub make: String,
    pub model: String,
    /// Form type label (`"SUV/Jeep"`) or taxonomy key (`"SUVs"`).
    #[serde(rename = "type", alias = "category")]
    pub listing_type: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub transmission: String,
    #[serde(default, alias = "fuel_type")]
    pub fuel_type: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city: String,
    pub price: f64,
    pub year: i32,
    /// Odometer reading in km.
    #[serde(default)]
    pub mileage: u64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, alias = "seller_name")]
    pub seller_name: String,
    #[serde(default, alias = "created_at")]
    pub posted_date: String,
}

impl Listing {
    /// Display title, falling back to `"year make model"`.
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            format!("{} {} {}", self.year, self.make, self.model)
        } else {
            self.title.clone()
        }
    }

    pub fn facet(&self, facet: Facet) -> &str {
        match facet {
            Facet::Make => &self.make,
            Facet::Type => &self.listing_type,
            Facet::Condition => &self.condition,
            Facet::Transmission => &self.transmission,
            Facet::FuelType => &self.fuel_type,
            Facet::District => &self.district,
        }
    }
}

// ---------------------------------------------------------------------------
// Facet – categorical listing attributes
// ---------------------------------------------------------------------------

/// Categorical listing columns used for filter widgets and colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facet {
    Make,
    Type,
    Condition,
    Transmission,
    FuelType,
    District,
}

impl Facet {
    pub const ALL: [Facet; 6] = [
        Facet::Make,
        Facet::Type,
        Facet::Condition,
        Facet::Transmission,
        Facet::FuelType,
        Facet::District,
    ];
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Facet::Make => "Make",
            Facet::Type => "Type",
            Facet::Condition => "Condition",
            Facet::Transmission => "Transmission",
            Facet::FuelType => "Fuel type",
            Facet::District => "District",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Filter – composite user constraints
// ---------------------------------------------------------------------------

/// The filter form. An empty string means "no constraint on this field";
/// the year bounds always participate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub model: String,
    pub make: String,
    pub listing_type: String,
    pub condition: String,
    pub price_range: String,
    pub district: String,
    pub year_min: i32,
    pub year_max: i32,
    pub transmission: String,
    pub fuel_type: String,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            model: String::new(),
            make: String::new(),
            listing_type: String::new(),
            condition: String::new(),
            price_range: String::new(),
            district: String::new(),
            year_min: MIN_YEAR,
            year_max: MAX_YEAR,
            transmission: String::new(),
            fuel_type: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ListingCollection – the loaded listing set
// ---------------------------------------------------------------------------

/// All loaded listings with pre-computed facet values.
#[derive(Debug, Clone, Default)]
pub struct ListingCollection {
    pub listings: Vec<Listing>,
    /// For each facet the sorted set of non-empty values.
    pub unique_values: BTreeMap<Facet, BTreeSet<String>>,
}

impl ListingCollection {
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut unique_values: BTreeMap<Facet, BTreeSet<String>> = BTreeMap::new();
        for listing in &listings {
            for facet in Facet::ALL {
                let value = listing.facet(facet);
                if !value.is_empty() {
                    unique_values
                        .entry(facet)
                        .or_default()
                        .insert(value.to_string());
                }
            }
        }
        ListingCollection {
            listings,
            unique_values,
        }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn values(&self, facet: Facet) -> impl Iterator<Item = &str> + '_ {
        self.unique_values
            .get(&facet)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Listing;

    pub fn listing(id: &str, make: &str, model: &str, listing_type: &str, price: f64, year: i32) -> Listing {
        Listing {
            id: id.to_string(),
            title: String::new(),
            make: make.to_string(),
            model: model.to_string(),
            listing_type: listing_type.to_string(),
            condition: "Used".to_string(),
            transmission: "Automatic".to_string(),
            fuel_type: "Petrol".to_string(),
            district: "Colombo".to_string(),
            city: "Nugegoda".to_string(),
            price,
            year,
            mileage: 50_000,
            images: Vec::new(),
            seller_name: String::new(),
            posted_date: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::listing;
    use super::*;

    #[test]
    fn test_price_range_lookup_is_exact() {
        let range = find_price_range("Rs. 2.5M - 5M").expect("catalog label");
        assert_eq!(range.min, 2_500_000.0);
        assert!(find_price_range("rs. 2.5m - 5m").is_none());
        assert!(find_price_range("NoSuchLabel").is_none());
        assert!(find_price_range("").is_none());
    }

    #[test]
    fn test_price_range_bounds_are_inclusive() {
        let range = find_price_range("Rs. 1M - 2.5M").unwrap();
        assert!(range.contains(1_000_000.0));
        assert!(range.contains(2_500_000.0));
        assert!(!range.contains(999_999.0));
        assert!(!range.contains(2_500_001.0));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1_250_000.0), "Rs. 1.25M");
        assert_eq!(format_price(850_000.0), "Rs. 850k");
        assert_eq!(format_price(1_000_000.0), "Rs. 1.00M");
    }

    #[test]
    fn test_split_location() {
        assert_eq!(
            split_location("Nugegoda, Colombo"),
            ("Nugegoda".to_string(), "Colombo".to_string())
        );
        assert_eq!(split_location("Kandy"), ("Kandy".to_string(), "Kandy".to_string()));
        assert_eq!(split_location("Galle, "), ("Galle".to_string(), "Galle".to_string()));
    }

    #[test]
    fn test_listing_accepts_database_field_names() {
        let json = r#"{
            "id": "a1", "make": "Toyota", "model": "Aqua", "category": "Cars",
            "fuel_type": "Hybrid", "price": 6500000, "year": 2015,
            "created_at": "2025-01-02"
        }"#;
        let parsed: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.listing_type, "Cars");
        assert_eq!(parsed.fuel_type, "Hybrid");
        assert_eq!(parsed.posted_date, "2025-01-02");
        assert_eq!(parsed.display_title(), "2015 Toyota Aqua");
    }

    #[test]
    fn test_collection_indexes_facets() {
        let mut van = listing("2", "Nissan", "Caravan", "Van", 4_000_000.0, 2012);
        van.district = String::new();
        let collection = ListingCollection::from_listings(vec![
            listing("1", "Toyota", "Axio", "Car", 5_000_000.0, 2014),
            van,
            listing("3", "Toyota", "Hilux", "Pickup/Double Cab", 9_000_000.0, 2018),
        ]);

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.values(Facet::Make).collect::<Vec<_>>(), ["Nissan", "Toyota"]);
        assert_eq!(collection.values(Facet::District).collect::<Vec<_>>(), ["Colombo"]);
        assert_eq!(
            collection.values(Facet::Type).collect::<Vec<_>>(),
            ["Car", "Pickup/Double Cab", "Van"]
        );
    }

    #[test]
    fn test_default_filter_spans_supported_years() {
        let filter = Filter::default();
        assert_eq!((filter.year_min, filter.year_max), (MIN_YEAR, MAX_YEAR));
        assert!(filter.model.is_empty() && filter.price_range.is_empty());
    }
}
