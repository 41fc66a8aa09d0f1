use super::category::CategoryKey;
use super::model::{find_price_range, Filter, Listing, ListingCollection};

// ---------------------------------------------------------------------------
// Listing predicate: AND of every active filter field
// ---------------------------------------------------------------------------

/// Whether `field` is a constraint and `value` fails it.
fn rejects_exact(field: &str, value: &str) -> bool {
    !field.is_empty() && field != value
}

impl Filter {
    /// Evaluate one listing against every active field.
    ///
    /// * empty string fields never constrain
    /// * `model` is a case-insensitive substring match, `make` a
    ///   case-insensitive exact match, everything else exact
    /// * an unknown `price_range` label applies no price constraint
    /// * `year_min..=year_max` always applies, so an inverted range matches
    ///   nothing
    pub fn matches(&self, listing: &Listing) -> bool {
        if !self.model.is_empty()
            && !listing
                .model
                .to_lowercase()
                .contains(&self.model.to_lowercase())
        {
            return false;
        }
        if !self.make.is_empty() && self.make.to_lowercase() != listing.make.to_lowercase() {
            return false;
        }
        if rejects_exact(&self.listing_type, &listing.listing_type)
            || rejects_exact(&self.condition, &listing.condition)
            || rejects_exact(&self.district, &listing.district)
            || rejects_exact(&self.transmission, &listing.transmission)
            || rejects_exact(&self.fuel_type, &listing.fuel_type)
        {
            return false;
        }
        if !self.price_range.is_empty() {
            match find_price_range(&self.price_range) {
                Some(range) if !range.contains(listing.price) => return false,
                Some(_) => {}
                None => log::debug!("unknown price range {:?}, not constraining", self.price_range),
            }
        }
        self.year_min <= listing.year && listing.year <= self.year_max
    }

    /// Copy of this filter for a page already scoped to one category:
    /// the `type` field is dropped.
    pub fn without_type(&self) -> Filter {
        Filter {
            listing_type: String::new(),
            ..self.clone()
        }
    }
}

/// Order-preserving subset of `listings` that pass `filter`.
pub fn apply_filters<'a>(listings: &'a [Listing], filter: &Filter) -> Vec<&'a Listing> {
    listings.iter().filter(|l| filter.matches(l)).collect()
}

/// Whether a listing belongs to a category page.
pub fn in_category(listing: &Listing, category: CategoryKey) -> bool {
    CategoryKey::from_listing_type(&listing.listing_type) == Some(category)
}

/// Return indices of listings that pass the filter, optionally scoped to a
/// category. With a scope the filter's `type` field is ignored.
pub fn filtered_indices(
    collection: &ListingCollection,
    filter: &Filter,
    scope: Option<CategoryKey>,
) -> Vec<usize> {
    let scoped_filter;
    let filter = match scope {
        Some(_) => {
            scoped_filter = filter.without_type();
            &scoped_filter
        }
        None => filter,
    };

    collection
        .listings
        .iter()
        .enumerate()
        .filter(|(_, listing)| scope.map_or(true, |key| in_category(listing, key)))
        .filter(|(_, listing)| filter.matches(listing))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::listing;
    use crate::data::model::{MAX_YEAR, MIN_YEAR};

    fn sample() -> Vec<Listing> {
        let mut hilux = listing("3", "Toyota", "Hilux", "Pickup/Double Cab", 9_000_000.0, 2018);
        hilux.transmission = "Manual".to_string();
        hilux.fuel_type = "Diesel".to_string();
        hilux.district = "Kandy".to_string();

        let mut aqua = listing("4", "Toyota", "Aqua", "Car", 5_000_000.0, 2015);
        aqua.fuel_type = "Hybrid".to_string();
        aqua.condition = "Reconditioned".to_string();

        vec![
            listing("1", "Toyota", "Corolla", "Car", 4_500_000.0, 2010),
            listing("2", "Toyota", "Corolla Cross", "SUV/Jeep", 12_000_000.0, 2021),
            hilux,
            aqua,
            listing("5", "Honda", "Civic", "Car", 2_500_000.0, 2005),
        ]
    }

    fn ids(listings: &[&Listing]) -> Vec<String> {
        listings.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn test_default_filter_is_identity() {
        let listings = sample();
        let result = apply_filters(&listings, &Filter::default());
        assert_eq!(result.len(), listings.len());
        assert!(result.iter().zip(&listings).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_model_substring_is_case_insensitive() {
        let listings = sample();
        let filter = Filter {
            model: "COROL".to_string(),
            ..Filter::default()
        };
        assert_eq!(ids(&apply_filters(&listings, &filter)), ["1", "2"]);
    }

    #[test]
    fn test_make_is_case_insensitive_exact() {
        let listings = sample();
        let filter = Filter {
            make: "honda".to_string(),
            ..Filter::default()
        };
        assert_eq!(ids(&apply_filters(&listings, &filter)), ["5"]);

        let partial = Filter {
            make: "Toy".to_string(),
            ..Filter::default()
        };
        assert!(apply_filters(&listings, &partial).is_empty());
    }

    #[test]
    fn test_fields_combine_with_and() {
        let listings = sample();
        let filter = Filter {
            make: "Toyota".to_string(),
            listing_type: "Car".to_string(),
            fuel_type: "Hybrid".to_string(),
            ..Filter::default()
        };
        assert_eq!(ids(&apply_filters(&listings, &filter)), ["4"]);

        let filter = Filter {
            transmission: "Manual".to_string(),
            district: "Kandy".to_string(),
            ..Filter::default()
        };
        assert_eq!(ids(&apply_filters(&listings, &filter)), ["3"]);

        let filter = Filter {
            condition: "Reconditioned".to_string(),
            district: "Kandy".to_string(),
            ..Filter::default()
        };
        assert!(apply_filters(&listings, &filter).is_empty());
    }

    #[test]
    fn test_price_range_boundaries_are_inclusive() {
        let listings = vec![
            listing("lo", "Toyota", "Vitz", "Car", 2_500_000.0, 2016),
            listing("mid", "Toyota", "Vitz", "Car", 3_000_000.0, 2016),
            listing("hi", "Toyota", "Vitz", "Car", 5_000_000.0, 2016),
            listing("out", "Toyota", "Vitz", "Car", 5_000_001.0, 2016),
        ];
        let filter = Filter {
            price_range: "Rs. 2.5M - 5M".to_string(),
            ..Filter::default()
        };
        assert_eq!(ids(&apply_filters(&listings, &filter)), ["lo", "mid", "hi"]);
    }

    #[test]
    fn test_unknown_price_label_applies_no_constraint() {
        let listings = sample();
        let filter = Filter {
            price_range: "NoSuchLabel".to_string(),
            ..Filter::default()
        };
        assert_eq!(apply_filters(&listings, &filter).len(), listings.len());
    }

    #[test]
    fn test_year_range() {
        let listings = sample();
        let filter = Filter {
            year_min: 2010,
            year_max: 2015,
            ..Filter::default()
        };
        assert_eq!(ids(&apply_filters(&listings, &filter)), ["1", "4"]);

        let inverted = Filter {
            year_min: MAX_YEAR,
            year_max: MIN_YEAR,
            ..Filter::default()
        };
        assert!(apply_filters(&listings, &inverted).is_empty());
    }

    #[test]
    fn test_scoped_indices_ignore_type_field() {
        let collection = ListingCollection::from_listings(sample());
        let filter = Filter {
            listing_type: "SUV/Jeep".to_string(),
            make: "Toyota".to_string(),
            ..Filter::default()
        };

        assert_eq!(filtered_indices(&collection, &filter, None), vec![1]);
        assert_eq!(
            filtered_indices(&collection, &filter, Some(CategoryKey::Cars)),
            vec![0, 3]
        );
        assert_eq!(
            filtered_indices(&collection, &Filter::default(), Some(CategoryKey::Pickups)),
            vec![2]
        );
        assert!(filtered_indices(&collection, &Filter::default(), Some(CategoryKey::Taxis)).is_empty());
    }

    #[test]
    fn test_category_membership_accepts_keys() {
        let db_row = listing("9", "Bajaj", "RE", "Three Wheel", 1_200_000.0, 2019);
        assert!(in_category(&db_row, CategoryKey::ThreeWheel));
        let keyed = listing("10", "Toyota", "Prado", "SUVs", 20_000_000.0, 2019);
        assert!(in_category(&keyed, CategoryKey::Suvs));
        assert!(!in_category(&keyed, CategoryKey::Cars));
    }
}
