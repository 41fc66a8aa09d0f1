use std::path::PathBuf;
use std::str::FromStr;

use crate::data::autocomplete::{DEFAULT_MIN_CHARS, DEFAULT_SUGGESTION_LIMIT};

/// Startup configuration, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Listing file opened at startup.
    pub listings_path: Option<PathBuf>,
    /// Taxonomy JSON replacing the built-in catalog.
    pub taxonomy_path: Option<PathBuf>,
    /// Ad settings JSON.
    pub ads_path: Option<PathBuf>,
    /// Category page slug the browser opens scoped to (e.g. `suvs`).
    pub category: Option<String>,
    pub min_chars: usize,
    pub suggestion_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listings_path: None,
            taxonomy_path: None,
            ads_path: None,
            category: None,
            min_chars: DEFAULT_MIN_CHARS,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        Self {
            listings_path: path("RUSTY_WHEELS_LISTINGS"),
            taxonomy_path: path("RUSTY_WHEELS_TAXONOMY"),
            ads_path: path("RUSTY_WHEELS_ADS"),
            category: lookup("RUSTY_WHEELS_CATEGORY").filter(|v| !v.trim().is_empty()),
            min_chars: parse_or("RUSTY_WHEELS_MIN_CHARS", lookup("RUSTY_WHEELS_MIN_CHARS"), DEFAULT_MIN_CHARS),
            suggestion_limit: parse_or(
                "RUSTY_WHEELS_SUGGESTION_LIMIT",
                lookup("RUSTY_WHEELS_SUGGESTION_LIMIT"),
                DEFAULT_SUGGESTION_LIMIT,
            ),
        }
    }
}

fn parse_or<T: FromStr + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            log::warn!("Invalid {key} value {raw:?} ({e}), using default: {default}");
            default
        }),
    }
}
