use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ad settings
// ---------------------------------------------------------------------------

/// Fixed ad slots on the listing detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    AfterImage,
    AfterDetails,
    AboveFooter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailPageAdCodes {
    pub after_image: String,
    pub after_details: String,
    pub above_footer: String,
}

/// Ad codes configured by the back office. Codes are opaque markup; nothing
/// here parses them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdSettings {
    /// Page-head markup. Not rendered by the desktop viewer; kept so a
    /// settings file round-trips unchanged.
    pub meta_tags: String,
    pub leaderboard_ad_code: String,
    pub inline_ad_codes: Vec<String>,
    pub detail_page_ad_codes: DetailPageAdCodes,
}

fn non_blank(code: &str) -> Option<&str> {
    if code.trim().is_empty() {
        None
    } else {
        Some(code)
    }
}

impl AdSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading ad settings {}", path.display()))?;
        serde_json::from_str(&text).context("parsing ad settings")
    }

    pub fn leaderboard(&self) -> Option<&str> {
        non_blank(&self.leaderboard_ad_code)
    }

    pub fn detail_ad(&self, placement: Placement) -> Option<&str> {
        let codes = &self.detail_page_ad_codes;
        non_blank(match placement {
            Placement::AfterImage => &codes.after_image,
            Placement::AfterDetails => &codes.after_details,
            Placement::AboveFooter => &codes.above_footer,
        })
    }
}

// ---------------------------------------------------------------------------
// Inline ad rotation
// ---------------------------------------------------------------------------

/// Position in the inline ad rotation. Owned by whoever renders the listing
/// grid; each render pass starts from `AdCursor::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdCursor(usize);

/// Pick the next non-blank inline ad code and advance the cursor.
/// With no codes configured the cursor is returned unchanged.
pub fn next_inline_ad(settings: &AdSettings, cursor: AdCursor) -> (Option<&str>, AdCursor) {
    let codes: Vec<&str> = settings
        .inline_ad_codes
        .iter()
        .filter_map(|c| non_blank(c))
        .collect();
    if codes.is_empty() {
        return (None, cursor);
    }
    let code = codes[cursor.0 % codes.len()];
    (Some(code), AdCursor(cursor.0.wrapping_add(1)))
}
