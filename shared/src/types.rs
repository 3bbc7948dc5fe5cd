//! Common types used across the platform

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of crops surfaced by the classifier recommendation panel
pub const TOP_RECOMMENDATIONS: usize = 5;

/// Number of crops surfaced by the price-only suggestion panel
pub const TOP_PRICE_SUGGESTIONS: usize = 10;

/// Number of forecast entries surfaced by the weather panel
pub const FORECAST_ENTRIES: usize = 5;

/// Failure to parse a user-facing enum value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown season: {0}")]
    UnknownSeason(String),

    #[error("Unknown soil type: {0}")]
    UnknownSoil(String),
}

/// A state/district selection, optionally narrowed to one season
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionQuery {
    pub state: String,
    pub district: String,
    #[serde(default)]
    pub season: Option<crate::models::Season>,
}

impl RegionQuery {
    pub fn new(state: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            district: district.into(),
            season: None,
        }
    }

    pub fn with_season(mut self, season: crate::models::Season) -> Self {
        self.season = Some(season);
        self
    }
}

/// Case- and whitespace-insensitive equality used for every name comparison
/// against the bundled tables (which pad and capitalise inconsistently).
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
