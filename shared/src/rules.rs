//! Season/soil rule table
//!
//! Fixed agronomic suggestions that need no data: an exact-match lookup on
//! (season, soil), every Zaid soil shares one list, and anything unlisted
//! falls through to hardy defaults.

use crate::models::{Season, SoilKind};
use crate::types::ParseError;

const ZAID_CROPS: &[&str] = &["Watermelon", "Muskmelon", "Cucumber"];
const DEFAULT_CROPS: &[&str] = &["Millets", "Pulses"];

/// Crops suggested for a season and soil. Total and pure.
pub fn crops_for(season: Season, soil: SoilKind) -> &'static [&'static str] {
    match (season, soil) {
        (Season::Kharif, SoilKind::Alluvial) => &["Paddy", "Maize", "Jute"],
        (Season::Kharif, SoilKind::Black) => &["Cotton", "Soybean", "Jowar"],
        (Season::Kharif, SoilKind::Red) => &["Groundnut", "Ragi", "Millets"],
        (Season::Kharif, SoilKind::Laterite) => &["Paddy", "Cashew", "Ragi"],
        (Season::Rabi, SoilKind::Alluvial) => &["Wheat", "Mustard", "Barley"],
        (Season::Rabi, SoilKind::Black) => &["Gram", "Wheat", "Linseed"],
        (Season::Rabi, SoilKind::Red) => &["Groundnut", "Potato", "Ragi"],
        (Season::Zaid, _) => ZAID_CROPS,
        _ => DEFAULT_CROPS,
    }
}

/// String-facing lookup. Unknown names are rejected rather than defaulted.
pub fn lookup(season: &str, soil: &str) -> Result<&'static [&'static str], ParseError> {
    let season: Season = season.parse()?;
    let soil: SoilKind = soil.parse()?;
    Ok(crops_for(season, soil))
}
