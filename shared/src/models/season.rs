//! Cropping seasons and rule-table soil types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::ParseError;

/// Indian cropping season
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum Season {
    /// Monsoon-sown (June to October)
    Kharif,
    /// Winter-sown (October to March)
    Rabi,
    /// Short summer season between Rabi and Kharif
    Zaid,
}

impl Season {
    pub const ALL: [Season; 3] = [Season::Kharif, Season::Rabi, Season::Zaid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Zaid => "Zaid",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kharif" => Ok(Season::Kharif),
            "rabi" => Ok(Season::Rabi),
            // The production table calls the short summer season "Summer"
            "zaid" | "zayed" | "summer" => Ok(Season::Zaid),
            _ => Err(ParseError::UnknownSeason(s.trim().to_string())),
        }
    }
}

impl TryFrom<String> for Season {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Soil types known to the season/soil rule table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SoilKind {
    Alluvial,
    Black,
    Red,
    Laterite,
    Sandy,
    Clayey,
}

impl SoilKind {
    pub const ALL: [SoilKind; 6] = [
        SoilKind::Alluvial,
        SoilKind::Black,
        SoilKind::Red,
        SoilKind::Laterite,
        SoilKind::Sandy,
        SoilKind::Clayey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilKind::Alluvial => "Alluvial",
            SoilKind::Black => "Black",
            SoilKind::Red => "Red",
            SoilKind::Laterite => "Laterite",
            SoilKind::Sandy => "Sandy",
            SoilKind::Clayey => "Clayey",
        }
    }
}

impl fmt::Display for SoilKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alluvial" => Ok(SoilKind::Alluvial),
            "black" => Ok(SoilKind::Black),
            "red" => Ok(SoilKind::Red),
            "laterite" => Ok(SoilKind::Laterite),
            "sandy" => Ok(SoilKind::Sandy),
            "clayey" | "clay" => Ok(SoilKind::Clayey),
            _ => Err(ParseError::UnknownSoil(s.trim().to_string())),
        }
    }
}
