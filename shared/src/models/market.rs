//! Mandi (wholesale market) price models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A commodity's modal price at one market
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MandiPrice {
    pub commodity: String,
    /// Most frequent transacted price (₹ per quintal)
    pub modal_price: Decimal,
    pub state: String,
    pub market: String,
}

/// How market prices are compared with the user's expected price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PriceMatchMode {
    /// Modal price at or above the expected price
    AtOrAbove,
    /// Modal price within `tolerance` of the expected price, either side
    Within { tolerance: Decimal },
}

impl Default for PriceMatchMode {
    fn default() -> Self {
        PriceMatchMode::AtOrAbove
    }
}

impl PriceMatchMode {
    pub fn accepts(&self, modal_price: Decimal, expected: Decimal) -> bool {
        match self {
            PriceMatchMode::AtOrAbove => modal_price >= expected,
            PriceMatchMode::Within { tolerance } => modal_price
                .checked_sub(expected)
                .is_some_and(|d| d.abs() <= *tolerance),
        }
    }
}

/// Outcome of the price-based suggestion panel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PriceSuggestion {
    Matched { prices: Vec<MandiPrice> },
    NoMatch { reason: String },
}

impl PriceSuggestion {
    pub fn prices(&self) -> &[MandiPrice] {
        match self {
            PriceSuggestion::Matched { prices } => prices,
            PriceSuggestion::NoMatch { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_or_above_includes_equal_price() {
        let mode = PriceMatchMode::AtOrAbove;
        assert!(mode.accepts(Decimal::from(2000), Decimal::from(2000)));
        assert!(mode.accepts(Decimal::from(2100), Decimal::from(2000)));
        assert!(!mode.accepts(Decimal::from(1999), Decimal::from(2000)));
    }

    #[test]
    fn within_accepts_both_sides() {
        let mode = PriceMatchMode::Within {
            tolerance: Decimal::from(100),
        };
        assert!(mode.accepts(Decimal::from(1900), Decimal::from(2000)));
        assert!(mode.accepts(Decimal::from(2100), Decimal::from(2000)));
        assert!(!mode.accepts(Decimal::from(2101), Decimal::from(2000)));
    }

    #[test]
    fn within_rejects_distance_that_overflows() {
        let mode = PriceMatchMode::Within {
            tolerance: Decimal::ONE,
        };
        assert!(!mode.accepts(Decimal::NEGATIVE_ONE, Decimal::MAX));
        assert!(!mode.accepts(Decimal::MAX, Decimal::MIN));
        assert!(mode.accepts(Decimal::MAX, Decimal::MAX));
    }
}
