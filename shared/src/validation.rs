//! Validation utilities for the Crop Advisor

use rust_decimal::Decimal;
use validator::Validate;

use crate::models::SoilSample;

/// Message shown when the price panel is used without a usable price
pub const INVALID_PRICE_MESSAGE: &str = "Please enter a valid price.";

// ============================================================================
// Market Validations
// ============================================================================

/// Validate the user's expected crop price (₹ per quintal)
pub fn validate_expected_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err(INVALID_PRICE_MESSAGE);
    }
    Ok(())
}

/// Validate a price tolerance for the within-range match mode
pub fn validate_price_tolerance(tolerance: Decimal) -> Result<(), &'static str> {
    if tolerance < Decimal::ZERO {
        return Err("Price tolerance cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Soil Sample Validations
// ============================================================================

/// Validate ranges of every reading in a sample
pub fn validate_sample(sample: &SoilSample) -> Result<(), &'static str> {
    if sample.validate().is_err() {
        return Err("Soil sample readings out of range");
    }
    match &sample.soil_type {
        Some(soil) => validate_soil_type(soil),
        None => Ok(()),
    }
}

/// Validate a free-text soil type
pub fn validate_soil_type(soil: &str) -> Result<(), &'static str> {
    if soil.trim().is_empty() {
        return Err("Soil type cannot be blank");
    }
    Ok(())
}

// ============================================================================
// Region Validations
// ============================================================================

/// Validate a free-text state or district name
pub fn validate_region_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Region name cannot be empty");
    }
    if name.len() > 100 {
        return Err("Region name must be at most 100 characters");
    }
    Ok(())
}

/// Validate a city name for the forecast panel
pub fn validate_city(city: &str) -> Result<(), &'static str> {
    if city.trim().is_empty() {
        return Err("Please enter a city name");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_price_is_refused() {
        assert_eq!(
            validate_expected_price(Decimal::ZERO),
            Err(INVALID_PRICE_MESSAGE)
        );
        assert!(validate_expected_price(Decimal::from(-5)).is_err());
        assert!(validate_expected_price(Decimal::from(1500)).is_ok());
    }

    #[test]
    fn negative_tolerance_is_refused() {
        assert!(validate_price_tolerance(Decimal::from(-1)).is_err());
        assert!(validate_price_tolerance(Decimal::ZERO).is_ok());
    }

    #[test]
    fn blank_soil_type_is_refused() {
        let sample = SoilSample::new(50.0, 40.0, 30.0, 28.0, 60.0).with_soil_type("  ");
        assert!(validate_sample(&sample).is_err());
        let sample = SoilSample::new(50.0, 40.0, 30.0, 28.0, 60.0).with_soil_type("Loamy");
        assert!(validate_sample(&sample).is_ok());
    }

    #[test]
    fn region_and_city_names() {
        assert!(validate_region_name("   ").is_err());
        assert!(validate_region_name("Punjab").is_ok());
        assert!(validate_city("").is_err());
        assert!(validate_city("Pune").is_ok());
    }
}
