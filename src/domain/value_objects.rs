//! # Domain Value Objects
//!
//! Immutable value types for the sales feed domain. Each type enforces its
//! invariant at construction time; an invalid instance is never observable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on product name length, in characters.
pub const MAX_PRODUCT_NAME_LEN: usize = 100;

/// Sentinel category assigned to feed nodes without a category element.
pub const DEFAULT_CATEGORY: &str = "Unknown";

const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

/// Construction-time validation failure, carrying the offending value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("product name must not be empty")]
    NameTooShort,

    #[error("product name exceeds {MAX_PRODUCT_NAME_LEN} characters (got {len})")]
    NameTooLong { len: usize },

    #[error("quantity must be greater than zero (got {value})")]
    QuantityNotPositive { value: i64 },

    #[error("price must not be negative (got {value} minor units)")]
    PriceNegative { value: i64 },
}

/// Validated product name, 1..=100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductName(String);

impl ProductName {
    /// Creates a product name.
    ///
    /// # Errors
    /// Returns [`ValidationError::NameTooShort`] for an empty name and
    /// [`ValidationError::NameTooLong`] past [`MAX_PRODUCT_NAME_LEN`] characters.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let len = name.chars().count();
        if len == 0 {
            return Err(ValidationError::NameTooShort);
        }
        if len > MAX_PRODUCT_NAME_LEN {
            return Err(ValidationError::NameTooLong { len });
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Units sold. Strictly positive; accumulates additively while a feed is
/// being aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity.
    ///
    /// # Errors
    /// Returns [`ValidationError::QuantityNotPositive`] for zero or negative input.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value <= 0 {
            return Err(ValidationError::QuantityNotPositive { value });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Adds another quantity into this one. Used during in-feed aggregation
    /// of repeated product names; the sum of two positive quantities stays
    /// positive, so the invariant holds.
    pub fn add(&mut self, other: Quantity) {
        self.0 += other.0;
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price in minor currency units (e.g. cents). Non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(i64);

impl Price {
    /// Creates a price already expressed in minor units.
    ///
    /// # Errors
    /// Returns [`ValidationError::PriceNegative`] for negative input.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value < 0 {
            return Err(ValidationError::PriceNegative { value });
        }
        Ok(Self(value))
    }

    /// Converts a decimal major-unit price (e.g. 12.34) into minor units.
    ///
    /// The conversion multiplies by 100 and truncates toward zero; fractional
    /// cents are discarded, never rounded.
    ///
    /// # Errors
    /// Returns [`ValidationError::PriceNegative`] when the input is negative.
    pub fn from_major_units(major: f64) -> Result<Self, ValidationError> {
        Self::new((major * MINOR_UNITS_PER_MAJOR).trunc() as i64)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category name. No invariant of its own; an absent category is normalized
/// to [`DEFAULT_CATEGORY`] at the parser boundary, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryName(String);

impl CategoryName {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_name_rejects_empty() {
        assert_eq!(ProductName::new(""), Err(ValidationError::NameTooShort));
    }

    #[test]
    fn product_name_accepts_boundary_lengths() {
        assert!(ProductName::new("A").is_ok());
        assert!(ProductName::new("x".repeat(100)).is_ok());
    }

    #[test]
    fn product_name_rejects_over_limit() {
        assert_eq!(
            ProductName::new("x".repeat(101)),
            Err(ValidationError::NameTooLong { len: 101 })
        );
    }

    #[test]
    fn quantity_rejects_zero_and_negative() {
        assert_eq!(
            Quantity::new(0),
            Err(ValidationError::QuantityNotPositive { value: 0 })
        );
        assert_eq!(
            Quantity::new(-3),
            Err(ValidationError::QuantityNotPositive { value: -3 })
        );
    }

    #[test]
    fn quantity_accumulates() {
        let mut q = Quantity::new(3).unwrap();
        q.add(Quantity::new(2).unwrap());
        assert_eq!(q.get(), 5);
    }

    #[test]
    fn price_rejects_negative_minor_units() {
        assert_eq!(
            Price::new(-1),
            Err(ValidationError::PriceNegative { value: -1 })
        );
        assert!(Price::new(0).is_ok());
    }

    #[test]
    fn price_conversion_truncates_fractional_cents() {
        assert_eq!(Price::from_major_units(12.345).unwrap().get(), 1234);
        assert_eq!(Price::from_major_units(10.00).unwrap().get(), 1000);
        assert_eq!(Price::from_major_units(0.0).unwrap().get(), 0);
        assert_eq!(Price::from_major_units(0.999).unwrap().get(), 99);
    }

    #[test]
    fn price_conversion_rejects_negative_major_units() {
        assert!(Price::from_major_units(-0.5).is_err());
    }
}
