// ABOUTME: Unit normalization between supported measurement units and canonical grams
// ABOUTME: Pure conversion functions plus human-friendly display formatting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Unit normalizer.
//!
//! All stored quantities use a single canonical unit (grams). Volume and
//! count units are conflated as same-dimension scalars: a milliliter or a
//! single egg both count as one canonical unit, a liter scales like a
//! kilogram. Display conversion picks the largest mass unit with magnitude
//! >= 1 and is never used for stored values.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Supported input units for stock and recipe amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Milligram (0.001 canonical units)
    Milligram,
    /// Gram, the canonical unit
    #[default]
    Gram,
    /// Kilogram (1000 canonical units)
    Kilogram,
    /// Milliliter, treated as one canonical unit
    Milliliter,
    /// Liter, treated as 1000 canonical units
    Liter,
    /// Unit count (eggs, vanilla pods), one canonical unit each
    Count,
}

impl Unit {
    /// Convert to wire/database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Milligram => "mg",
            Self::Gram => "g",
            Self::Kilogram => "kg",
            Self::Milliliter => "ml",
            Self::Liter => "l",
            Self::Count => "un",
        }
    }

    /// Parse from a unit tag
    ///
    /// # Errors
    ///
    /// Returns `InvalidUnit` for an unrecognized tag.
    pub fn parse(tag: &str) -> AppResult<Self> {
        match tag.trim().to_lowercase().as_str() {
            "mg" | "milligram" => Ok(Self::Milligram),
            "g" | "gram" => Ok(Self::Gram),
            "kg" | "kilogram" => Ok(Self::Kilogram),
            "ml" | "milliliter" => Ok(Self::Milliliter),
            "l" | "liter" => Ok(Self::Liter),
            "un" | "unit" | "count" => Ok(Self::Count),
            other => Err(AppError::invalid_unit(other)),
        }
    }

    /// Multiplier from this unit to canonical units
    #[must_use]
    pub const fn canonical_factor(&self) -> f64 {
        match self {
            Self::Milligram => 0.001,
            Self::Gram | Self::Milliliter | Self::Count => 1.0,
            Self::Kilogram | Self::Liter => 1000.0,
        }
    }
}

/// A quantity rendered for humans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayQuantity {
    /// Magnitude in the chosen display unit, rounded to one decimal
    pub value: f64,
    /// Display unit tag
    pub unit: String,
}

/// Convert an amount in the given unit to canonical units
#[must_use]
pub fn to_canonical(amount: f64, unit: Unit) -> f64 {
    amount * unit.canonical_factor()
}

/// Render a canonical amount with the largest unit of magnitude >= 1
#[must_use]
pub fn to_display(canonical: f64) -> DisplayQuantity {
    let (value, unit) = if canonical >= 1000.0 {
        (canonical / 1000.0, Unit::Kilogram)
    } else if canonical >= 1.0 {
        (canonical, Unit::Gram)
    } else {
        (canonical * 1000.0, Unit::Milligram)
    };

    DisplayQuantity {
        value: (value * 10.0).round() / 10.0,
        unit: unit.as_str().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!(Unit::parse("kg").unwrap(), Unit::Kilogram);
        assert_eq!(Unit::parse("Gram").unwrap(), Unit::Gram);
        assert_eq!(Unit::parse(" ml ").unwrap(), Unit::Milliliter);
        assert_eq!(Unit::parse("un").unwrap(), Unit::Count);
    }

    #[test]
    fn test_parse_unknown_tag_fails() {
        let err = Unit::parse("furlong").unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::InvalidUnit);
    }

    #[test]
    fn test_to_canonical() {
        assert_eq!(to_canonical(2.5, Unit::Kilogram), 2500.0);
        assert_eq!(to_canonical(300.0, Unit::Gram), 300.0);
        assert_eq!(to_canonical(500.0, Unit::Milligram), 0.5);
        assert_eq!(to_canonical(1.0, Unit::Liter), 1000.0);
        assert_eq!(to_canonical(3.0, Unit::Count), 3.0);
    }

    #[test]
    fn test_to_display_picks_largest_unit() {
        assert_eq!(
            to_display(2500.0),
            DisplayQuantity {
                value: 2.5,
                unit: "kg".into()
            }
        );
        assert_eq!(
            to_display(300.0),
            DisplayQuantity {
                value: 300.0,
                unit: "g".into()
            }
        );
        assert_eq!(
            to_display(0.25),
            DisplayQuantity {
                value: 250.0,
                unit: "mg".into()
            }
        );
    }

    #[test]
    fn test_display_quantity_serde_round_trip() {
        let display = to_display(2500.0);
        let json = serde_json::to_string(&display).unwrap();
        assert!(json.contains("\"kg\""));

        let back: DisplayQuantity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, display);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        // When input unit and display unit coincide, display conversion
        // recovers x within the one-decimal rounding.
        for x in [1.2_f64, 42.0, 999.9] {
            let display = to_display(to_canonical(x, Unit::Gram));
            assert_eq!(display.unit, "g");
            assert!((display.value - x).abs() < 0.05);
        }

        let display = to_display(to_canonical(7.3, Unit::Kilogram));
        assert_eq!(display.unit, "kg");
        assert!((display.value - 7.3).abs() < 0.05);
    }
}
