//! # Unit Types and Quantity Formatting
//!
//! Reported physical quantities are always printed with exactly two decimal
//! places, because readers compare the narrative numbers against the
//! diagrams. This module owns that rule.
//!
//! The input table carries bare numbers; the unit labels printed next to them
//! come from [`UnitLabels`] (SI by default: m, kN, kN·m).
//!
//! ## Example
//!
//! ```rust
//! use report_core::units::{fixed2, Quantity, UnitLabels};
//!
//! assert_eq!(fixed2(12.0), "12.00");
//! assert_eq!(fixed2(-0.001), "0.00");
//!
//! let units = UnitLabels::default();
//! assert_eq!(Quantity::new(13.2, &units.moment).to_string(), "13.20 kN·m");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Format a value with exactly two decimal places.
///
/// Values that round to zero are printed as `0.00`, never `-0.00`.
pub fn fixed2(value: f64) -> String {
    let text = format!("{:.2}", value);
    if text == "-0.00" {
        "0.00".to_string()
    } else {
        text
    }
}

/// Unit labels printed next to reported quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitLabels {
    /// Position along the beam
    pub length: String,
    /// Shear force
    pub force: String,
    /// Bending moment
    pub moment: String,
}

impl Default for UnitLabels {
    fn default() -> Self {
        UnitLabels {
            length: "m".to_string(),
            force: "kN".to_string(),
            moment: "kN·m".to_string(),
        }
    }
}

/// A value paired with its unit label, displayed as `"{value:.2} {unit}"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity<'a> {
    pub value: f64,
    pub unit: &'a str,
}

impl<'a> Quantity<'a> {
    pub fn new(value: f64, unit: &'a str) -> Self {
        Quantity { value, unit }
    }
}

impl fmt::Display for Quantity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{}", fixed2(self.value))
        } else {
            write!(f, "{} {}", fixed2(self.value), self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed2_pads_and_rounds() {
        assert_eq!(fixed2(2.0), "2.00");
        assert_eq!(fixed2(1.005e3), "1005.00");
        assert_eq!(fixed2(-4.1), "-4.10");
        assert_eq!(fixed2(13.199999), "13.20");
    }

    #[test]
    fn test_fixed2_negative_zero() {
        assert_eq!(fixed2(-0.0), "0.00");
        assert_eq!(fixed2(-0.004), "0.00");
        assert_eq!(fixed2(-0.006), "-0.01");
    }

    #[test]
    fn test_quantity_display() {
        let units = UnitLabels::default();
        assert_eq!(Quantity::new(2.0, &units.length).to_string(), "2.00 m");
        assert_eq!(Quantity::new(-10.0, &units.force).to_string(), "-10.00 kN");
        assert_eq!(Quantity::new(3.0, "").to_string(), "3.00");
    }

    #[test]
    fn test_unit_labels_partial_json() {
        let units: UnitLabels = serde_json::from_str(r#"{"force": "kip"}"#).unwrap();
        assert_eq!(units.force, "kip");
        assert_eq!(units.length, "m");
    }

    proptest! {
        #[test]
        fn prop_fixed2_roundtrip_within_half_cent(value in -1.0e6f64..1.0e6) {
            let parsed: f64 = fixed2(value).parse().unwrap();
            prop_assert!((parsed - value).abs() <= 0.005 + 1e-9);
        }
    }
}
