//! Viewer-relative rendering of stored body metrics.
//!
//! Measurements are stored metric (centimeters, kilograms) and converted at
//! read time into the viewer's unit system. Stored data is never mutated by
//! display conversion.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

const CM_PER_INCH: f64 = 2.54;
const KG_PER_LB: f64 = 0.453_592_37;
const INCHES_PER_FOOT: f64 = 12.0;

/// A viewer attribute, not a property of the row being displayed: the same
/// stored measurement renders differently depending on who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl Default for UnitSystem {
    fn default() -> Self {
        UnitSystem::Metric
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(format!("unknown unit system: {other}")),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Metric => write!(f, "metric"),
            UnitSystem::Imperial => write!(f, "imperial"),
        }
    }
}

/// Render a stored height. Metric rounds to the nearest centimeter;
/// imperial renders feet and rounded inches, carrying a rounded 12" into
/// the next foot so 182.5 cm is `6'0"` and never `5'12"`.
pub fn format_height(height_cm: Option<f64>, units: UnitSystem) -> Option<String> {
    let cm = height_cm.filter(|v| v.is_finite())?;
    match units {
        UnitSystem::Metric => Some(format!("{} cm", cm.round() as i64)),
        UnitSystem::Imperial => {
            let total_inches = cm / CM_PER_INCH;
            let mut feet = (total_inches / INCHES_PER_FOOT).floor() as i64;
            let mut inches = (total_inches - feet as f64 * INCHES_PER_FOOT).round() as i64;
            if inches == 12 {
                feet += 1;
                inches = 0;
            }
            Some(format!("{feet}'{inches}\""))
        }
    }
}

/// Render a stored weight, rounded to the nearest whole unit.
pub fn format_weight(weight_kg: Option<f64>, units: UnitSystem) -> Option<String> {
    let kg = weight_kg.filter(|v| v.is_finite())?;
    match units {
        UnitSystem::Metric => Some(format!("{} kg", kg.round() as i64)),
        UnitSystem::Imperial => Some(format!("{} lb", (kg / KG_PER_LB).round() as i64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("metric".parse::<UnitSystem>().unwrap(), UnitSystem::Metric);
        assert_eq!(
            "imperial".parse::<UnitSystem>().unwrap(),
            UnitSystem::Imperial
        );
        assert!("nautical".parse::<UnitSystem>().is_err());
    }

    #[test]
    fn test_metric_height_rounds_to_centimeter() {
        assert_eq!(
            format_height(Some(177.6), UnitSystem::Metric).unwrap(),
            "178 cm"
        );
    }

    #[test]
    fn test_imperial_height() {
        // 178 cm = 70.08 in -> 5'10"
        assert_eq!(
            format_height(Some(178.0), UnitSystem::Imperial).unwrap(),
            "5'10\""
        );
    }

    #[test]
    fn test_imperial_height_carries_twelve_inches_into_a_foot() {
        // 182.5 cm = 71.85 in; inches round to 12, which must carry.
        assert_eq!(
            format_height(Some(182.5), UnitSystem::Imperial).unwrap(),
            "6'0\""
        );
    }

    #[test]
    fn test_weight() {
        assert_eq!(
            format_weight(Some(82.3), UnitSystem::Metric).unwrap(),
            "82 kg"
        );
        // 82 kg = 180.8 lb
        assert_eq!(
            format_weight(Some(82.0), UnitSystem::Imperial).unwrap(),
            "181 lb"
        );
    }

    #[test]
    fn test_null_and_non_finite_render_as_none() {
        for units in [UnitSystem::Metric, UnitSystem::Imperial] {
            assert_eq!(format_height(None, units), None);
            assert_eq!(format_height(Some(f64::NAN), units), None);
            assert_eq!(format_weight(Some(f64::INFINITY), units), None);
        }
    }

    #[test]
    fn test_round_trip_stays_within_a_unit() {
        // metric -> imperial display -> metric again lands within the
        // rounding budget of one unit
        let kg = 82.0;
        let lb: f64 = 181.0; // rendered value
        assert!((lb * KG_PER_LB - kg).abs() <= 1.0);

        let cm = 178.0;
        let inches = 5.0 * 12.0 + 10.0; // rendered 5'10"
        assert!((inches * CM_PER_INCH - cm).abs() <= CM_PER_INCH);
    }
}
