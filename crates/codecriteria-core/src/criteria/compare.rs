//! Comparison primitives
//!
//! Every primitive is total: an operator outside its family, a NaN operand
//! or an unusable threshold yields `None` ("no violation") instead of an
//! error. String comparisons are case-sensitive and exact.

use serde_json::Value;
use thiserror::Error;

use crate::config::CriteriaConfig;
use crate::models::{ComparatorOperator, CriteriaValue};

/// A configured threshold could not be read as a number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("threshold '{0}' is not a number")]
pub struct ThresholdParseError(pub String);

/// Values that can be tested for emptiness by the presence comparator
pub trait Emptiness {
    /// Whether the value counts as empty
    fn is_empty_value(&self) -> bool;
}

impl Emptiness for str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for Value {
    // Empty objects and arrays are still a returned value.
    fn is_empty_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Comparison primitives parameterised by numeric equality tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparator {
    equality_tolerance: f64,
}

impl Default for Comparator {
    fn default() -> Self {
        Self {
            equality_tolerance: f64::EPSILON,
        }
    }
}

impl From<&CriteriaConfig> for Comparator {
    fn from(config: &CriteriaConfig) -> Self {
        Self::new(config.equality_tolerance)
    }
}

impl Comparator {
    /// Create a comparator; a non-finite tolerance falls back to exact-ish equality
    pub fn new(equality_tolerance: f64) -> Self {
        if equality_tolerance.is_finite() {
            Self {
                equality_tolerance: equality_tolerance.abs(),
            }
        } else {
            Self::default()
        }
    }

    /// Tolerance used by `Equals` / `NotEquals`
    pub fn equality_tolerance(&self) -> f64 {
        self.equality_tolerance
    }

    /// Compare a number against a numeric threshold
    pub fn compare_numbers(
        &self,
        value: f64,
        threshold: f64,
        operator: ComparatorOperator,
    ) -> Option<String> {
        if value.is_nan() || threshold.is_nan() {
            return None;
        }

        #[allow(clippy::float_cmp)]
        let equal = value == threshold || (value - threshold).abs() <= self.equality_tolerance;

        let violated = match operator {
            ComparatorOperator::GreaterThan => value > threshold,
            ComparatorOperator::GreaterThanOrEqual => value >= threshold,
            ComparatorOperator::LessThan => value < threshold,
            ComparatorOperator::LessThanOrEqual => value <= threshold,
            ComparatorOperator::Equals => equal,
            ComparatorOperator::NotEquals => !equal,
            _ => return None,
        };

        violated.then(|| format!("{value} {} {threshold}", operator.phrase()))
    }

    /// Compare a string against a textual threshold
    pub fn compare_strings(
        &self,
        value: &str,
        threshold: &str,
        operator: ComparatorOperator,
    ) -> Option<String> {
        let violated = match operator {
            ComparatorOperator::Equals => value == threshold,
            ComparatorOperator::NotEquals => value != threshold,
            ComparatorOperator::Contains => value.contains(threshold),
            ComparatorOperator::NotContains => !value.contains(threshold),
            ComparatorOperator::StartsWith => value.starts_with(threshold),
            ComparatorOperator::EndsWith => value.ends_with(threshold),
            _ => return None,
        };

        violated.then(|| format!("'{value}' {} '{threshold}'", operator.phrase()))
    }

    /// Test a possibly-absent value for emptiness
    ///
    /// Returns `None` for non-presence operators so the caller can fall
    /// through to the other primitives.
    pub fn compare_presence<T: Emptiness + ?Sized>(
        &self,
        value: Option<&T>,
        operator: ComparatorOperator,
    ) -> Option<String> {
        let is_empty = value.map_or(true, |v| v.is_empty_value());

        let violated = match operator {
            ComparatorOperator::IsEmpty => is_empty,
            ComparatorOperator::IsNotEmpty => !is_empty,
            _ => return None,
        };

        violated.then(|| format!("Value {}", operator.phrase()))
    }
}

/// [`Comparator::compare_numbers`] with the default tolerance
pub fn compare_numbers(value: f64, threshold: f64, operator: ComparatorOperator) -> Option<String> {
    Comparator::default().compare_numbers(value, threshold, operator)
}

/// [`Comparator::compare_strings`]
pub fn compare_strings(
    value: &str,
    threshold: &str,
    operator: ComparatorOperator,
) -> Option<String> {
    Comparator::default().compare_strings(value, threshold, operator)
}

/// [`Comparator::compare_presence`]
pub fn compare_presence<T: Emptiness + ?Sized>(
    value: Option<&T>,
    operator: ComparatorOperator,
) -> Option<String> {
    Comparator::default().compare_presence(value, operator)
}

/// Read a threshold as a number
pub fn parse_threshold(threshold: &CriteriaValue) -> Result<f64, ThresholdParseError> {
    match threshold {
        CriteriaValue::Number(n) if !n.is_nan() => Ok(*n),
        CriteriaValue::Number(n) => Err(ThresholdParseError(n.to_string())),
        CriteriaValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| !n.is_nan())
            .ok_or_else(|| ThresholdParseError(s.clone())),
    }
}

/// Coerce a threshold to a number, yielding NaN when that is not possible
pub fn to_number(threshold: Option<&CriteriaValue>) -> f64 {
    threshold
        .and_then(|t| parse_threshold(t).ok())
        .unwrap_or(f64::NAN)
}
