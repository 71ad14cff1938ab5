//! Criteria rule models

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which field of a monitor response a rule inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckOn {
    /// Script execution time in milliseconds
    #[serde(alias = "Execution Time")]
    ExecutionTime,
    /// Error raised by the script
    Error,
    /// Value returned by the script
    #[serde(alias = "Result Value")]
    ResultValue,
}

impl CheckOn {
    /// All check targets, in display order
    pub const ALL: [CheckOn; 3] = [Self::ExecutionTime, Self::Error, Self::ResultValue];

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::ExecutionTime => "Execution Time",
            Self::Error => "Error",
            Self::ResultValue => "Result Value",
        }
    }

    /// Whether `operator` makes sense for this check target
    pub fn supports(self, operator: ComparatorOperator) -> bool {
        match self {
            Self::ExecutionTime => matches!(
                operator.family(),
                OperatorFamily::Ordering | OperatorFamily::Equality
            ),
            Self::Error => !matches!(operator.family(), OperatorFamily::Ordering),
            Self::ResultValue => true,
        }
    }

    /// Operators applicable to this check target
    pub fn operators(self) -> Vec<ComparatorOperator> {
        ComparatorOperator::ALL
            .into_iter()
            .filter(|op| self.supports(*op))
            .collect()
    }
}

impl fmt::Display for CheckOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Groups of operators sharing the same comparison primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    /// Magnitude comparisons, numbers only
    Ordering,
    /// Equality, numbers or strings
    Equality,
    /// Substring, prefix and suffix tests, strings only
    Text,
    /// Empty / not-empty tests, any value
    Presence,
}

/// Relational or textual operator configured on a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparatorOperator {
    /// Greater than
    #[serde(alias = "Greater Than")]
    GreaterThan,
    /// Greater than or equal to
    #[serde(alias = "Greater Than or Equal To")]
    GreaterThanOrEqual,
    /// Less than
    #[serde(alias = "Less Than")]
    LessThan,
    /// Less than or equal to
    #[serde(alias = "Less Than or Equal To")]
    LessThanOrEqual,
    /// Equal to
    #[serde(alias = "Equal To")]
    Equals,
    /// Not equal to
    #[serde(alias = "Not Equal To")]
    NotEquals,
    /// Contains substring
    Contains,
    /// Does not contain substring
    #[serde(alias = "Not Contains")]
    NotContains,
    /// Starts with prefix
    #[serde(alias = "Starts With")]
    StartsWith,
    /// Ends with suffix
    #[serde(alias = "Ends With")]
    EndsWith,
    /// Value is absent or empty
    #[serde(alias = "Is Empty")]
    IsEmpty,
    /// Value is present and non-empty
    #[serde(alias = "Is Not Empty")]
    IsNotEmpty,
}

impl ComparatorOperator {
    /// Every operator
    pub const ALL: [ComparatorOperator; 12] = [
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::IsEmpty,
        Self::IsNotEmpty,
    ];

    /// The comparison family this operator belongs to
    pub fn family(self) -> OperatorFamily {
        match self {
            Self::GreaterThan
            | Self::GreaterThanOrEqual
            | Self::LessThan
            | Self::LessThanOrEqual => OperatorFamily::Ordering,
            Self::Equals | Self::NotEquals => OperatorFamily::Equality,
            Self::Contains | Self::NotContains | Self::StartsWith | Self::EndsWith => {
                OperatorFamily::Text
            }
            Self::IsEmpty | Self::IsNotEmpty => OperatorFamily::Presence,
        }
    }

    /// Presence operators ignore the threshold
    pub fn is_presence(self) -> bool {
        self.family() == OperatorFamily::Presence
    }

    /// Phrase used in violation descriptions
    pub fn phrase(self) -> &'static str {
        match self {
            Self::GreaterThan => "is greater than",
            Self::GreaterThanOrEqual => "is greater than or equal to",
            Self::LessThan => "is less than",
            Self::LessThanOrEqual => "is less than or equal to",
            Self::Equals => "is equal to",
            Self::NotEquals => "is not equal to",
            Self::Contains => "contains",
            Self::NotContains => "does not contain",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
            Self::IsEmpty => "is empty",
            Self::IsNotEmpty => "is not empty",
        }
    }
}

impl fmt::Display for ComparatorOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::GreaterThan => "Greater Than",
            Self::GreaterThanOrEqual => "Greater Than or Equal To",
            Self::LessThan => "Less Than",
            Self::LessThanOrEqual => "Less Than or Equal To",
            Self::Equals => "Equal To",
            Self::NotEquals => "Not Equal To",
            Self::Contains => "Contains",
            Self::NotContains => "Not Contains",
            Self::StartsWith => "Starts With",
            Self::EndsWith => "Ends With",
            Self::IsEmpty => "Is Empty",
            Self::IsNotEmpty => "Is Not Empty",
        };
        f.write_str(label)
    }
}

/// Threshold configured on a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriteriaValue {
    /// Numeric threshold
    Number(f64),
    /// Textual threshold, possibly holding a number
    Text(String),
}

impl CriteriaValue {
    /// Blank strings count as "no threshold"
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

/// Numeric thresholds render like JavaScript's `Number#toString`, since rules
/// are authored against that text when compared with strings.
impl fmt::Display for CriteriaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[allow(clippy::float_cmp)]
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // Covers -0 as well.
    if n == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&n.abs()) {
        return n.to_string();
    }

    let exponential = format!("{n:e}");
    match exponential.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exponential,
    }
}

impl From<f64> for CriteriaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CriteriaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A single alert criteria rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaFilter {
    /// Field of the response to inspect
    pub check_on: CheckOn,

    /// Comparator to apply
    #[serde(rename = "filterType", alias = "comparatorOperator")]
    pub operator: ComparatorOperator,

    /// Threshold to compare against
    #[serde(default)]
    pub value: Option<CriteriaValue>,
}

impl CriteriaFilter {
    /// Create a rule
    pub fn new(
        check_on: CheckOn,
        operator: ComparatorOperator,
        value: Option<CriteriaValue>,
    ) -> Self {
        Self {
            check_on,
            operator,
            value,
        }
    }

    /// The threshold, if one is actually configured
    pub fn threshold(&self) -> Option<&CriteriaValue> {
        self.value.as_ref().filter(|v| !v.is_blank())
    }

    /// Check that this rule can ever fire
    pub fn validate(&self) -> Result<()> {
        if !self.check_on.supports(self.operator) {
            return Err(Error::validation(format!(
                "operator '{}' cannot be used with check '{}'",
                self.operator, self.check_on
            )));
        }

        if self.operator.is_presence() {
            return Ok(());
        }

        let Some(threshold) = self.threshold() else {
            return Err(Error::validation(format!(
                "operator '{}' requires a value",
                self.operator
            )));
        };

        if self.check_on == CheckOn::ExecutionTime
            && crate::criteria::parse_threshold(threshold).is_err()
        {
            return Err(Error::validation(format!(
                "'{}' requires a numeric value, got '{threshold}'",
                self.check_on
            )));
        }

        Ok(())
    }
}

/// How the filters of a criteria instance combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterCondition {
    /// Every filter must fire
    #[default]
    All,
    /// Any single filter firing is enough
    Any,
}

/// A group of rules evaluated together against one response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaInstance {
    /// How filter outcomes combine
    #[serde(default)]
    pub filter_condition: FilterCondition,

    /// The rules
    #[serde(default)]
    pub filters: Vec<CriteriaFilter>,
}

impl CriteriaInstance {
    /// Validate every filter
    pub fn validate(&self) -> Result<()> {
        for (index, filter) in self.filters.iter().enumerate() {
            filter
                .validate()
                .map_err(|e| Error::validation(format!("filter #{index}: {e}")))?;
        }
        Ok(())
    }
}
