//! Criteria evaluation for custom-code monitors

use std::borrow::Cow;

use serde_json::Value;
use tracing::{debug, error};

use crate::config::CriteriaConfig;
use crate::models::{CheckOn, CriteriaFilter, MonitorResponse};

use super::compare::{parse_threshold, Comparator};

/// A script result reduced to something the comparators understand
#[derive(Debug, PartialEq)]
enum ComparableResult<'a> {
    Number(f64),
    Text(Cow<'a, str>),
    /// Booleans, absent results and anything that failed to serialize
    Other,
}

impl<'a> ComparableResult<'a> {
    /// Structured results are serialized into a new string; the response is never touched.
    fn from_result(result: Option<&'a Value>) -> Self {
        match result {
            Some(Value::Number(n)) => n.as_f64().map_or(Self::Other, Self::Number),
            Some(Value::String(s)) => Self::Text(Cow::Borrowed(s.as_str())),
            Some(structured @ (Value::Object(_) | Value::Array(_))) => {
                match serde_json::to_string_pretty(structured) {
                    Ok(text) => Self::Text(Cow::Owned(text)),
                    Err(e) => {
                        error!(error = %e, "Failed to serialize script result for comparison");
                        Self::Other
                    }
                }
            }
            Some(Value::Bool(_) | Value::Null) | None => Self::Other,
        }
    }
}

/// Decides whether a criteria filter fires for a custom-code monitor response
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomCodeCriteria {
    comparator: Comparator,
}

impl CustomCodeCriteria {
    /// Create an evaluator around the given comparator
    pub fn new(comparator: Comparator) -> Self {
        Self { comparator }
    }

    /// Create an evaluator from configuration
    pub fn from_config(config: &CriteriaConfig) -> Self {
        Self::new(Comparator::from(config))
    }

    /// The comparator in use
    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    /// Evaluate one rule against one response.
    ///
    /// Returns a description of the violation, or `None` when the rule does
    /// not fire. Misconfigured rules never fire; this never panics.
    pub fn evaluate(&self, response: &MonitorResponse, rule: &CriteriaFilter) -> Option<String> {
        let violation = match rule.check_on {
            CheckOn::ExecutionTime => self.check_execution_time(response, rule),
            CheckOn::Error => self.check_error(response, rule),
            CheckOn::ResultValue => self.check_result_value(response, rule),
        };

        debug!(
            check_on = %rule.check_on,
            operator = %rule.operator,
            violated = violation.is_some(),
            "Evaluated criteria filter"
        );

        violation.map(|description| format!("{}: {description}", rule.check_on))
    }

    /// Parse the configured threshold as a number, logging once when it cannot be.
    fn numeric_threshold(rule: &CriteriaFilter) -> Option<f64> {
        match rule.threshold().map(parse_threshold)? {
            Ok(n) => Some(n),
            Err(e) => {
                error!(
                    error = %e,
                    check_on = %rule.check_on,
                    "Failed to parse criteria threshold as a number"
                );
                None
            }
        }
    }

    fn check_execution_time(
        &self,
        response: &MonitorResponse,
        rule: &CriteriaFilter,
    ) -> Option<String> {
        let threshold = Self::numeric_threshold(rule)?;

        self.comparator
            .compare_numbers(response.execution_time_or_zero(), threshold, rule.operator)
    }

    fn check_error(&self, response: &MonitorResponse, rule: &CriteriaFilter) -> Option<String> {
        let script_error = response.script_error.as_deref();

        if let Some(violation) = self.comparator.compare_presence(script_error, rule.operator) {
            return Some(violation);
        }

        let (Some(threshold), Some(script_error)) = (rule.threshold(), script_error) else {
            return None;
        };

        self.comparator
            .compare_strings(script_error, &threshold.to_string(), rule.operator)
    }

    fn check_result_value(
        &self,
        response: &MonitorResponse,
        rule: &CriteriaFilter,
    ) -> Option<String> {
        if let Some(violation) = self
            .comparator
            .compare_presence(response.result.as_ref(), rule.operator)
        {
            return Some(violation);
        }

        let result = ComparableResult::from_result(response.result.as_ref());
        let threshold = rule.threshold();
        let numeric_threshold = Self::numeric_threshold(rule);

        if let (Some(threshold), ComparableResult::Number(value)) = (numeric_threshold, &result) {
            if let Some(violation) =
                self.comparator
                    .compare_numbers(*value, threshold, rule.operator)
            {
                return Some(violation);
            }
        }

        if let (Some(threshold), ComparableResult::Text(value)) = (threshold, &result) {
            if let Some(violation) =
                self.comparator
                    .compare_strings(value, &threshold.to_string(), rule.operator)
            {
                return Some(violation);
            }
        }

        None
    }
}
