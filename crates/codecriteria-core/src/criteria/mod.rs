//! Alert criteria evaluation for custom-code monitors
//!
//! [`CustomCodeCriteria`] picks the response field a rule checks and routes
//! it to the comparison primitives in [`compare`].

pub mod compare;
mod custom_code;
mod instance;

pub use compare::{
    compare_numbers, compare_presence, compare_strings, parse_threshold, to_number, Comparator,
    Emptiness, ThresholdParseError,
};
pub use custom_code::CustomCodeCriteria;

use crate::models::{CriteriaFilter, CriteriaInstance, MonitorResponse};

/// Evaluate one rule with default settings
pub fn evaluate(response: &MonitorResponse, rule: &CriteriaFilter) -> Option<String> {
    CustomCodeCriteria::default().evaluate(response, rule)
}

/// Evaluate a criteria instance with default settings
pub fn evaluate_instance(
    response: &MonitorResponse,
    instance: &CriteriaInstance,
) -> Option<String> {
    CustomCodeCriteria::default().evaluate_instance(response, instance)
}
