//! Evaluation of grouped criteria filters

use tracing::debug;

use crate::models::{CriteriaInstance, FilterCondition, MonitorResponse};

use super::CustomCodeCriteria;

impl CustomCodeCriteria {
    /// Evaluate every filter of a criteria instance.
    ///
    /// `Any` returns the first violation. `All` fires only when every filter
    /// fires, joining their descriptions. An empty instance never fires.
    pub fn evaluate_instance(
        &self,
        response: &MonitorResponse,
        instance: &CriteriaInstance,
    ) -> Option<String> {
        if instance.filters.is_empty() {
            return None;
        }

        let mut filters = instance.filters.iter();

        let violation = match instance.filter_condition {
            FilterCondition::Any => filters.find_map(|filter| self.evaluate(response, filter)),
            FilterCondition::All => filters
                .map(|filter| self.evaluate(response, filter))
                .collect::<Option<Vec<_>>>()
                .map(|descriptions| descriptions.join("; ")),
        };

        debug!(
            condition = ?instance.filter_condition,
            filters = instance.filters.len(),
            violated = violation.is_some(),
            "Evaluated criteria instance"
        );

        violation
    }
}
