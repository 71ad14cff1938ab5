//! Custom-code monitor response model

use serde::{Deserialize, Serialize};

/// Result of one execution of a custom-code monitor script
///
/// Produced by the execution engine and read-only from the point of view of
/// criteria evaluation. `result` is the literal return value of the user's
/// code; structured values must stay as-is because incident templates
/// resolve fields out of them later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorResponse {
    /// Wall-clock execution time of the script in milliseconds
    #[serde(rename = "executionTimeInMS", default)]
    pub execution_time_in_ms: Option<f64>,

    /// Error raised by the script, if any
    #[serde(default)]
    pub script_error: Option<String>,

    /// Value returned by the script
    #[serde(default)]
    pub result: Option<serde_json::Value>,

    /// Console output captured during execution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log_messages: Vec<String>,
}

impl MonitorResponse {
    /// Execution time, treating an absent measurement as zero
    pub fn execution_time_or_zero(&self) -> f64 {
        self.execution_time_in_ms.unwrap_or(0.0)
    }
}
