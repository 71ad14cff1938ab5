//! # CodeCriteria
//!
//! Alert criteria evaluation for custom-code monitors.
//!
//! A custom-code monitor runs a user script and reports its execution time,
//! any script error and the returned value. CodeCriteria decides whether a
//! configured criteria rule fires for such a result and, if it does, returns
//! a human-readable description of the violation.
//!
//! ## Architecture
//!
//! - **Models**: monitor responses, criteria rules and rule groups
//! - **Criteria**: check-target dispatch and comparison primitives
//! - **Config**: layered file/environment configuration
//!
//! ## Quick Start
//!
//! ```
//! use codecriteria::models::{CheckOn, ComparatorOperator, CriteriaFilter, MonitorResponse};
//!
//! let response = MonitorResponse {
//!     execution_time_in_ms: Some(150.0),
//!     ..MonitorResponse::default()
//! };
//! let rule = CriteriaFilter::new(
//!     CheckOn::ExecutionTime,
//!     ComparatorOperator::GreaterThan,
//!     Some(100.0.into()),
//! );
//!
//! assert_eq!(
//!     codecriteria::evaluate(&response, &rule).as_deref(),
//!     Some("Execution Time: 150 is greater than 100")
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod criteria;
pub mod error;
pub mod models;

pub use config::Config;
pub use criteria::{evaluate, evaluate_instance, CustomCodeCriteria};
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::criteria::{Comparator, CustomCodeCriteria};
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
}
