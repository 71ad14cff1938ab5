//! Data models for CodeCriteria

mod criteria;
mod monitor;

pub use criteria::*;
pub use monitor::*;
