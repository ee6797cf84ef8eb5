//! Report rendering for measurement results.
//!
//! Reporting configuration is an explicit immutable value
//! ([`ReportOptions`]) passed in at call time; there are no process-wide
//! mode flags.

pub mod json;
pub mod terminal;

pub use terminal::{format_measurement, FrequencyStyle, ReportOptions, ReportScope};
