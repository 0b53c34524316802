//! High-level operations.
//!
//! This module contains the implementation of prebuild commands.

pub mod build;
pub mod doctor;
pub mod list;

pub use build::{BuildOutcome, BuildSession};
pub use doctor::{doctor, format_report, CheckOutcome, CheckResult, DoctorReport, Tally};
pub use list::supported_combinations;
