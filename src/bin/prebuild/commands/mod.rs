//! Command implementations

pub mod android;
pub mod apple;
pub mod build;
pub mod completions;
pub mod doctor;
pub mod linux;
pub mod list;
pub mod windows;
