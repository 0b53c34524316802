//! Core data model: targets, requests, capability flags, errors.

pub mod error;
pub mod flags;
pub mod platform;
pub mod request;

pub use error::{BuildError, BuildResult};
pub use flags::{BackendFlagSet, Capability};
pub use platform::{AndroidAbi, AppleTarget, Arch, Backend, HostInfo, HostOs, Platform, Target};
pub use request::{BuildRequest, Overrides};
