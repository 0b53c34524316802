//! Prebuild - reproducible native library builds driven through CMake presets
//!
//! This crate turns a declarative build request (platform, architecture,
//! backend) into a resolved CMake configuration, locates the toolchains it
//! needs, drives configure and build, and packages the runtime libraries
//! into a platform-keyed output tree.

pub mod builder;
pub mod core;
pub mod ops;
pub mod toolchain;
pub mod util;

/// Test utilities and mocks for prebuild unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock implementations of the host view and
/// process execution, plus on-disk project fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{BuildError, BuildRequest, BuildResult, Target};
pub use builder::ResolvedConfiguration;
pub use ops::BuildSession;
pub use toolchain::ToolchainPaths;
pub use util::context::ProjectLayout;
