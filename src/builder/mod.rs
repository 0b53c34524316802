//! Native build pipeline.
//!
//! This module turns a build request into a resolved configuration, drives
//! CMake through it, and packages the resulting runtime libraries.

pub mod collect;
pub mod config;
pub mod driver;
pub mod patch;
pub mod platform;
pub mod presets;

pub use collect::{ArtifactCollector, RuntimeArtifact};
pub use config::{GeneratedFile, ResolvedConfiguration};
pub use driver::BuildDriver;
pub use patch::{PatchGuard, PatchManager, PatchState, SourcePatch};
pub use platform::{builder_for, BuildContext, PlatformBuilder};
pub use presets::Presets;
