//! Per-platform build rules.
//!
//! Every platform implements the same [`PlatformBuilder`] contract: check
//! the host, locate the toolchain, and resolve a configuration. The
//! pipeline in `ops::build` drives them identically.

mod android;
mod apple;
mod linux;
mod windows;

use std::path::{Path, PathBuf};

pub use android::AndroidBuilder;
pub use apple::AppleBuilder;
pub use linux::LinuxBuilder;
pub use windows::WindowsBuilder;

use crate::builder::config::ResolvedConfiguration;
use crate::builder::driver::BuildDriver;
use crate::builder::presets::Presets;
use crate::core::error::{BuildError, BuildResult};
use crate::core::flags::BackendFlagSet;
use crate::core::platform::{HostInfo, Platform};
use crate::core::request::BuildRequest;
use crate::toolchain::{SystemView, ToolchainPaths};
use crate::util::context::ProjectLayout;
use crate::util::fs::to_forward_slashes;

/// Shared inputs for resolving and building one request.
pub struct BuildContext<'a> {
    pub layout: &'a ProjectLayout,
    pub presets: &'a Presets,
    pub host: &'a HostInfo,
    pub sys: &'a dyn SystemView,
    pub driver: &'a BuildDriver<'a>,
    /// Compiler cache directory exported when the caller has none
    pub ccache_dir: PathBuf,
}

impl BuildContext<'_> {
    /// Build directory of a request's preset.
    pub fn build_dir(&self, request: &BuildRequest) -> PathBuf {
        self.presets.build_dir(&request.target().preset_name())
    }

    /// Environment overlay shared by every command of a request.
    pub fn base_env(&self) -> Vec<(String, String)> {
        if self.sys.env("CCACHE_DIR").is_some() {
            Vec::new()
        } else {
            vec![(
                "CCACHE_DIR".to_string(),
                self.ccache_dir.to_string_lossy().into_owned(),
            )]
        }
    }

    /// Configuration with backend flags, directories, and the base environment.
    pub fn base_configuration(&self, request: &BuildRequest) -> BuildResult<ResolvedConfiguration> {
        let target = request.target();
        let flags = BackendFlagSet::derive(request.platform(), request.arch(), request.backend())?;
        let config = ResolvedConfiguration::new(
            target,
            self.build_dir(request),
            self.layout.output_dir(target),
            flags,
        );
        Ok(config.with_envs(self.base_env()))
    }
}

/// The build rules of one platform.
pub trait PlatformBuilder {
    fn platform(&self) -> Platform;

    /// Reject hosts that cannot build this platform.
    fn check_host(&self, request: &BuildRequest, host: &HostInfo) -> BuildResult<()>;

    /// Discover the toolchain paths the request needs.
    ///
    /// This is the only step that may fail on a missing dependency.
    fn locate(&self, request: &BuildRequest, ctx: &BuildContext<'_>) -> BuildResult<ToolchainPaths>;

    /// Turn a request and its discovered paths into a configuration.
    fn resolve(
        &self,
        request: &BuildRequest,
        paths: &ToolchainPaths,
        ctx: &BuildContext<'_>,
    ) -> BuildResult<ResolvedConfiguration>;
}

/// The builder for a platform.
pub fn builder_for(platform: Platform) -> &'static dyn PlatformBuilder {
    match platform {
        Platform::Apple => &AppleBuilder,
        Platform::Linux => &LinuxBuilder,
        Platform::Android => &AndroidBuilder,
        Platform::Windows => &WindowsBuilder,
    }
}

/// A path discovery must have filled in, or the error explaining it.
fn required<'p>(
    value: &'p Option<PathBuf>,
    missing: impl FnOnce() -> BuildError,
) -> BuildResult<&'p Path> {
    value.as_deref().ok_or_else(missing)
}

/// Render a path for a CMake argument.
fn cmake_path(path: &Path) -> String {
    to_forward_slashes(path)
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::test_support::{MockExecutor, MockSystem};

    /// Everything a builder test needs, rooted at `/repo`.
    pub struct Harness {
        pub layout: ProjectLayout,
        pub presets: Presets,
        pub host: HostInfo,
        pub sys: MockSystem,
        pub exec: MockExecutor,
    }

    impl Harness {
        pub fn new(host: HostInfo, sys: MockSystem) -> Self {
            Harness::at(Path::new("/repo"), host, sys)
        }

        /// Harness rooted at a real directory, for steps that touch disk.
        pub fn at(root: &Path, host: HostInfo, sys: MockSystem) -> Self {
            Harness {
                layout: ProjectLayout::new(root),
                presets: Presets::empty(root),
                host,
                sys,
                exec: MockExecutor::new(),
            }
        }

        /// Locate and resolve a request with this harness.
        pub fn resolve(&self, request: &BuildRequest) -> BuildResult<ResolvedConfiguration> {
            let driver = BuildDriver::new(&self.exec, "cmake", self.layout.root());
            let ctx = BuildContext {
                layout: &self.layout,
                presets: &self.presets,
                host: &self.host,
                sys: &self.sys,
                driver: &driver,
                ccache_dir: self.layout.ccache_dir(),
            };
            let builder = builder_for(request.platform());
            let paths = builder.locate(request, &ctx)?;
            builder.resolve(request, &paths, &ctx)
        }
    }
}
