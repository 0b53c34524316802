//! Apple builds: macOS and iOS targets with Metal and CPU in one library.

use crate::builder::config::ResolvedConfiguration;
use crate::builder::platform::{BuildContext, PlatformBuilder};
use crate::core::error::{BuildError, BuildResult};
use crate::core::platform::{HostInfo, HostOs, Platform};
use crate::core::request::BuildRequest;
use crate::toolchain::ToolchainPaths;

/// Builder for the consolidated Apple presets.
///
/// The presets carry the whole configuration, so there is nothing to
/// discover and no backend flags to pass.
pub struct AppleBuilder;

impl PlatformBuilder for AppleBuilder {
    fn platform(&self) -> Platform {
        Platform::Apple
    }

    fn check_host(&self, _request: &BuildRequest, host: &HostInfo) -> BuildResult<()> {
        if host.os == HostOs::Macos {
            Ok(())
        } else {
            Err(BuildError::host_mismatch(
                "Apple builds must be run on macOS hosts",
            ))
        }
    }

    fn locate(&self, _request: &BuildRequest, _ctx: &BuildContext<'_>) -> BuildResult<ToolchainPaths> {
        Ok(ToolchainPaths::default())
    }

    fn resolve(
        &self,
        request: &BuildRequest,
        _paths: &ToolchainPaths,
        ctx: &BuildContext<'_>,
    ) -> BuildResult<ResolvedConfiguration> {
        ctx.base_configuration(request)
    }
}
