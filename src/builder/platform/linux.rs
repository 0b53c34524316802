//! Linux builds, native or cross-compiled between x64 and arm64.

use crate::builder::config::ResolvedConfiguration;
use crate::builder::patch::SourcePatch;
use crate::builder::platform::{cmake_path, required, BuildContext, PlatformBuilder};
use crate::core::error::{BuildError, BuildResult};
use crate::core::flags::{BackendFlagSet, Capability};
use crate::core::platform::{HostInfo, HostOs, Platform};
use crate::core::request::BuildRequest;
use crate::toolchain::compilers::{cross_compiler_chain, nvcc_chain};
use crate::toolchain::ToolchainPaths;

/// Builder for the `linux-<arch>-full` presets.
pub struct LinuxBuilder;

impl PlatformBuilder for LinuxBuilder {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn check_host(&self, _request: &BuildRequest, host: &HostInfo) -> BuildResult<()> {
        if host.os != HostOs::Linux {
            return Err(BuildError::host_mismatch(
                "Linux builds must be run on Linux hosts",
            ));
        }
        host.arch().map(|_| ())
    }

    fn locate(&self, request: &BuildRequest, ctx: &BuildContext<'_>) -> BuildResult<ToolchainPaths> {
        let flags = BackendFlagSet::derive(request.platform(), request.arch(), request.backend())?;
        let mut paths = ToolchainPaths::default();

        if request.arch() != ctx.host.arch()? {
            paths.cross = Some(cross_compiler_chain(request.arch()).resolve(ctx.sys)?);
        }
        if flags.is_on(Capability::Cuda) {
            paths.nvcc = Some(nvcc_chain().resolve(ctx.sys)?);
        }

        Ok(paths)
    }

    fn resolve(
        &self,
        request: &BuildRequest,
        paths: &ToolchainPaths,
        ctx: &BuildContext<'_>,
    ) -> BuildResult<ResolvedConfiguration> {
        let mut config = ctx.base_configuration(request)?;
        let arch = request.arch();

        if arch != ctx.host.arch()? {
            let cross = paths
                .cross
                .as_ref()
                .ok_or_else(|| cross_compiler_chain(arch).not_found())?;
            tracing::info!(
                "Cross-compiling for {} with {}",
                arch,
                cross.cc.display()
            );
            config = config
                .with_define("CMAKE_C_COMPILER", cmake_path(&cross.cc))
                .with_define("CMAKE_CXX_COMPILER", cmake_path(&cross.cxx))
                .with_define("CMAKE_SYSTEM_NAME", "Linux")
                .with_define("CMAKE_SYSTEM_PROCESSOR", arch.cmake_processor());
        }

        if config.flags().is_on(Capability::Cuda) {
            let nvcc = required(&paths.nvcc, || nvcc_chain().not_found())?;
            config = config.with_define("CMAKE_CUDA_COMPILER", cmake_path(nvcc));
        }

        if config.flags().is_on(Capability::ZenDnn) {
            config = config.with_source_patch(SourcePatch::zendnn_install_target(ctx.layout));
        }

        Ok(config)
    }
}
