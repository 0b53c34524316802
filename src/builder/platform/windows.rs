//! Windows builds with the Vulkan SDK, vcpkg OpenBLAS, and CUDA.

use crate::builder::config::ResolvedConfiguration;
use crate::builder::platform::{cmake_path, required, BuildContext, PlatformBuilder};
use crate::core::error::{BuildError, BuildResult};
use crate::core::flags::{BackendFlagSet, Capability};
use crate::core::platform::{Arch, HostInfo, HostOs, Platform};
use crate::core::request::BuildRequest;
use crate::toolchain::compilers::nvcc_chain;
use crate::toolchain::{vcpkg, vulkan, ToolchainPaths};

/// Builder for the `windows-<arch>-full` presets.
pub struct WindowsBuilder;

impl PlatformBuilder for WindowsBuilder {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn check_host(&self, _request: &BuildRequest, host: &HostInfo) -> BuildResult<()> {
        if host.os == HostOs::Windows {
            Ok(())
        } else {
            Err(BuildError::host_mismatch(
                "Windows builds must be run on Windows hosts",
            ))
        }
    }

    fn locate(&self, request: &BuildRequest, ctx: &BuildContext<'_>) -> BuildResult<ToolchainPaths> {
        let flags = BackendFlagSet::derive(request.platform(), request.arch(), request.backend())?;
        let sys = ctx.sys;
        let mut paths = ToolchainPaths::default();

        if flags.is_on(Capability::Cuda) {
            paths.nvcc = Some(nvcc_chain().resolve(sys)?);
        }

        if flags.is_on(Capability::Blas) {
            match vcpkg::root_chain().find(sys)? {
                Some(found) => {
                    paths.vcpkg_toolchain = vcpkg::toolchain_file(sys, &found.value);
                    if paths.vcpkg_toolchain.is_none() {
                        tracing::warn!(
                            "vcpkg at {} has no scripts/buildsystems/vcpkg.cmake",
                            found.value.display()
                        );
                    }
                }
                None => tracing::info!("vcpkg not found; OpenBLAS resolves through CMake's own search"),
            }
        }

        if flags.is_on(Capability::Vulkan) {
            let sdk = vulkan::sdk_chain(request.overrides().vulkan_sdk.as_deref()).resolve(sys)?;
            tracing::info!("Using Vulkan SDK: {}", sdk.display());
            if request.arch() == Arch::X64 {
                paths.vulkan_include = Some(sdk.join("Include"));
                paths.vulkan_library = vulkan::sdk_library(sys, &sdk);
            }
            paths.glslc = vulkan::sdk_glslc(sys, &sdk);
            paths.vulkan_sdk = Some(sdk);
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

        if config.flags().is_on(Capability::Cuda) {
            let nvcc = required(&paths.nvcc, || nvcc_chain().not_found())?;
            config = config.with_define("CMAKE_CUDA_COMPILER", cmake_path(nvcc));
        }

        if let Some(toolchain) = &paths.vcpkg_toolchain {
            config = config
                .with_define("CMAKE_TOOLCHAIN_FILE", cmake_path(toolchain))
                .with_define("VCPKG_TARGET_TRIPLET", vcpkg::windows_triplet(request.arch()));
        }

        if config.flags().is_on(Capability::Vulkan) {
            let sdk = required(&paths.vulkan_sdk, || vulkan::sdk_chain(None).not_found())?;
            if request.arch() == Arch::X64 {
                config = config.with_define("Vulkan_ROOT", cmake_path(sdk));
                if let Some(include) = &paths.vulkan_include {
                    config = config.with_define("Vulkan_INCLUDE_DIR", cmake_path(include));
                }
                if let Some(library) = &paths.vulkan_library {
                    config = config.with_define("Vulkan_LIBRARY", cmake_path(library));
                }
            }
            if let Some(glslc) = &paths.glslc {
                config = config.with_define("Vulkan_GLSLC_EXECUTABLE", cmake_path(glslc));
            }
        }

        Ok(config)
    }
}
