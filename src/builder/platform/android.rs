//! Android builds with the NDK, Vulkan, and OpenCL.

use std::path::{Path, PathBuf};

use crate::builder::config::{GeneratedFile, ResolvedConfiguration};
use crate::builder::platform::{cmake_path, required, BuildContext, PlatformBuilder};
use crate::core::error::{BuildError, BuildResult};
use crate::core::flags::{BackendFlagSet, Capability};
use crate::core::platform::{AndroidAbi, HostInfo, Platform, Target};
use crate::core::request::BuildRequest;
use crate::toolchain::compilers::host_make_program;
use crate::toolchain::{find_file_with_suffix, ndk, opencl, vulkan, ToolchainPaths};
use crate::util::context::ProjectLayout;

/// Android platform level the loader is built for.
const ANDROID_PLATFORM: &str = "android-28";

/// Flags silencing the pragma messages the NDK headers emit.
const PRAGMA_FLAGS: &str = "-Wno-#pragma-messages";

/// Toolchain file for host-side shader generation, under the build dir.
const HOST_TOOLCHAIN_FILE: &str = "android-host-toolchain.cmake";

/// Loader build directory, under the build dir.
const LOADER_BUILD_DIR: &str = "opencl-loader";

/// Builder for the `android-<abi>-full` presets.
pub struct AndroidBuilder;

fn abi_of(request: &BuildRequest) -> BuildResult<AndroidAbi> {
    match request.target() {
        Target::Android(abi) => Ok(abi),
        other => Err(BuildError::configuration(format!(
            "{} is not an Android target",
            other
        ))),
    }
}

impl PlatformBuilder for AndroidBuilder {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    fn check_host(&self, _request: &BuildRequest, _host: &HostInfo) -> BuildResult<()> {
        Ok(())
    }

    fn locate(&self, request: &BuildRequest, ctx: &BuildContext<'_>) -> BuildResult<ToolchainPaths> {
        let flags = BackendFlagSet::derive(request.platform(), request.arch(), request.backend())?;
        let abi = abi_of(request)?;
        let sys = ctx.sys;
        let mut paths = ToolchainPaths::default();

        let ndk_root = ndk::ndk_chain().resolve(sys)?;
        tracing::info!("Using NDK: {}", ndk_root.display());
        tracing::info!("Building Android ABI={} backend={}", abi, request.backend());

        if flags.is_on(Capability::Vulkan) {
            paths.vulkan_include = Some(vulkan::vendored_headers(
                sys,
                &ctx.layout.vulkan_headers_dir(),
            )?);
            paths.make_program = host_make_program(sys);
            paths.glslc = ndk::find_glslc(sys, &ndk_root);
            paths.vulkan_library = Some(vulkan::android_library_chain(&ndk_root, abi).resolve(sys)?);
        }

        if flags.is_on(Capability::OpenCl) {
            let build_dir = ctx.build_dir(request);
            let loader_build = build_dir.join(LOADER_BUILD_DIR);
            let loader_args = loader_configure_args(ctx.layout, &ndk_root, abi);
            let mut env = ctx.base_env();
            env.push(ndk_home(&ndk_root));
            let jobs = request.jobs();

            let chain = opencl::library_chain(ctx.layout, &ndk_root, abi).probe(
                opencl::loader_build_source(ctx.layout),
                move |sys| {
                    if !opencl::loader_sources_present(sys, ctx.layout) {
                        return Ok(None);
                    }
                    tracing::info!("Building OpenCL ICD loader for {}", abi);
                    ctx.driver.build_project(
                        &ctx.layout.opencl_loader_dir(),
                        &loader_build,
                        &loader_args,
                        &env,
                        jobs,
                    )?;
                    Ok(find_file_with_suffix(sys, &loader_build, "libOpenCL.so", None))
                },
            );
            paths.opencl_library = Some(chain.resolve(sys)?);
            paths.opencl_include = Some(opencl::include_chain(ctx.layout).resolve(sys)?);
        }

        paths.ndk = Some(ndk_root);
        Ok(paths)
    }

    fn resolve(
        &self,
        request: &BuildRequest,
        paths: &ToolchainPaths,
        ctx: &BuildContext<'_>,
    ) -> BuildResult<ResolvedConfiguration> {
        let mut config = ctx.base_configuration(request)?;
        let abi = abi_of(request)?;

        let ndk_root = required(&paths.ndk, || ndk::ndk_chain().not_found())?;
        let (ndk_key, ndk_value) = ndk_home(ndk_root);
        config = config
            .with_env(ndk_key, ndk_value)
            .with_define("CMAKE_C_FLAGS", PRAGMA_FLAGS)
            .with_define("CMAKE_CXX_FLAGS", PRAGMA_FLAGS);

        if config.flags().is_on(Capability::Vulkan) {
            let include = required(&paths.vulkan_include, || {
                BuildError::configuration("Vulkan headers were not located")
            })?;
            let library = required(&paths.vulkan_library, || {
                vulkan::android_library_chain(ndk_root, abi).not_found()
            })?;

            let toolchain = config.build_dir().join(HOST_TOOLCHAIN_FILE);
            config = config
                .with_generated_file(GeneratedFile {
                    path: toolchain.clone(),
                    contents: host_toolchain_contents(ctx.host, paths.make_program.as_deref()),
                })
                .with_define("GGML_VULKAN_SHADERS_GEN_TOOLCHAIN", cmake_path(&toolchain));
            if let Some(glslc) = &paths.glslc {
                config = config.with_define("Vulkan_GLSLC_EXECUTABLE", cmake_path(glslc));
            }
            config = config
                .with_define("Vulkan_LIBRARY", cmake_path(library))
                .with_define("Vulkan_INCLUDE_DIR", cmake_path(include));
        }

        if config.flags().is_on(Capability::OpenCl) {
            let include = required(&paths.opencl_include, || {
                opencl::include_chain(ctx.layout).not_found()
            })?;
            let library = required(&paths.opencl_library, || {
                opencl::library_chain(ctx.layout, ndk_root, abi).not_found()
            })?;
            config = config
                .with_define("OpenCL_INCLUDE_DIR", cmake_path(include))
                .with_define("OpenCL_LIBRARY", cmake_path(library));
        }

        Ok(config)
    }
}

fn ndk_home(ndk_root: &Path) -> (String, String) {
    (
        "ANDROID_NDK_HOME".to_string(),
        ndk_root.to_string_lossy().into_owned(),
    )
}

/// Toolchain file that lets the shader generator build for the host.
fn host_toolchain_contents(host: &HostInfo, make_program: Option<&Path>) -> String {
    let mut lines = Vec::new();
    if let Some(make) = make_program {
        lines.push(format!(
            "set(CMAKE_MAKE_PROGRAM \"{}\" CACHE STRING \"make program\" FORCE)",
            cmake_path(make)
        ));
    }
    lines.push(format!(
        "set(CMAKE_SYSTEM_NAME \"{}\")",
        host.cmake_system_name()
    ));
    lines.push("set(Threads_FOUND TRUE)".to_string());
    lines.push("set(CMAKE_THREAD_LIBS_INIT \"-pthread\")".to_string());
    lines.push("set(CMAKE_USE_PTHREADS_INIT TRUE)".to_string());

    let mut contents = lines.join("\n");
    contents.push('\n');
    contents
}

/// Configure arguments for building the OpenCL ICD loader with the NDK.
fn loader_configure_args(layout: &ProjectLayout, ndk_root: &Path, abi: AndroidAbi) -> Vec<String> {
    let toolchain: PathBuf = ndk::cmake_toolchain_file(ndk_root);
    vec![
        "-G".to_string(),
        "Ninja".to_string(),
        format!("-DCMAKE_TOOLCHAIN_FILE={}", cmake_path(&toolchain)),
        format!("-DANDROID_ABI={}", abi),
        format!("-DANDROID_PLATFORM={}", ANDROID_PLATFORM),
        "-DCMAKE_BUILD_TYPE=Release".to_string(),
        format!("-DCMAKE_C_FLAGS={} -Wno-typedef-redefinition", PRAGMA_FLAGS),
        "-DENABLE_OPENCL_LAYERS=OFF".to_string(),
        "-DENABLE_OPENCL_LAYERINFO=OFF".to_string(),
        format!(
            "-DOPENCL_ICD_LOADER_HEADERS_DIR={}",
            cmake_path(&layout.opencl_headers_dir())
        ),
        "-DOPENCL_ICD_LOADER_BUILD_TESTING=OFF".to_string(),
        "-DBUILD_TESTING=OFF".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::platform::test_util::Harness;
    use crate::core::platform::{Backend, HostOs};
    use crate::test_support::MockSystem;

    const NDK: &str = "/sdk/ndk/26.1.10909125";

    fn host() -> HostInfo {
        HostInfo::new(HostOs::Linux, "x86_64")
    }

    fn ndk_system() -> MockSystem {
        MockSystem::new()
            .with_env("ANDROID_NDK_HOME", NDK)
            .with_dir(NDK)
    }

    fn vulkan_system() -> MockSystem {
        ndk_system()
            .with_file("/repo/third_party/Vulkan-Headers/include/vulkan/vulkan.h")
            .with_file(format!(
                "{NDK}/toolchains/llvm/prebuilt/linux-x86_64/sysroot/usr/lib/aarch64-linux-android/24/libvulkan.so"
            ))
            .with_file(format!(
                "{NDK}/toolchains/llvm/prebuilt/linux-x86_64/sysroot/usr/lib/aarch64-linux-android/28/libvulkan.so"
            ))
            .with_file(format!("{NDK}/shader-tools/linux-x86_64/glslc"))
            .with_program("ninja", "/usr/bin/ninja")
    }

    #[test]
    fn test_vulkan_prefers_api_level_library() {
        let harness = Harness::new(host(), vulkan_system());
        let request =
            BuildRequest::new(Target::Android(AndroidAbi::Arm64V8a), Backend::Vulkan).unwrap();

        let config = harness.resolve(&request).unwrap();
        assert!(config
            .define_value("Vulkan_LIBRARY")
            .unwrap()
            .ends_with("/aarch64-linux-android/28/libvulkan.so"));
        assert_eq!(
            config.define_value("Vulkan_INCLUDE_DIR").as_deref(),
            Some("/repo/third_party/Vulkan-Headers/include")
        );
        assert_eq!(
            config.define_value("Vulkan_GLSLC_EXECUTABLE"),
            Some(format!("{NDK}/shader-tools/linux-x86_64/glslc"))
        );
        assert_eq!(config.env_var("ANDROID_NDK_HOME"), Some(NDK));
        assert_eq!(
            config.define_value("CMAKE_C_FLAGS").as_deref(),
            Some("-Wno-#pragma-messages")
        );
        assert_eq!(config.define_value("GGML_OPENCL").as_deref(), Some("OFF"));
        assert_eq!(config.define_value("GGML_CPU_KLEIDIAI").as_deref(), Some("ON"));
    }

    #[test]
    fn test_vulkan_writes_host_toolchain() {
        let harness = Harness::new(host(), vulkan_system());
        let request =
            BuildRequest::new(Target::Android(AndroidAbi::Arm64V8a), Backend::Vulkan).unwrap();

        let config = harness.resolve(&request).unwrap();
        let toolchain = &config.generated_files()[0];
        assert_eq!(
            toolchain.path,
            PathBuf::from("/repo/build/android-arm64-v8a-full/android-host-toolchain.cmake")
        );
        assert_eq!(
            toolchain.contents,
            "set(CMAKE_MAKE_PROGRAM \"/usr/bin/ninja\" CACHE STRING \"make program\" FORCE)\n\
             set(CMAKE_SYSTEM_NAME \"Linux\")\n\
             set(Threads_FOUND TRUE)\n\
             set(CMAKE_THREAD_LIBS_INIT \"-pthread\")\n\
             set(CMAKE_USE_PTHREADS_INIT TRUE)\n"
        );
        assert_eq!(
            config.define_value("GGML_VULKAN_SHADERS_GEN_TOOLCHAIN"),
            Some(cmake_path(&toolchain.path))
        );
    }

    #[test]
    fn test_missing_ndk_lists_every_source() {
        let harness = Harness::new(host(), MockSystem::new());
        let request =
            BuildRequest::new(Target::Android(AndroidAbi::X86_64), Backend::Vulkan).unwrap();

        let err = harness.resolve(&request).unwrap_err();
        let BuildError::DependencyNotFound { dependency, tried, .. } = err else {
            panic!("expected DependencyNotFound, got {err:?}");
        };
        assert_eq!(dependency, "Android NDK");
        assert_eq!(tried.len(), 7);
        assert_eq!(tried[0], "env ANDROID_NDK_HOME");
        assert_eq!(tried[6], ndk::LEGACY_NDK_BUNDLE);
    }

    #[test]
    fn test_missing_vulkan_library_is_fatal() {
        let sys = ndk_system()
            .with_file("/repo/third_party/Vulkan-Headers/include/vulkan/vulkan.h");
        let harness = Harness::new(host(), sys);
        let request =
            BuildRequest::new(Target::Android(AndroidAbi::X86_64), Backend::Vulkan).unwrap();

        let err = harness.resolve(&request).unwrap_err();
        assert!(err.to_string().contains("libvulkan.so for x86_64"));
    }

    #[test]
    fn test_opencl_env_override_must_exist() {
        let sys = ndk_system()
            .with_env("OPENCL_LIBRARY_ANDROID_ARM64_V8A", "/missing/libOpenCL.so")
            .with_file("/repo/third_party/OpenCL-Headers/CL/cl.h");
        let harness = Harness::new(host(), sys);
        let request =
            BuildRequest::new(Target::Android(AndroidAbi::Arm64V8a), Backend::OpenCl).unwrap();

        let err = harness.resolve(&request).unwrap_err();
        assert!(matches!(err, BuildError::Configuration { .. }));
        assert!(err.to_string().contains("OPENCL_LIBRARY_ANDROID_ARM64_V8A"));
    }

    #[test]
    fn test_opencl_falls_back_to_stub() {
        let sys = ndk_system()
            .with_file("/repo/third_party/opencl-stubs/include/CL/cl.h")
            .with_file("/repo/third_party/opencl-stubs/android/x86_64/libOpenCL.so");
        let harness = Harness::new(host(), sys);
        let request =
            BuildRequest::new(Target::Android(AndroidAbi::X86_64), Backend::OpenCl).unwrap();

        let config = harness.resolve(&request).unwrap();
        assert_eq!(
            config.define_value("OpenCL_INCLUDE_DIR").as_deref(),
            Some("/repo/third_party/opencl-stubs/include")
        );
        assert_eq!(
            config.define_value("OpenCL_LIBRARY").as_deref(),
            Some("/repo/third_party/opencl-stubs/android/x86_64/libOpenCL.so")
        );
        assert!(harness.exec.calls().is_empty());
    }

    #[test]
    fn test_opencl_builds_loader_as_last_resort() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        let loader_output = root.join("build/android-arm64-v8a-full/opencl-loader/libOpenCL.so");
        let sys = ndk_system()
            .with_file(root.join("third_party/OpenCL-Headers/CL/cl.h"))
            .with_file(root.join("third_party/OpenCL-ICD-Loader/CMakeLists.txt"))
            .with_file(&loader_output);
        let harness = Harness::at(root, host(), sys);
        let request = BuildRequest::new(Target::Android(AndroidAbi::Arm64V8a), Backend::OpenCl)
            .unwrap()
            .with_jobs(std::num::NonZeroUsize::new(2));

        let config = harness.resolve(&request).unwrap();
        assert_eq!(
            config.define_value("OpenCL_LIBRARY"),
            Some(cmake_path(&loader_output))
        );

        let calls = harness.exec.calls();
        assert_eq!(calls.len(), 2);
        let configure = calls[0].arguments();
        assert_eq!(configure[0], "-S");
        assert!(configure.contains(&"-DANDROID_ABI=arm64-v8a".to_string()));
        assert!(configure.contains(&"-DANDROID_PLATFORM=android-28".to_string()));
        assert!(configure.contains(&format!(
            "-DCMAKE_TOOLCHAIN_FILE={NDK}/build/cmake/android.toolchain.cmake"
        )));
        assert_eq!(
            calls[0].env_vars().get("ANDROID_NDK_HOME").map(String::as_str),
            Some(NDK)
        );
        assert!(calls[1].display_command().ends_with("--config Release --parallel 2"));
    }

    #[test]
    fn test_full_enables_vulkan_and_opencl() {
        let sys = vulkan_system()
            .with_file("/repo/third_party/OpenCL-Headers/CL/cl.h")
            .with_file(format!(
                "{NDK}/toolchains/llvm/prebuilt/linux-x86_64/sysroot/usr/lib/aarch64-linux-android/libOpenCL.so"
            ));
        let harness = Harness::new(host(), sys);
        let request =
            BuildRequest::new(Target::Android(AndroidAbi::Arm64V8a), Backend::Full).unwrap();

        let config = harness.resolve(&request).unwrap();
        assert_eq!(config.define_value("GGML_VULKAN").as_deref(), Some("ON"));
        assert_eq!(config.define_value("GGML_OPENCL").as_deref(), Some("ON"));
        assert!(config
            .define_value("OpenCL_LIBRARY")
            .unwrap()
            .ends_with("/aarch64-linux-android/libOpenCL.so"));
        assert_eq!(config.output_dir(), PathBuf::from("/repo/bin/android/arm64"));
    }
}
