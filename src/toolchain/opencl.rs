//! OpenCL headers and library discovery for Android.

use std::path::{Path, PathBuf};

use crate::core::error::BuildError;
use crate::core::platform::AndroidAbi;
use crate::toolchain::chain::DiscoveryChain;
use crate::toolchain::ndk;
use crate::toolchain::system::SystemView;
use crate::util::context::ProjectLayout;

/// Header every usable include directory must contain.
const CL_HEADER: [&str; 2] = ["CL", "cl.h"];

/// Environment variable overriding the OpenCL library for one ABI.
pub fn library_env_key(abi: AndroidAbi) -> String {
    format!("OPENCL_LIBRARY_ANDROID_{}", abi.env_suffix())
}

fn has_cl_header(sys: &dyn SystemView, include: &Path) -> bool {
    sys.is_file(&include.join(CL_HEADER[0]).join(CL_HEADER[1]))
}

/// Discovery chain for the OpenCL include directory.
pub fn include_chain<'a>(layout: &'a ProjectLayout) -> DiscoveryChain<'a, PathBuf> {
    let headers = layout.opencl_headers_dir();
    let stubs = layout.opencl_stubs_dir().join("include");

    DiscoveryChain::new("OpenCL headers (CL/cl.h)")
        .probe("env OPENCL_INCLUDE_DIR", |sys| {
            Ok(sys
                .env_path("OPENCL_INCLUDE_DIR")
                .filter(|dir| has_cl_header(sys, dir)))
        })
        .probe(headers.display().to_string(), move |sys| {
            Ok(has_cl_header(sys, &headers).then(|| headers.clone()))
        })
        .probe(stubs.display().to_string(), move |sys| {
            Ok(has_cl_header(sys, &stubs).then(|| stubs.clone()))
        })
        .help("Set OPENCL_INCLUDE_DIR to a directory containing CL/cl.h")
        .help("Run: git submodule update --init --recursive third_party/OpenCL-Headers")
        .help("Add headers under third_party/opencl-stubs/include")
}

/// Discovery chain for the OpenCL library of one ABI, without the loader build.
///
/// An explicit per-ABI override that points at a missing file is an error
/// rather than a miss. The caller may append a probe that builds the loader.
pub fn library_chain<'a>(
    layout: &'a ProjectLayout,
    ndk_root: &'a Path,
    abi: AndroidAbi,
) -> DiscoveryChain<'a, PathBuf> {
    let env_key = library_env_key(abi);
    let stub = layout
        .opencl_stubs_dir()
        .join("android")
        .join(abi.as_str())
        .join("libOpenCL.so");

    DiscoveryChain::new(format!("OpenCL library for {}", abi))
        .probe(format!("env {}", env_key), move |sys| {
            let Some(path) = sys.env_path(&env_key) else {
                return Ok(None);
            };
            if sys.is_file(&path) {
                Ok(Some(path))
            } else {
                Err(BuildError::configuration(format!(
                    "{} is set but file does not exist: {}",
                    env_key,
                    path.display()
                )))
            }
        })
        .probe(
            format!("{}/**/{}/**/libOpenCL.so", ndk_root.display(), abi.ndk_triple()),
            move |sys| {
                Ok(ndk::find_abi_library(
                    sys,
                    ndk_root,
                    "libOpenCL.so",
                    abi.ndk_triple(),
                ))
            },
        )
        .probe(stub.display().to_string(), move |sys| {
            Ok(sys.is_file(&stub).then(|| stub.clone()))
        })
        .help(format!(
            "Set {}=/path/to/libOpenCL.so",
            library_env_key(abi)
        ))
        .help(format!(
            "Add third_party/opencl-stubs/android/{}/libOpenCL.so",
            abi
        ))
        .help("Check out third_party/OpenCL-ICD-Loader and third_party/OpenCL-Headers to build the loader")
}

/// Label of the loader-build fallback in a library chain.
pub fn loader_build_source(layout: &ProjectLayout) -> String {
    format!("build {}", layout.opencl_loader_dir().display())
}

/// Whether the vendored loader and headers needed to build the loader exist.
pub fn loader_sources_present(sys: &dyn SystemView, layout: &ProjectLayout) -> bool {
    sys.is_file(&layout.opencl_loader_dir().join("CMakeLists.txt"))
        && has_cl_header(sys, &layout.opencl_headers_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockSystem;

    fn layout() -> ProjectLayout {
        ProjectLayout::new("/repo")
    }

    #[test]
    fn test_include_chain_order() {
        let layout = layout();
        let sys = MockSystem::new()
            .with_file("/repo/third_party/OpenCL-Headers/CL/cl.h")
            .with_file("/repo/third_party/opencl-stubs/include/CL/cl.h");
        assert_eq!(
            include_chain(&layout).resolve(&sys).unwrap(),
            PathBuf::from("/repo/third_party/OpenCL-Headers")
        );

        let sys = sys
            .with_env("OPENCL_INCLUDE_DIR", "/opt/cl")
            .with_file("/opt/cl/CL/cl.h");
        assert_eq!(
            include_chain(&layout).resolve(&sys).unwrap(),
            PathBuf::from("/opt/cl")
        );
    }

    #[test]
    fn test_include_dir_without_header_is_skipped() {
        let layout = layout();
        let sys = MockSystem::new()
            .with_env("OPENCL_INCLUDE_DIR", "/opt/empty")
            .with_dir("/opt/empty")
            .with_file("/repo/third_party/opencl-stubs/include/CL/cl.h");
        assert_eq!(
            include_chain(&layout).resolve(&sys).unwrap(),
            PathBuf::from("/repo/third_party/opencl-stubs/include")
        );
    }

    #[test]
    fn test_library_env_override_missing_file_is_fatal() {
        let layout = layout();
        let ndk = PathBuf::from("/ndk");
        let sys = MockSystem::new()
            .with_env("OPENCL_LIBRARY_ANDROID_ARM64_V8A", "/nope/libOpenCL.so")
            .with_file("/repo/third_party/opencl-stubs/android/arm64-v8a/libOpenCL.so");

        let err = library_chain(&layout, &ndk, AndroidAbi::Arm64V8a)
            .resolve(&sys)
            .unwrap_err();
        assert!(err.to_string().contains("OPENCL_LIBRARY_ANDROID_ARM64_V8A is set"));
    }

    #[test]
    fn test_library_ndk_precedes_stub() {
        let layout = layout();
        let ndk = PathBuf::from("/ndk");
        let sys = MockSystem::new()
            .with_file("/ndk/vendor/x86_64-linux-android/libOpenCL.so")
            .with_file("/repo/third_party/opencl-stubs/android/x86_64/libOpenCL.so");

        assert_eq!(
            library_chain(&layout, &ndk, AndroidAbi::X86_64)
                .resolve(&sys)
                .unwrap(),
            PathBuf::from("/ndk/vendor/x86_64-linux-android/libOpenCL.so")
        );
    }

    #[test]
    fn test_library_chain_sources() {
        let layout = layout();
        let ndk = PathBuf::from("/ndk");
        let chain = library_chain(&layout, &ndk, AndroidAbi::Arm64V8a)
            .probe(loader_build_source(&layout), |_| Ok(None));

        let sources = chain.sources();
        assert_eq!(sources.len(), 4);
        assert_eq!(sources[0], "env OPENCL_LIBRARY_ANDROID_ARM64_V8A");
        assert!(sources[3].starts_with("build "));
    }
}
