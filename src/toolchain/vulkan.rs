//! Vulkan SDK, headers, and loader library discovery.

use std::path::{Path, PathBuf};

use crate::core::error::{BuildError, BuildResult};
use crate::core::platform::AndroidAbi;
use crate::toolchain::chain::DiscoveryChain;
use crate::toolchain::find_file_with_suffix;
use crate::toolchain::ndk;
use crate::toolchain::system::SystemView;

/// Android API level whose sysroot `libvulkan.so` is preferred.
pub const ANDROID_VULKAN_API_LEVEL: u32 = 28;

/// Discovery chain for the Windows Vulkan SDK root.
///
/// The explicit override (`--vulkan-sdk` or `[windows] vulkan-sdk`), then
/// `VULKAN_SDK`, then the SDK that owns the `glslc` found on `PATH`.
pub fn sdk_chain<'a>(explicit: Option<&'a Path>) -> DiscoveryChain<'a, PathBuf> {
    DiscoveryChain::new("Vulkan SDK")
        .probe("--vulkan-sdk", move |sys| {
            Ok(explicit
                .map(|p| sys.expand_home(&p.to_string_lossy()))
                .filter(|p| sys.exists(p)))
        })
        .probe("env VULKAN_SDK", |sys| {
            Ok(sys.env_path("VULKAN_SDK").filter(|p| sys.exists(p)))
        })
        .probe("glslc on PATH", |sys| Ok(sdk_from_glslc(sys)))
        .help("Pass --vulkan-sdk <dir>")
        .help("Set VULKAN_SDK to the SDK root")
        .help("Install the LunarG Vulkan SDK so glslc is on PATH")
}

/// Derive the SDK root from the shader compiler's location.
///
/// The compiler normally lives in `<sdk>/Bin`, so the parent and the
/// grandparent are checked for the SDK's headers or libraries.
fn sdk_from_glslc(sys: &dyn SystemView) -> Option<PathBuf> {
    let glslc = sys.which("glslc").or_else(|| sys.which("glslc.exe"))?;
    let bin_dir = glslc.parent()?;

    let root = [Some(bin_dir), bin_dir.parent()]
        .into_iter()
        .flatten()
        .find(|dir| {
            sys.is_file(&dir.join("Include").join("vulkan").join("vulkan.h"))
                || sys.exists(&dir.join("Lib"))
        })
        .map(Path::to_path_buf);
    root
}

/// The Vulkan import library inside an SDK, if present.
pub fn sdk_library(sys: &dyn SystemView, sdk: &Path) -> Option<PathBuf> {
    find_file_with_suffix(sys, sdk, "vulkan-1.lib", None)
}

/// The Windows shader compiler inside an SDK, if present.
pub fn sdk_glslc(sys: &dyn SystemView, sdk: &Path) -> Option<PathBuf> {
    find_file_with_suffix(sys, sdk, "glslc.exe", None)
}

/// Include directory of the vendored Vulkan headers.
///
/// Android builds compile shaders against these rather than an SDK.
pub fn vendored_headers(sys: &dyn SystemView, headers_dir: &Path) -> BuildResult<PathBuf> {
    let include = headers_dir.join("include");
    let header = include.join("vulkan").join("vulkan.h");
    if sys.is_file(&header) {
        return Ok(include);
    }

    Err(BuildError::DependencyNotFound {
        dependency: "Vulkan headers".to_string(),
        tried: vec![header.display().to_string()],
        help: vec![
            "Run: git submodule update --init --recursive third_party/Vulkan-Headers".to_string(),
        ],
    })
}

/// Discovery chain for `libvulkan.so` in an NDK sysroot.
///
/// The API-level specific copy is preferred over any copy for the ABI.
pub fn android_library_chain<'a>(
    ndk_root: &'a Path,
    abi: AndroidAbi,
) -> DiscoveryChain<'a, PathBuf> {
    let triple = abi.ndk_triple();
    let leveled = format!("{}/{}", triple, ANDROID_VULKAN_API_LEVEL);

    DiscoveryChain::new(format!("libvulkan.so for {}", abi))
        .probe(
            format!("{}/**/{}/libvulkan.so", ndk_root.display(), leveled),
            move |sys| Ok(ndk::find_abi_library(sys, ndk_root, "libvulkan.so", &leveled)),
        )
        .probe(
            format!("{}/**/{}/**/libvulkan.so", ndk_root.display(), triple),
            move |sys| Ok(ndk::find_abi_library(sys, ndk_root, "libvulkan.so", triple)),
        )
        .help("Install an NDK that ships sysroot Vulkan libraries (r21 or newer)")
}
