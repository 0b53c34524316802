//! Toolchain and dependency discovery.
//!
//! Each external dependency is located through a [`DiscoveryChain`]: an
//! ordered list of probes over a [`SystemView`]. Probes never modify the
//! host, with the single exception of the OpenCL loader build that the
//! Android builder appends as a last resort.

pub mod chain;
pub mod compilers;
pub mod ndk;
pub mod opencl;
pub mod system;
pub mod vcpkg;
pub mod vulkan;

use std::path::{Path, PathBuf};

pub use chain::{Discovered, DiscoveryChain};
pub use compilers::CrossCompilers;
pub use system::{RealSystem, SystemView};

use crate::util::fs::to_forward_slashes;

/// Locations discovered for one build request.
///
/// Only the fields the request needs are populated; every populated field
/// was checked to exist when it was discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainPaths {
    /// Android NDK root
    pub ndk: Option<PathBuf>,
    /// Vulkan SDK root (Windows)
    pub vulkan_sdk: Option<PathBuf>,
    /// Vulkan headers include directory
    pub vulkan_include: Option<PathBuf>,
    /// Vulkan import/shared library
    pub vulkan_library: Option<PathBuf>,
    /// Shader compiler
    pub glslc: Option<PathBuf>,
    /// Make program used by the host shader-generator toolchain (Android)
    pub make_program: Option<PathBuf>,
    /// OpenCL headers include directory
    pub opencl_include: Option<PathBuf>,
    /// OpenCL library
    pub opencl_library: Option<PathBuf>,
    /// vcpkg toolchain file (Windows)
    pub vcpkg_toolchain: Option<PathBuf>,
    /// Cross compiler pair (Linux)
    pub cross: Option<CrossCompilers>,
    /// CUDA compiler
    pub nvcc: Option<PathBuf>,
}

/// First file below `root`, in path order, whose forward-slash path ends
/// with `suffix` and, if given, contains `contains`.
pub fn find_file_with_suffix(
    sys: &dyn SystemView,
    root: &Path,
    suffix: &str,
    contains: Option<&str>,
) -> Option<PathBuf> {
    sys.walk_files(root).into_iter().find(|path| {
        let text = to_forward_slashes(path);
        text.ends_with(suffix) && contains.map_or(true, |needle| text.contains(needle))
    })
}
