//! Project layout.
//!
//! Locates the project root and derives every path the build pipeline reads
//! or writes from it: vendored dependencies, presets, build and output trees.

use std::path::{Path, PathBuf};

use crate::core::error::{BuildError, BuildResult};
use crate::core::platform::Target;

/// File that marks the project root.
pub const PRESETS_FILE: &str = "CMakePresets.json";

/// Resolved paths of a project checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ProjectLayout { root: root.into() }
    }

    /// Resolve the project root.
    ///
    /// An explicit root wins (from `--root` or `PREBUILD_ROOT`); otherwise
    /// the nearest ancestor of `cwd` holding a presets file is used.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> BuildResult<Self> {
        if let Some(root) = explicit {
            let root = if root.is_absolute() {
                root.to_path_buf()
            } else {
                cwd.join(root)
            };
            return Ok(ProjectLayout::new(root));
        }

        find_project_root(cwd).map(ProjectLayout::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn presets_path(&self) -> PathBuf {
        self.root.join(PRESETS_FILE)
    }

    /// Project-local configuration file.
    pub fn config_path(&self) -> PathBuf {
        crate::util::config::project_config_path(&self.root)
    }

    pub fn third_party_dir(&self) -> PathBuf {
        self.root.join("third_party")
    }

    /// The inference library source tree (git submodule).
    pub fn llama_dir(&self) -> PathBuf {
        self.third_party_dir().join("llama.cpp")
    }

    pub fn opencl_headers_dir(&self) -> PathBuf {
        self.third_party_dir().join("OpenCL-Headers")
    }

    pub fn opencl_loader_dir(&self) -> PathBuf {
        self.third_party_dir().join("OpenCL-ICD-Loader")
    }

    pub fn opencl_stubs_dir(&self) -> PathBuf {
        self.third_party_dir().join("opencl-stubs")
    }

    pub fn vulkan_headers_dir(&self) -> PathBuf {
        self.third_party_dir().join("Vulkan-Headers")
    }

    /// Root of the packaged output tree.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Default compiler cache directory.
    pub fn ccache_dir(&self) -> PathBuf {
        self.root.join(".ccache")
    }

    /// Output directory for one target, e.g. `bin/linux/x64`.
    pub fn output_dir(&self, target: Target) -> PathBuf {
        let mut dir = self.bin_dir();
        for component in target.output_subdir().split('/') {
            dir.push(component);
        }
        dir
    }

    /// Verify the inference library submodule is checked out.
    pub fn verify_sources(&self) -> BuildResult<()> {
        let cmake_lists = self.llama_dir().join("CMakeLists.txt");
        if cmake_lists.is_file() {
            return Ok(());
        }

        Err(BuildError::DependencyNotFound {
            dependency: "llama.cpp sources".to_string(),
            tried: vec![cmake_lists.display().to_string()],
            help: vec![
                "Run: git submodule update --init --recursive third_party/llama.cpp".to_string(),
            ],
        })
    }
}

/// Find the nearest ancestor of `start` (inclusive) containing a presets file.
pub fn find_project_root(start: &Path) -> BuildResult<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PRESETS_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(BuildError::DependencyNotFound {
                dependency: format!("project root ({})", PRESETS_FILE),
                tried: vec![format!("{} and its parent directories", start.display())],
                help: vec![
                    "Run from inside the project checkout".to_string(),
                    "Pass --root <dir> or set PREBUILD_ROOT".to_string(),
                ],
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{AndroidAbi, AppleTarget, Arch};
    use tempfile::TempDir;

    #[test]
    fn test_find_project_root_searches_upward() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(PRESETS_FILE), "{}").unwrap();
        let nested = tmp.path().join("third_party").join("llama.cpp");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested).unwrap(), tmp.path());
    }

    #[test]
    fn test_find_project_root_missing() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(matches!(err, BuildError::DependencyNotFound { .. }));
    }

    #[test]
    fn test_explicit_root_wins() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::discover(Some(Path::new("checkout")), tmp.path()).unwrap();
        assert_eq!(layout.root(), tmp.path().join("checkout"));
    }

    #[test]
    fn test_output_dirs() {
        let layout = ProjectLayout::new("/repo");
        assert_eq!(
            layout.output_dir(Target::Linux(Arch::X64)),
            Path::new("/repo/bin/linux/x64")
        );
        assert_eq!(
            layout.output_dir(Target::Android(AndroidAbi::Arm64V8a)),
            Path::new("/repo/bin/android/arm64")
        );
        assert_eq!(
            layout.output_dir(Target::Apple(AppleTarget::IosSimArm64)),
            Path::new("/repo/bin/ios/arm64-sim")
        );
    }

    #[test]
    fn test_verify_sources() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        assert!(layout.verify_sources().is_err());

        std::fs::create_dir_all(layout.llama_dir()).unwrap();
        std::fs::write(layout.llama_dir().join("CMakeLists.txt"), "project(llama)").unwrap();
        assert!(layout.verify_sources().is_ok());
    }
}
