//! Runtime library collection.
//!
//! After a build, the output tree is scanned for the shared libraries that
//! make up the runtime: the product libraries and the backend libraries
//! they load. Versioned SONAME aliases (`libfoo.so.0`, `libfoo.so.0.0.0`)
//! never match, so only canonical names are packaged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::error::{BuildError, BuildResult};
use crate::core::platform::Platform;
use crate::util::fs;

/// Library name prefixes packaged by default.
pub const DEFAULT_PREFIXES: [&str; 8] = [
    "llamadart",
    "llama",
    "ggml",
    "mtmd",
    "libllamadart",
    "libllama",
    "libggml",
    "libmtmd",
];

/// A library selected for packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeArtifact {
    /// File name in the output directory
    pub name: String,
    /// Where the build produced it
    pub source: PathBuf,
}

/// Selects and packages runtime libraries for one platform.
#[derive(Debug, Clone)]
pub struct ArtifactCollector {
    extension: String,
    prefixes: Vec<String>,
}

impl ArtifactCollector {
    /// Collector for a platform's shared library extension and the default prefixes.
    pub fn for_platform(platform: Platform) -> Self {
        ArtifactCollector {
            extension: platform.shared_library_extension().to_string(),
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Replace the prefix allowlist. An empty list keeps the current one.
    pub fn with_prefixes(mut self, prefixes: &[String]) -> Self {
        if !prefixes.is_empty() {
            self.prefixes = prefixes.iter().map(|p| p.to_ascii_lowercase()).collect();
        }
        self
    }

    /// Whether a file name is a runtime library for this platform.
    ///
    /// Matching is case-insensitive; the name must end in exactly
    /// `.<extension>`.
    pub fn is_runtime_library(&self, file_name: &str) -> bool {
        let name = file_name.to_ascii_lowercase();
        let suffix = format!(".{}", self.extension);
        name.ends_with(&suffix) && self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// Scan a build tree for runtime libraries.
    ///
    /// Files are indexed by name. When several paths share a name the last
    /// one in path order wins. The result is sorted by name.
    pub fn collect(&self, build_dir: &Path) -> BuildResult<Vec<RuntimeArtifact>> {
        let mut selected: BTreeMap<String, PathBuf> = BTreeMap::new();

        for entry in WalkDir::new(build_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            // `is_file` follows symlinks, so linked libraries count.
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if self.is_runtime_library(name) {
                selected.insert(name.to_string(), path.to_path_buf());
            }
        }

        if selected.is_empty() {
            return Err(BuildError::NoArtifactsFound {
                dir: build_dir.to_path_buf(),
            });
        }

        Ok(selected
            .into_iter()
            .map(|(name, source)| RuntimeArtifact { name, source })
            .collect())
    }

    /// Reset `out_dir` and copy artifacts into it.
    ///
    /// `root` is only used to print short paths.
    pub fn copy(&self, artifacts: &[RuntimeArtifact], out_dir: &Path, root: &Path) -> BuildResult<()> {
        fs::reset_dir(out_dir)?;

        for artifact in artifacts {
            let dst = out_dir.join(&artifact.name);
            fs::copy_file(&artifact.source, &dst)?;
            tracing::info!("Built: {}", fs::relative_path(root, &dst).display());
        }

        tracing::info!(
            "Copied {} runtime libraries to {}",
            artifacts.len(),
            fs::relative_path(root, out_dir).display()
        );
        Ok(())
    }

    /// Collect from `build_dir`, then reset `out_dir` and copy.
    ///
    /// Collection runs first, so a build with no outputs leaves the
    /// previous packaged libraries in place.
    pub fn collect_into(
        &self,
        build_dir: &Path,
        out_dir: &Path,
        root: &Path,
    ) -> BuildResult<Vec<RuntimeArtifact>> {
        let artifacts = self.collect(build_dir)?;
        self.copy(&artifacts, out_dir, root)?;
        Ok(artifacts)
    }
}
