//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.prebuild/config.toml` - User-wide defaults
//! - Project: `<root>/.prebuild/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Prebuild configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// External tool locations
    pub tools: ToolsConfig,

    /// Windows-specific settings
    pub windows: WindowsConfig,

    /// Artifact collection settings
    pub artifacts: ArtifactsConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Default number of parallel jobs for the build step
    pub jobs: Option<usize>,

    /// Compiler cache directory (defaults to `<root>/.ccache`)
    pub ccache_dir: Option<PathBuf>,
}

/// Explicit tool locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path to the cmake executable
    pub cmake: Option<PathBuf>,
}

/// Windows-specific configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WindowsConfig {
    /// Default Vulkan SDK root when `--vulkan-sdk` is not given
    pub vulkan_sdk: Option<PathBuf>,
}

/// Artifact collection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Library name prefixes that qualify as runtime artifacts
    pub prefixes: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load a config file; a missing or malformed file yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.is_file() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring {}: {:#}", path.display(), e);
            Self::default()
        })
    }

    /// Layer `over` on top of this config. Values set in `over` win; an
    /// empty prefix list counts as unset.
    pub fn layered(self, over: Config) -> Config {
        let prefixes = if over.artifacts.prefixes.is_empty() {
            self.artifacts.prefixes
        } else {
            over.artifacts.prefixes
        };

        Config {
            build: BuildConfig {
                jobs: over.build.jobs.or(self.build.jobs),
                ccache_dir: over.build.ccache_dir.or(self.build.ccache_dir),
            },
            tools: ToolsConfig {
                cmake: over.tools.cmake.or(self.tools.cmake),
            },
            windows: WindowsConfig {
                vulkan_sdk: over.windows.vulkan_sdk.or(self.windows.vulkan_sdk),
            },
            artifacts: ArtifactsConfig { prefixes },
        }
    }
}

/// Load merged configuration: project over global over defaults.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    global_path
        .into_iter()
        .chain(std::iter::once(project_path))
        .map(Config::load_or_default)
        .fold(Config::default(), Config::layered)
}

/// `~/.prebuild/config.toml`
pub fn global_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".prebuild").join("config.toml"))
}

/// `<root>/.prebuild/config.toml`
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".prebuild").join("config.toml")
}
