//! CMake presets metadata.
//!
//! The presets file is parsed once at startup and passed to every request.
//! Only configure presets are read, and only for their build directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::error::{BuildError, BuildResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresetsFile {
    #[serde(default)]
    configure_presets: Vec<ConfigurePreset>,
}

/// A configure preset, reduced to what the driver needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurePreset {
    pub name: String,
    #[serde(default)]
    pub binary_dir: Option<String>,
}

/// Parsed `CMakePresets.json`.
#[derive(Debug, Clone)]
pub struct Presets {
    source_dir: PathBuf,
    configure: Vec<ConfigurePreset>,
}

impl Presets {
    /// Read and parse the presets file of a project.
    pub fn load(path: &Path, source_dir: &Path) -> BuildResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| BuildError::Presets {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&contents, source_dir).map_err(|message| BuildError::Presets {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse presets JSON.
    pub fn parse(contents: &str, source_dir: &Path) -> Result<Self, String> {
        let file: PresetsFile = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        Ok(Presets {
            source_dir: source_dir.to_path_buf(),
            configure: file.configure_presets,
        })
    }

    /// Presets with no entries; every build directory uses the fallback.
    pub fn empty(source_dir: &Path) -> Self {
        Presets {
            source_dir: source_dir.to_path_buf(),
            configure: Vec::new(),
        }
    }

    /// Look up a configure preset by name.
    pub fn get(&self, name: &str) -> Option<&ConfigurePreset> {
        self.configure.iter().find(|p| p.name == name)
    }

    /// Build directory of a preset.
    ///
    /// `${sourceDir}` and `${presetName}` are substituted in the preset's
    /// `binaryDir`. Presets that are unknown or name no directory build in
    /// `<source>/build/<preset>`.
    pub fn build_dir(&self, preset: &str) -> PathBuf {
        let template = self
            .get(preset)
            .and_then(|p| p.binary_dir.as_deref())
            .filter(|dir| !dir.is_empty());

        match template {
            Some(template) => {
                let resolved = template
                    .replace("${sourceDir}", &self.source_dir.to_string_lossy())
                    .replace("${presetName}", preset);
                let path = PathBuf::from(resolved);
                if path.is_absolute() {
                    path
                } else {
                    self.source_dir.join(path)
                }
            }
            None => self.source_dir.join("build").join(preset),
        }
    }
}
