//! Error taxonomy for a build invocation.
//!
//! Every variant is fatal to the invocation. Each one converts into a
//! [`Diagnostic`] that states the cause and what the operator can supply
//! to fix it.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Convenience alias used across the library.
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// A fatal build error.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    /// Backend/architecture/platform combination is not supported.
    #[error("{message}")]
    #[diagnostic(code(prebuild::config::unsupported))]
    Configuration { message: String },

    /// A discovery chain ran out of sources.
    #[error("could not find {dependency}")]
    #[diagnostic(code(prebuild::toolchain::not_found))]
    DependencyNotFound {
        dependency: String,
        /// Every source that was tried, in order
        tried: Vec<String>,
        /// How to supply the missing value explicitly
        help: Vec<String>,
    },

    /// The dependency revision does not match the known source patch.
    #[error("could not apply source patch to {}: {reason}", file.display())]
    #[diagnostic(code(prebuild::patch::incompatible))]
    PatchApply { file: PathBuf, reason: String },

    /// The external build tool exited unsuccessfully.
    #[error("command failed with exit code {}: {command}", display_code(*code))]
    #[diagnostic(code(prebuild::build::tool_failed))]
    BuildTool { command: String, code: Option<i32> },

    /// Collection found nothing to package.
    #[error("no runtime libraries found under {}", dir.display())]
    #[diagnostic(code(prebuild::collect::empty))]
    NoArtifactsFound { dir: PathBuf },

    /// Build invoked on a host that cannot produce the target.
    #[error("{message}")]
    #[diagnostic(code(prebuild::host::mismatch))]
    HostMismatch { message: String },

    /// `CMakePresets.json` is missing or malformed.
    #[error("failed to read {}: {message}", path.display())]
    #[diagnostic(code(prebuild::presets::invalid))]
    Presets { path: PathBuf, message: String },

    #[error(transparent)]
    #[diagnostic(code(prebuild::io))]
    Other(#[from] anyhow::Error),
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

impl BuildError {
    /// Shorthand for a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        BuildError::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a host mismatch error.
    pub fn host_mismatch(message: impl Into<String>) -> Self {
        BuildError::HostMismatch {
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// Tool failures forward the tool's own code so wrappers see it unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::BuildTool {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::Configuration { message } => Diagnostic::error(message.clone())
                .hint(suggestions::LIST_COMBINATIONS),

            BuildError::DependencyNotFound {
                dependency,
                tried,
                help,
            } => {
                let mut diag = Diagnostic::error(format!("could not find {}", dependency));
                for source in tried {
                    diag = diag.note(format!("tried {}", source));
                }
                for hint in help {
                    diag = diag.hint(hint.clone());
                }
                diag
            }

            BuildError::PatchApply { file, reason } => {
                Diagnostic::error(format!("could not apply source patch: {}", reason))
                    .at(file)
                    .hint(suggestions::SYNC_SUBMODULES)
            }

            BuildError::BuildTool { command, code } => Diagnostic::error(format!(
                "command failed with exit code {}",
                display_code(*code)
            ))
            .note(command.clone())
            .hint(suggestions::BUILD_FAILED),

            BuildError::NoArtifactsFound { dir } => {
                Diagnostic::error("no runtime libraries found")
                    .at(dir)
                    .hint(suggestions::CLEAN_REBUILD)
            }

            BuildError::HostMismatch { message } => Diagnostic::error(message.clone()),

            BuildError::Presets { path, message } => {
                Diagnostic::error(format!("invalid presets file: {}", message))
                    .at(path)
            }

            BuildError::Other(err) => Diagnostic::error(format!("{:#}", err)),
        }
    }
}
