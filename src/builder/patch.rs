//! Transient source patches.
//!
//! Some dependency revisions need a one-line change to their build
//! description before they configure. The change is applied just before
//! the build and reverted afterwards, on success and failure alike, so the
//! submodule never stays dirty.
//!
//! Patches assume exclusive access to the source tree: two concurrent
//! invocations against the same checkout are not supported.

use std::path::{Path, PathBuf};

use crate::core::error::{BuildError, BuildResult};
use crate::util::context::ProjectLayout;
use crate::util::fs;

/// A fixed textual substitution in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePatch {
    /// File to patch
    pub file: PathBuf,
    /// Text present in the unpatched file
    pub original: String,
    /// Text that replaces it
    pub replacement: String,
    /// Short description for logs
    pub description: String,
}

impl SourcePatch {
    /// Point the ZenDNN external project's install step at the `zendnnl`
    /// target, since the pinned revision has no `install` target.
    pub fn zendnn_install_target(layout: &ProjectLayout) -> Self {
        SourcePatch {
            file: layout
                .llama_dir()
                .join("ggml")
                .join("src")
                .join("ggml-zendnn")
                .join("CMakeLists.txt"),
            original: "INSTALL_COMMAND ${CMAKE_COMMAND} --build ${ZENDNN_BUILD_DIR} --target install"
                .to_string(),
            replacement:
                "INSTALL_COMMAND ${CMAKE_COMMAND} --build ${ZENDNN_BUILD_DIR} --target zendnnl"
                    .to_string(),
            description: "ggml-zendnn install target".to_string(),
        }
    }
}

/// Whether this manager changed the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchState {
    Unpatched,
    /// Patched by this manager; holds the exact pre-patch contents.
    Patched { pristine: String },
}

/// Applies and reverts one [`SourcePatch`].
#[derive(Debug)]
pub struct PatchManager {
    patch: SourcePatch,
    state: PatchState,
}

impl PatchManager {
    pub fn new(patch: SourcePatch) -> Self {
        PatchManager {
            patch,
            state: PatchState::Unpatched,
        }
    }

    pub fn state(&self) -> &PatchState {
        &self.state
    }

    pub fn file(&self) -> &Path {
        &self.patch.file
    }

    /// Apply the substitution.
    ///
    /// Returns `true` if the file was changed. A file that already carries
    /// the replacement is left alone (and will not be restored); a file
    /// carrying neither string belongs to an incompatible revision.
    pub fn apply(&mut self) -> BuildResult<bool> {
        if matches!(self.state, PatchState::Patched { .. }) {
            return Ok(false);
        }

        let file = &self.patch.file;
        if !file.is_file() {
            return Err(BuildError::PatchApply {
                file: file.clone(),
                reason: "file not found; is the submodule checked out?".to_string(),
            });
        }

        let text = fs::read_to_string(file)?;
        if text.contains(&self.patch.replacement) {
            tracing::debug!("{} already patched", self.patch.description);
            return Ok(false);
        }
        if !text.contains(&self.patch.original) {
            return Err(BuildError::PatchApply {
                file: file.clone(),
                reason: format!("expected `{}` not found", self.patch.original),
            });
        }

        let patched = text.replace(&self.patch.original, &self.patch.replacement);
        fs::write_atomic(file, &patched)?;
        tracing::info!("Patched {}", self.patch.description);

        self.state = PatchState::Patched { pristine: text };
        Ok(true)
    }

    /// Restore the file to its exact pre-patch contents.
    ///
    /// A no-op unless this manager applied the patch.
    pub fn restore(&mut self) -> BuildResult<()> {
        let PatchState::Patched { pristine } = &self.state else {
            return Ok(());
        };

        let file = &self.patch.file;
        let current = fs::read_to_string(file).ok();
        if current.as_deref() != Some(pristine.as_str()) {
            fs::write_atomic(file, pristine)?;
            tracing::info!("Restored {}", self.patch.description);
        }

        self.state = PatchState::Unpatched;
        Ok(())
    }
}

/// Scoped application of a set of patches.
///
/// Every patch applied through the guard is restored when the guard is
/// released or dropped, including when a later patch fails to apply.
#[derive(Debug, Default)]
pub struct PatchGuard {
    managers: Vec<PatchManager>,
}

impl PatchGuard {
    /// Apply every patch in order.
    pub fn acquire(patches: impl IntoIterator<Item = SourcePatch>) -> BuildResult<Self> {
        let mut guard = PatchGuard::default();
        for patch in patches {
            let mut manager = PatchManager::new(patch);
            manager.apply()?;
            guard.managers.push(manager);
        }
        Ok(guard)
    }

    /// Restore every patch, reporting the first failure.
    pub fn release(mut self) -> BuildResult<()> {
        self.restore_all()
    }

    fn restore_all(&mut self) -> BuildResult<()> {
        let mut first_err = None;
        for manager in self.managers.iter_mut().rev() {
            if let Err(err) = manager.restore() {
                tracing::warn!("Failed to restore {}: {}", manager.file().display(), err);
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for PatchGuard {
    fn drop(&mut self) {
        let _ = self.restore_all();
    }
}
