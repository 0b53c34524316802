//! Build requests.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::core::error::BuildResult;
use crate::core::flags::validate_backend;
use crate::core::platform::{Arch, Backend, Platform, Target};

/// Platform-specific values supplied explicitly by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Explicit Vulkan SDK root (Windows)
    pub vulkan_sdk: Option<PathBuf>,
}

/// One declarative build: what to build, with which backend, and how.
///
/// Construction validates the backend against the target, so an existing
/// request is always a supported combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    target: Target,
    backend: Backend,
    clean: bool,
    jobs: Option<NonZeroUsize>,
    overrides: Overrides,
}

impl BuildRequest {
    /// Create a validated request.
    pub fn new(target: Target, backend: Backend) -> BuildResult<Self> {
        validate_backend(target.platform(), target.arch(), backend)?;
        Ok(BuildRequest {
            target,
            backend,
            clean: false,
            jobs: None,
            overrides: Overrides::default(),
        })
    }

    /// Delete the preset build directory before configuring.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Parallel job hint forwarded to the build step.
    pub fn with_jobs(mut self, jobs: Option<NonZeroUsize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn platform(&self) -> Platform {
        self.target.platform()
    }

    pub fn arch(&self) -> Arch {
        self.target.arch()
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn clean(&self) -> bool {
        self.clean
    }

    pub fn jobs(&self) -> Option<NonZeroUsize> {
        self.jobs
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }
}
