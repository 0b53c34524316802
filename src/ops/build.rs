//! Implementation of the platform build commands.
//!
//! Each request runs the same fixed pipeline: host check, source check,
//! toolchain discovery, configuration, a patched configure-and-build, and
//! artifact collection. Requests run one at a time and the first failure
//! stops the run.

use std::path::PathBuf;

use crate::builder::{
    builder_for, ArtifactCollector, BuildContext, BuildDriver, PatchGuard, Presets,
    RuntimeArtifact,
};
use crate::core::error::BuildResult;
use crate::core::platform::{HostInfo, Target};
use crate::core::request::BuildRequest;
use crate::toolchain::compilers::cmake_chain;
use crate::toolchain::SystemView;
use crate::util::config::Config;
use crate::util::context::ProjectLayout;
use crate::util::fs;
use crate::util::process::CommandRunner;

/// What one successful request produced.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub target: Target,
    /// Build tree the artifacts came from
    pub build_dir: PathBuf,
    /// Packaged library directory
    pub output_dir: PathBuf,
    pub artifacts: Vec<RuntimeArtifact>,
}

/// Shared state for every request of one invocation.
///
/// The presets file is read once when the session starts.
pub struct BuildSession<'a> {
    layout: &'a ProjectLayout,
    config: &'a Config,
    host: HostInfo,
    sys: &'a dyn SystemView,
    runner: &'a dyn CommandRunner,
    presets: Presets,
}

impl<'a> BuildSession<'a> {
    pub fn new(
        layout: &'a ProjectLayout,
        config: &'a Config,
        host: HostInfo,
        sys: &'a dyn SystemView,
        runner: &'a dyn CommandRunner,
    ) -> BuildResult<Self> {
        let presets = Presets::load(&layout.presets_path(), layout.root())?;
        Ok(BuildSession {
            layout,
            config,
            host,
            sys,
            runner,
            presets,
        })
    }

    /// Build every request in order, stopping at the first failure.
    pub fn run(&self, requests: &[BuildRequest]) -> BuildResult<Vec<BuildOutcome>> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            outcomes.push(self.build(request)?);
        }
        Ok(outcomes)
    }

    /// Build and package one request.
    pub fn build(&self, request: &BuildRequest) -> BuildResult<BuildOutcome> {
        let builder = builder_for(request.platform());
        builder.check_host(request, &self.host)?;
        self.layout.verify_sources()?;

        let cmake = cmake_chain(self.config.tools.cmake.as_deref()).resolve(self.sys)?;
        let driver = BuildDriver::new(self.runner, cmake, self.layout.root());
        let ctx = BuildContext {
            layout: self.layout,
            presets: &self.presets,
            host: &self.host,
            sys: self.sys,
            driver: &driver,
            ccache_dir: self.ccache_dir(),
        };

        let build_dir = ctx.build_dir(request);
        if request.clean() {
            tracing::info!(
                "Removing {}",
                fs::relative_path(self.layout.root(), &build_dir).display()
            );
            fs::remove_dir_all_if_exists(&build_dir)?;
        }

        let paths = builder.locate(request, &ctx)?;
        let config = builder.resolve(request, &paths, &ctx)?;

        // Patches are restored when the guard drops, so a failed build
        // leaves the sources as they were.
        let guard = PatchGuard::acquire(config.source_patches().iter().cloned())?;
        let built = driver.configure_and_build(&config, request.jobs())?;
        guard.release()?;

        let artifacts = ArtifactCollector::for_platform(request.platform())
            .with_prefixes(&self.config.artifacts.prefixes)
            .collect_into(&built, config.output_dir(), self.layout.root())?;

        Ok(BuildOutcome {
            target: request.target(),
            build_dir: built,
            output_dir: config.output_dir().to_path_buf(),
            artifacts,
        })
    }

    fn ccache_dir(&self) -> PathBuf {
        match &self.config.build.ccache_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.layout.root().join(dir),
            None => self.layout.ccache_dir(),
        }
    }
}
