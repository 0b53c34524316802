//! Drives CMake through configure and build.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::builder::config::ResolvedConfiguration;
use crate::core::error::{BuildError, BuildResult};
use crate::util::fs;
use crate::util::process::{CommandRunner, ToolCommand};

/// Runs the external build tool.
///
/// Every command runs from the project root with the configuration's
/// environment overlay. A non-zero exit is fatal; nothing is retried.
pub struct BuildDriver<'a> {
    runner: &'a dyn CommandRunner,
    cmake: PathBuf,
    root: PathBuf,
}

impl<'a> BuildDriver<'a> {
    pub fn new(runner: &'a dyn CommandRunner, cmake: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        BuildDriver {
            runner,
            cmake: cmake.into(),
            root: root.into(),
        }
    }

    pub fn cmake(&self) -> &Path {
        &self.cmake
    }

    /// Configure then build a preset, returning the build directory.
    ///
    /// Generated files are written first. The job hint only reaches the
    /// build step.
    pub fn configure_and_build(
        &self,
        config: &ResolvedConfiguration,
        jobs: Option<NonZeroUsize>,
    ) -> BuildResult<PathBuf> {
        for generated in config.generated_files() {
            fs::write_string(&generated.path, &generated.contents)?;
            tracing::debug!("Wrote {}", generated.path.display());
        }

        let configure = self
            .cmake_command(config.env())
            .arg("--preset")
            .arg(config.preset())
            .args(config.configure_args());
        self.run(&configure)?;

        let build = self
            .cmake_command(config.env())
            .args(["--build", "--preset", config.preset()])
            .args(parallel_args(jobs));
        self.run(&build)?;

        Ok(config.build_dir().to_path_buf())
    }

    /// Configure and build a standalone CMake project in Release mode.
    pub fn build_project(
        &self,
        source_dir: &Path,
        build_dir: &Path,
        configure_args: &[String],
        env: &[(String, String)],
        jobs: Option<NonZeroUsize>,
    ) -> BuildResult<()> {
        fs::ensure_dir(build_dir)?;

        let configure = self
            .cmake_command(env)
            .arg("-S")
            .arg(source_dir)
            .arg("-B")
            .arg(build_dir)
            .args(configure_args);
        self.run(&configure)?;

        let build = self
            .cmake_command(env)
            .arg("--build")
            .arg(build_dir)
            .args(["--config", "Release"])
            .args(parallel_args(jobs));
        self.run(&build)
    }

    fn cmake_command(&self, env: &[(String, String)]) -> ToolCommand {
        ToolCommand::new(&self.cmake).current_dir(&self.root).envs(env)
    }

    fn run(&self, cmd: &ToolCommand) -> BuildResult<()> {
        tracing::info!("+ {}", cmd.display_command());
        let status = self.runner.run(cmd)?;
        if status.success {
            Ok(())
        } else {
            Err(BuildError::BuildTool {
                command: cmd.display_command(),
                code: status.code,
            })
        }
    }
}

fn parallel_args(jobs: Option<NonZeroUsize>) -> Vec<String> {
    match jobs {
        Some(jobs) => vec!["--parallel".to_string(), jobs.to_string()],
        None => Vec::new(),
    }
}
