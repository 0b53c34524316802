//! Shared plumbing for the platform build commands.

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::Result;

use prebuild::core::{BuildRequest, HostInfo, Overrides};
use prebuild::toolchain::RealSystem;
use prebuild::util::config::{global_config_path, load_config, Config};
use prebuild::util::process::SystemRunner;
use prebuild::util::ProjectLayout;
use prebuild::BuildSession;

/// Build already-validated requests against the discovered project.
pub fn run(root: Option<&Path>, requests: Vec<BuildRequest>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let layout = ProjectLayout::discover(root, &cwd)?;

    // Load configuration (global + project)
    let config = load_config(global_config_path().as_deref(), &layout.config_path());

    let requests: Vec<BuildRequest> = requests
        .into_iter()
        .map(|request| apply_config(request, &config))
        .collect();

    let session = BuildSession::new(
        &layout,
        &config,
        HostInfo::detect(),
        &RealSystem,
        &SystemRunner,
    )?;

    for outcome in session.run(&requests)? {
        eprintln!(
            "    Finished `{}` -> {} ({} libraries)",
            outcome.target,
            outcome.output_dir.display(),
            outcome.artifacts.len()
        );
    }

    Ok(())
}

/// Fill values the command line left unset from the config file.
fn apply_config(request: BuildRequest, config: &Config) -> BuildRequest {
    // Jobs: CLI > config > None (tool default)
    let jobs = request
        .jobs()
        .or_else(|| config.build.jobs.and_then(NonZeroUsize::new));

    let vulkan_sdk = request
        .overrides()
        .vulkan_sdk
        .clone()
        .or_else(|| config.windows.vulkan_sdk.clone());

    request
        .with_jobs(jobs)
        .with_overrides(Overrides { vulkan_sdk })
}
