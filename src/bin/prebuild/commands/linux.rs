//! `prebuild linux` command

use std::path::Path;

use anyhow::Result;

use crate::cli::LinuxArgs;
use prebuild::core::{BuildRequest, HostInfo, Target};

pub fn execute(args: LinuxArgs, root: Option<&Path>) -> Result<()> {
    let arch = match args.arch {
        Some(arch) => arch,
        None => HostInfo::detect().arch()?,
    };

    let request = BuildRequest::new(Target::Linux(arch), args.backend)?
        .with_clean(args.common.clean)
        .with_jobs(args.common.jobs);

    super::build::run(root, vec![request])
}
