//! `prebuild windows` command

use std::path::Path;

use anyhow::Result;

use crate::cli::WindowsArgs;
use prebuild::core::{BuildRequest, Overrides, Target};

pub fn execute(args: WindowsArgs, root: Option<&Path>) -> Result<()> {
    let request = BuildRequest::new(Target::Windows(args.arch), args.backend)?
        .with_clean(args.common.clean)
        .with_jobs(args.common.jobs)
        .with_overrides(Overrides {
            vulkan_sdk: args.vulkan_sdk,
        });

    super::build::run(root, vec![request])
}
