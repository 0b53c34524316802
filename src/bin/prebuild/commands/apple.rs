//! `prebuild apple` command

use std::path::Path;

use anyhow::Result;

use crate::cli::AppleArgs;
use prebuild::core::{Backend, BuildRequest, Target};

pub fn execute(args: AppleArgs, root: Option<&Path>) -> Result<()> {
    let request = BuildRequest::new(Target::Apple(args.target), Backend::Full)?
        .with_clean(args.common.clean)
        .with_jobs(args.common.jobs);

    super::build::run(root, vec![request])
}
