//! `prebuild android` command
//!
//! `--abi all` builds every ABI in turn; the first failure stops the run.

use std::path::Path;

use anyhow::Result;

use crate::cli::AndroidArgs;
use prebuild::core::{BuildRequest, Target};

pub fn execute(args: AndroidArgs, root: Option<&Path>) -> Result<()> {
    let requests = args
        .abi
        .abis()
        .into_iter()
        .map(|abi| {
            BuildRequest::new(Target::Android(abi), args.backend).map(|request| {
                request
                    .with_clean(args.common.clean)
                    .with_jobs(args.common.jobs)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    super::build::run(root, requests)
}
