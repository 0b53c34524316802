//! `prebuild doctor` command

use std::path::Path;

use anyhow::Result;

use prebuild::core::HostInfo;
use prebuild::ops::{doctor, format_report};
use prebuild::toolchain::RealSystem;
use prebuild::util::config::{global_config_path, load_config, Config};
use prebuild::util::ProjectLayout;

pub fn execute(root: Option<&Path>, verbose: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;

    // A missing project is reported, not fatal
    let layout = ProjectLayout::discover(root, &cwd).ok();
    let config = match &layout {
        Some(layout) => load_config(global_config_path().as_deref(), &layout.config_path()),
        None => global_config_path()
            .map(|path| Config::load_or_default(&path))
            .unwrap_or_default(),
    };

    let report = doctor(layout.as_ref(), &config, &HostInfo::detect(), &RealSystem);

    // Print the formatted report
    print!("{}", format_report(&report, verbose));

    // Exit with error code if required checks failed
    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}
