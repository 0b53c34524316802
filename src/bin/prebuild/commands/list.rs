//! `prebuild list` command

use anyhow::Result;

use prebuild::ops::supported_combinations;

pub fn execute() -> Result<()> {
    for line in supported_combinations() {
        println!("{}", line);
    }
    Ok(())
}
