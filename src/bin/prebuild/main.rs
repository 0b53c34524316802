//! Prebuild CLI - reproducible native library builds driven through CMake presets

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use prebuild::util::diagnostic::emit;
use prebuild::BuildError;

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<BuildError>() {
            Some(err) => {
                emit(&err.to_diagnostic());
                std::process::exit(err.exit_code());
            }
            None => {
                eprintln!("error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("prebuild=debug")
    } else {
        EnvFilter::new("prebuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let root = cli.root.as_deref();

    // Execute command
    match cli.command {
        Commands::List => commands::list::execute(),
        Commands::Apple(args) => commands::apple::execute(args, root),
        Commands::Linux(args) => commands::linux::execute(args, root),
        Commands::Android(args) => commands::android::execute(args, root),
        Commands::Windows(args) => commands::windows::execute(args, root),
        Commands::Doctor => commands::doctor::execute(root, cli.verbose),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
