//! CLI definitions using clap.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use prebuild::core::platform::{AndroidAbi, AppleTarget, Arch, Backend};

/// Prebuild - reproducible native library builds for every platform
#[derive(Parser)]
#[command(name = "prebuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (defaults to the nearest directory with CMakePresets.json)
    #[arg(long, global = true, env = "PREBUILD_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List supported platform, architecture and backend combinations
    List,

    /// Build for macOS or iOS
    Apple(AppleArgs),

    /// Build for Linux
    Linux(LinuxArgs),

    /// Build for Android
    Android(AndroidArgs),

    /// Build for Windows
    Windows(WindowsArgs),

    /// Check that the toolchains and SDKs can be located
    Doctor,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Flags shared by every build command.
#[derive(Args, Debug, Clone)]
pub struct CommonBuildArgs {
    /// Delete the build directory before configuring
    #[arg(long)]
    pub clean: bool,

    /// Number of parallel build jobs
    #[arg(short, long)]
    pub jobs: Option<NonZeroUsize>,
}

#[derive(Args)]
pub struct AppleArgs {
    /// Apple target (macos-arm64, macos-x86_64, ios-device-arm64, ios-sim-arm64, ios-sim-x86_64)
    #[arg(long, value_parser = parse_apple_target)]
    pub target: AppleTarget,

    #[command(flatten)]
    pub common: CommonBuildArgs,
}

#[derive(Args)]
pub struct LinuxArgs {
    /// Target architecture (defaults to the host architecture)
    #[arg(long, value_parser = parse_arch)]
    pub arch: Option<Arch>,

    /// Backend (full, vulkan, cuda, blas, zendnn)
    #[arg(long, default_value = "full", value_parser = parse_backend)]
    pub backend: Backend,

    #[command(flatten)]
    pub common: CommonBuildArgs,
}

#[derive(Args)]
pub struct AndroidArgs {
    /// Android ABI (arm64-v8a, x86_64, or all)
    #[arg(long, default_value = "arm64-v8a", value_parser = parse_abi_selection)]
    pub abi: AbiSelection,

    /// Backend (full, vulkan, opencl)
    #[arg(long, default_value = "full", value_parser = parse_backend)]
    pub backend: Backend,

    #[command(flatten)]
    pub common: CommonBuildArgs,
}

#[derive(Args)]
pub struct WindowsArgs {
    /// Target architecture
    #[arg(long, default_value = "x64", value_parser = parse_arch)]
    pub arch: Arch,

    /// Backend (full, vulkan, cuda, blas)
    #[arg(long, default_value = "full", value_parser = parse_backend)]
    pub backend: Backend,

    /// Vulkan SDK root (overrides VULKAN_SDK)
    #[arg(long, value_name = "PATH")]
    pub vulkan_sdk: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonBuildArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// One ABI, or every ABI in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiSelection {
    One(AndroidAbi),
    All,
}

impl AbiSelection {
    pub fn abis(&self) -> Vec<AndroidAbi> {
        match self {
            AbiSelection::One(abi) => vec![*abi],
            AbiSelection::All => AndroidAbi::ALL.to_vec(),
        }
    }
}

fn parse_arch(s: &str) -> Result<Arch, String> {
    s.parse()
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse()
}

fn parse_apple_target(s: &str) -> Result<AppleTarget, String> {
    s.parse()
}

fn parse_abi_selection(s: &str) -> Result<AbiSelection, String> {
    if s == "all" {
        Ok(AbiSelection::All)
    } else {
        s.parse().map(AbiSelection::One)
    }
}
