//! Platform, architecture, and backend identifiers.
//!
//! These are the closed vocabularies every build request is expressed in.
//! Parsing accepts the aliases the command line has always accepted
//! (`x64`/`x86_64`, `arm64`/`aarch64`) and normalizes them.

use std::fmt;
use std::str::FromStr;

use crate::core::error::BuildError;

/// Target operating-system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Apple,
    Linux,
    Android,
    Windows,
}

impl Platform {
    /// All platforms in listing order.
    pub const ALL: [Platform; 4] = [
        Platform::Apple,
        Platform::Linux,
        Platform::Android,
        Platform::Windows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Apple => "apple",
            Platform::Linux => "linux",
            Platform::Android => "android",
            Platform::Windows => "windows",
        }
    }

    /// File extension of a runtime shared library on this platform.
    pub fn shared_library_extension(&self) -> &'static str {
        match self {
            Platform::Apple => "dylib",
            Platform::Linux | Platform::Android => "so",
            Platform::Windows => "dll",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    pub const ALL: [Arch; 2] = [Arch::X64, Arch::Arm64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }

    /// Processor name as CMake spells it in `CMAKE_SYSTEM_PROCESSOR`.
    pub fn cmake_processor(&self) -> &'static str {
        match self {
            Arch::X64 => "x86_64",
            Arch::Arm64 => "aarch64",
        }
    }

    /// GNU triple prefix of the Linux cross toolchain for this architecture.
    pub fn gnu_linux_triple(&self) -> &'static str {
        match self {
            Arch::X64 => "x86_64-linux-gnu",
            Arch::Arm64 => "aarch64-linux-gnu",
        }
    }

    /// Map a machine name (`uname -m`, `std::env::consts::ARCH`) to an architecture.
    pub fn from_machine(machine: &str) -> Option<Arch> {
        match machine.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Some(Arch::X64),
            "aarch64" | "arm64" => Some(Arch::Arm64),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arch::from_machine(s)
            .ok_or_else(|| format!("invalid architecture '{}'; expected 'x64' or 'arm64'", s))
    }
}

/// A named bundle of compute capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    /// Every accelerator the platform/architecture pair supports
    Full,
    /// Vulkan GPU compute
    Vulkan,
    /// NVIDIA CUDA (x64 only)
    Cuda,
    /// OpenBLAS math library
    Blas,
    /// OpenCL GPU compute (mobile)
    OpenCl,
    /// AMD ZenDNN kernel library (Linux x64 only)
    ZenDnn,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Full => "full",
            Backend::Vulkan => "vulkan",
            Backend::Cuda => "cuda",
            Backend::Blas => "blas",
            Backend::OpenCl => "opencl",
            Backend::ZenDnn => "zendnn",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Backend::Full),
            "vulkan" => Ok(Backend::Vulkan),
            "cuda" => Ok(Backend::Cuda),
            "blas" => Ok(Backend::Blas),
            "opencl" => Ok(Backend::OpenCl),
            "zendnn" => Ok(Backend::ZenDnn),
            _ => Err(format!(
                "invalid backend '{}'; expected one of: full, vulkan, cuda, blas, opencl, zendnn",
                s
            )),
        }
    }
}

/// Apple build targets. Each maps to its own preset and output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppleTarget {
    MacosArm64,
    MacosX86_64,
    IosDeviceArm64,
    IosSimArm64,
    IosSimX86_64,
}

impl AppleTarget {
    pub const ALL: [AppleTarget; 5] = [
        AppleTarget::MacosArm64,
        AppleTarget::MacosX86_64,
        AppleTarget::IosDeviceArm64,
        AppleTarget::IosSimArm64,
        AppleTarget::IosSimX86_64,
    ];

    /// Canonical target id, also the preset prefix.
    pub fn id(&self) -> &'static str {
        match self {
            AppleTarget::MacosArm64 => "macos-arm64",
            AppleTarget::MacosX86_64 => "macos-x86_64",
            AppleTarget::IosDeviceArm64 => "ios-device-arm64",
            AppleTarget::IosSimArm64 => "ios-sim-arm64",
            AppleTarget::IosSimX86_64 => "ios-sim-x86_64",
        }
    }

    pub fn arch(&self) -> Arch {
        match self {
            AppleTarget::MacosX86_64 | AppleTarget::IosSimX86_64 => Arch::X64,
            _ => Arch::Arm64,
        }
    }

    /// Output directory relative to the `bin/` root.
    pub fn output_subdir(&self) -> &'static str {
        match self {
            AppleTarget::MacosArm64 => "macos/arm64",
            AppleTarget::MacosX86_64 => "macos/x86_64",
            AppleTarget::IosDeviceArm64 => "ios/arm64",
            AppleTarget::IosSimArm64 => "ios/arm64-sim",
            AppleTarget::IosSimX86_64 => "ios/x86_64-sim",
        }
    }
}

impl FromStr for AppleTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "macos-arm64" => Ok(AppleTarget::MacosArm64),
            "macos-x86_64" | "macos-x64" => Ok(AppleTarget::MacosX86_64),
            "ios-device-arm64" => Ok(AppleTarget::IosDeviceArm64),
            "ios-sim-arm64" => Ok(AppleTarget::IosSimArm64),
            "ios-sim-x86_64" | "ios-sim-x64" => Ok(AppleTarget::IosSimX86_64),
            _ => Err(format!(
                "invalid apple target '{}'; expected one of: {}",
                s,
                AppleTarget::ALL.map(|t| t.id()).join(", ")
            )),
        }
    }
}

/// Android ABIs the prebuilt libraries ship for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AndroidAbi {
    Arm64V8a,
    X86_64,
}

impl AndroidAbi {
    /// Build order when `all` is requested.
    pub const ALL: [AndroidAbi; 2] = [AndroidAbi::Arm64V8a, AndroidAbi::X86_64];

    pub fn as_str(&self) -> &'static str {
        match self {
            AndroidAbi::Arm64V8a => "arm64-v8a",
            AndroidAbi::X86_64 => "x86_64",
        }
    }

    pub fn arch(&self) -> Arch {
        match self {
            AndroidAbi::Arm64V8a => Arch::Arm64,
            AndroidAbi::X86_64 => Arch::X64,
        }
    }

    /// Directory component the NDK sysroot uses for this ABI.
    pub fn ndk_triple(&self) -> &'static str {
        match self {
            AndroidAbi::Arm64V8a => "aarch64-linux-android",
            AndroidAbi::X86_64 => "x86_64-linux-android",
        }
    }

    /// Suffix for per-ABI environment overrides (`arm64-v8a` -> `ARM64_V8A`).
    pub fn env_suffix(&self) -> String {
        self.as_str().to_ascii_uppercase().replace('-', "_")
    }
}

impl fmt::Display for AndroidAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AndroidAbi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arm64-v8a" | "arm64" => Ok(AndroidAbi::Arm64V8a),
            "x86_64" | "x64" => Ok(AndroidAbi::X86_64),
            _ => Err(format!(
                "invalid android ABI '{}'; expected 'arm64-v8a', 'arm64', 'x86_64' or 'x64'",
                s
            )),
        }
    }
}

/// A fully specified build target: platform plus the platform's own target id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Apple(AppleTarget),
    Linux(Arch),
    Android(AndroidAbi),
    Windows(Arch),
}

impl Target {
    pub fn platform(&self) -> Platform {
        match self {
            Target::Apple(_) => Platform::Apple,
            Target::Linux(_) => Platform::Linux,
            Target::Android(_) => Platform::Android,
            Target::Windows(_) => Platform::Windows,
        }
    }

    pub fn arch(&self) -> Arch {
        match self {
            Target::Apple(t) => t.arch(),
            Target::Android(abi) => abi.arch(),
            Target::Linux(arch) | Target::Windows(arch) => *arch,
        }
    }

    /// Name of the configure preset in `CMakePresets.json`.
    pub fn preset_name(&self) -> String {
        match self {
            Target::Apple(t) => format!("{}-full", t.id()),
            Target::Linux(arch) => format!("linux-{}-full", arch),
            Target::Android(abi) => format!("android-{}-full", abi),
            Target::Windows(arch) => format!("windows-{}-full", arch),
        }
    }

    /// Output directory relative to the `bin/` root.
    pub fn output_subdir(&self) -> String {
        match self {
            Target::Apple(t) => t.output_subdir().to_string(),
            Target::Linux(arch) => format!("linux/{}", arch),
            Target::Android(abi) => format!("android/{}", abi.arch()),
            Target::Windows(arch) => format!("windows/{}", arch),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Apple(t) => write!(f, "apple/{}", t.id()),
            Target::Linux(arch) => write!(f, "linux/{}", arch),
            Target::Android(abi) => write!(f, "android/{}", abi),
            Target::Windows(arch) => write!(f, "windows/{}", arch),
        }
    }
}

/// Host operating system as far as build rules care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    Macos,
    Linux,
    Windows,
    Other(String),
}

/// The machine the build runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub os: HostOs,
    /// Raw machine name, e.g. `x86_64`
    pub machine: String,
}

impl HostInfo {
    pub fn new(os: HostOs, machine: impl Into<String>) -> Self {
        HostInfo {
            os,
            machine: machine.into(),
        }
    }

    /// Detect the current host.
    pub fn detect() -> Self {
        let os = match std::env::consts::OS {
            "macos" => HostOs::Macos,
            "linux" => HostOs::Linux,
            "windows" => HostOs::Windows,
            other => HostOs::Other(other.to_string()),
        };
        HostInfo::new(os, std::env::consts::ARCH)
    }

    /// Host architecture, or a host mismatch error for unsupported machines.
    pub fn arch(&self) -> Result<Arch, BuildError> {
        Arch::from_machine(&self.machine).ok_or_else(|| BuildError::HostMismatch {
            message: format!(
                "unsupported host architecture '{}'; expected x86_64 or aarch64",
                self.machine
            ),
        })
    }

    /// Value CMake reports as `CMAKE_SYSTEM_NAME` for this host.
    pub fn cmake_system_name(&self) -> &str {
        match &self.os {
            HostOs::Macos => "Darwin",
            HostOs::Linux => "Linux",
            HostOs::Windows => "Windows",
            HostOs::Other(name) => name,
        }
    }
}
