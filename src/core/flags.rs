//! Backend capability flags and their CMake cache variables.
//!
//! Each platform owns a closed set of capabilities. Resolution starts with
//! every capability OFF, turns ON the ones the backend implies, then applies
//! architecture rules. The result always assigns every key of the set.

use std::fmt;

use crate::core::error::{BuildError, BuildResult};
use crate::core::platform::{Arch, Backend, Platform};

/// A compute capability that maps to exactly one cache variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// GPU vector compute (Vulkan)
    Vulkan,
    /// Alternative GPU compute (OpenCL)
    OpenCl,
    /// Vendor GPU compute (CUDA)
    Cuda,
    /// Math library (BLAS)
    Blas,
    /// Specialized kernel library (ZenDNN)
    ZenDnn,
    /// CPU kernel acceleration, arm64 only (KleidiAI)
    KleidiAi,
}

impl Capability {
    /// CMake cache variable controlling this capability.
    pub fn cache_key(&self) -> &'static str {
        match self {
            Capability::Vulkan => "GGML_VULKAN",
            Capability::OpenCl => "GGML_OPENCL",
            Capability::Cuda => "GGML_CUDA",
            Capability::Blas => "GGML_BLAS",
            Capability::ZenDnn => "GGML_ZENDNN",
            Capability::KleidiAi => "GGML_CPU_KLEIDIAI",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Vulkan => "vulkan",
            Capability::OpenCl => "opencl",
            Capability::Cuda => "cuda",
            Capability::Blas => "blas",
            Capability::ZenDnn => "zendnn",
            Capability::KleidiAi => "kleidiai",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BLAS implementation requested whenever the math library is ON.
pub const BLAS_VENDOR: &str = "OpenBLAS";

/// The closed capability set for a platform, in cache-argument order.
pub fn platform_capabilities(platform: Platform) -> &'static [Capability] {
    match platform {
        Platform::Apple => &[],
        Platform::Linux => &[
            Capability::Vulkan,
            Capability::OpenCl,
            Capability::Cuda,
            Capability::Blas,
            Capability::ZenDnn,
            Capability::KleidiAi,
        ],
        Platform::Android => &[Capability::Vulkan, Capability::OpenCl, Capability::KleidiAi],
        Platform::Windows => &[
            Capability::Vulkan,
            Capability::OpenCl,
            Capability::Cuda,
            Capability::Blas,
            Capability::KleidiAi,
        ],
    }
}

/// Backends a platform accepts.
pub fn allowed_backends(platform: Platform) -> &'static [Backend] {
    match platform {
        Platform::Apple => &[Backend::Full],
        Platform::Linux => &[
            Backend::Full,
            Backend::Vulkan,
            Backend::Cuda,
            Backend::Blas,
            Backend::ZenDnn,
        ],
        Platform::Android => &[Backend::Full, Backend::Vulkan, Backend::OpenCl],
        Platform::Windows => &[Backend::Full, Backend::Vulkan, Backend::Cuda, Backend::Blas],
    }
}

/// Capabilities only available on x64 targets.
fn x64_only(capability: Capability) -> bool {
    matches!(capability, Capability::Cuda | Capability::ZenDnn)
}

/// Capabilities a backend name implies on a platform, before architecture rules.
fn implied_by(platform: Platform, backend: Backend) -> &'static [Capability] {
    match (platform, backend) {
        (Platform::Apple, _) => &[],
        (Platform::Android, Backend::Full) => &[Capability::Vulkan, Capability::OpenCl],
        (_, Backend::Full) => &[Capability::Vulkan, Capability::Cuda, Capability::Blas],
        (_, Backend::Vulkan) => &[Capability::Vulkan],
        (_, Backend::Cuda) => &[Capability::Cuda],
        (_, Backend::Blas) => &[Capability::Blas],
        (_, Backend::OpenCl) => &[Capability::OpenCl],
        (_, Backend::ZenDnn) => &[Capability::ZenDnn],
    }
}

/// Check that a backend may be requested for a platform and architecture.
pub fn validate_backend(platform: Platform, arch: Arch, backend: Backend) -> BuildResult<()> {
    if !allowed_backends(platform).contains(&backend) {
        return Err(BuildError::configuration(format!(
            "backend `{}` is not supported on {}; expected one of: {}",
            backend,
            platform,
            allowed_backends(platform)
                .iter()
                .map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    // `full` silently drops x64-only capabilities; naming one explicitly is an error.
    if backend != Backend::Full && arch != Arch::X64 {
        if let Some(cap) = implied_by(platform, backend).iter().find(|c| x64_only(**c)) {
            return Err(BuildError::configuration(format!(
                "{} {} backend build is only available for x64 (requested {})",
                platform, cap, arch
            )));
        }
    }

    Ok(())
}

/// Resolved ON/OFF assignment for every capability of a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFlagSet {
    platform: Platform,
    flags: Vec<(Capability, bool)>,
}

impl BackendFlagSet {
    /// Derive the flag set for a (platform, architecture, backend) triple.
    pub fn derive(platform: Platform, arch: Arch, backend: Backend) -> BuildResult<Self> {
        validate_backend(platform, arch, backend)?;

        let implied = implied_by(platform, backend);
        let flags = platform_capabilities(platform)
            .iter()
            .map(|&cap| {
                let on = match cap {
                    Capability::KleidiAi => arch == Arch::Arm64,
                    _ if x64_only(cap) && arch != Arch::X64 => false,
                    _ => implied.contains(&cap),
                };
                (cap, on)
            })
            .collect();

        Ok(BackendFlagSet { platform, flags })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Whether a capability is ON. Capabilities outside the platform set are OFF.
    pub fn is_on(&self, capability: Capability) -> bool {
        self.flags
            .iter()
            .any(|(cap, on)| *cap == capability && *on)
    }

    /// Every capability of the platform with its value, in argument order.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.flags.iter().copied()
    }

    /// Capabilities that are ON.
    pub fn enabled(&self) -> Vec<Capability> {
        self.iter().filter(|(_, on)| *on).map(|(cap, _)| cap).collect()
    }

    /// Cache variables as `(key, value)` pairs.
    pub fn cache_vars(&self) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = self
            .iter()
            .map(|(cap, on)| {
                let value = if on { "ON" } else { "OFF" };
                (cap.cache_key().to_string(), value.to_string())
            })
            .collect();

        if self.is_on(Capability::Blas) {
            vars.push(("GGML_BLAS_VENDOR".to_string(), BLAS_VENDOR.to_string()));
        }

        vars
    }

    /// Cache variables as `-DKEY=VALUE` arguments.
    pub fn cache_args(&self) -> Vec<String> {
        cache_args(&self.cache_vars())
    }
}

/// Format cache variables as `-DKEY=VALUE` arguments.
pub fn cache_args(vars: &[(String, String)]) -> Vec<String> {
    vars.iter()
        .map(|(key, value)| format!("-D{}={}", key, value))
        .collect()
}
