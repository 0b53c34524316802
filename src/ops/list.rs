//! Implementation of `prebuild list`.
//!
//! The listing is generated from the same tables that validate requests,
//! so it cannot drift from what the build commands accept.

use crate::core::flags::{allowed_backends, BackendFlagSet, Capability};
use crate::core::platform::{AndroidAbi, AppleTarget, Arch, Backend, Platform};

/// One line per platform describing its targets, backends, and `full` composition.
pub fn supported_combinations() -> Vec<String> {
    Platform::ALL.iter().map(|&p| describe(p)).collect()
}

fn describe(platform: Platform) -> String {
    match platform {
        Platform::Apple => format!(
            "apple: target={} (consolidated: metal+cpu in one dylib)",
            join(AppleTarget::ALL.iter().map(|t| t.id()))
        ),
        Platform::Android => {
            let abis = AndroidAbi::ALL
                .iter()
                .map(|abi| abi.as_str())
                .chain(["all"]);
            let full = AndroidAbi::ALL
                .iter()
                .map(|&abi| {
                    let label = match abi {
                        AndroidAbi::Arm64V8a => "arm64",
                        AndroidAbi::X86_64 => "x86_64",
                    };
                    full_composition(platform, abi.arch(), label)
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "android: abi={} backend={} ({})",
                join(abis),
                backends(platform),
                full
            )
        }
        Platform::Linux | Platform::Windows => {
            let full = Arch::ALL
                .iter()
                .map(|&arch| full_composition(platform, arch, arch.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{}: arch={} backend={} ({})",
                platform,
                join(Arch::ALL.iter().map(|a| a.as_str())),
                backends(platform),
                full
            )
        }
    }
}

fn backends(platform: Platform) -> String {
    join(allowed_backends(platform).iter().map(|b| b.as_str()))
}

/// `<label> full=<caps>+cpu`
fn full_composition(platform: Platform, arch: Arch, label: &str) -> String {
    let mut parts: Vec<&str> = BackendFlagSet::derive(platform, arch, Backend::Full)
        .map(|flags| flags.enabled())
        .unwrap_or_default()
        .into_iter()
        .map(short_name)
        .collect();
    parts.push("cpu");
    format!("{} full={}", label, parts.join("+"))
}

fn short_name(capability: Capability) -> &'static str {
    match capability {
        Capability::KleidiAi => "kleidi",
        other => other.as_str(),
    }
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_lines() {
        let lines = supported_combinations();
        assert_eq!(
            lines,
            vec![
                "apple: target=macos-arm64|macos-x86_64|ios-device-arm64|ios-sim-arm64|ios-sim-x86_64 (consolidated: metal+cpu in one dylib)",
                "linux: arch=x64|arm64 backend=full|vulkan|cuda|blas|zendnn (x64 full=vulkan+cuda+blas+cpu, arm64 full=vulkan+blas+kleidi+cpu)",
                "android: abi=arm64-v8a|x86_64|all backend=full|vulkan|opencl (arm64 full=vulkan+opencl+kleidi+cpu, x86_64 full=vulkan+opencl+cpu)",
                "windows: arch=x64|arm64 backend=full|vulkan|cuda|blas (x64 full=vulkan+cuda+blas+cpu, arm64 full=vulkan+blas+kleidi+cpu)",
            ]
        );
    }
}
