//! Toolchain health checks.
//!
//! The `doctor` command runs every discovery chain in report mode and
//! shows where each dependency was found, or every place that was tried.
//! Nothing is built or written; in particular the OpenCL loader fallback
//! is never attempted.
//!
//! ## Usage
//!
//! ```bash
//! prebuild doctor           # One line per dependency
//! prebuild doctor --verbose # Also show the host and project
//! ```

use std::path::{Path, PathBuf};

use crate::core::platform::{AndroidAbi, Arch, HostInfo, HostOs};
use crate::toolchain::compilers::{cmake_chain, cross_compiler_chain, host_make_program, nvcc_chain};
use crate::toolchain::{ndk, opencl, vcpkg, vulkan, DiscoveryChain, SystemView};
use crate::util::config::Config;
use crate::util::context::ProjectLayout;

/// Where a dependency was found, or why it was not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Found { path: PathBuf, detail: String },
    Missing(String),
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub outcome: CheckOutcome,
    /// Required checks gate the exit status
    pub required: bool,
}

impl CheckResult {
    pub fn found(name: impl Into<String>, path: PathBuf, detail: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            outcome: CheckOutcome::Found {
                path,
                detail: detail.into(),
            },
            required: true,
        }
    }

    pub fn missing(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            outcome: CheckOutcome::Missing(reason.into()),
            required: true,
        }
    }

    pub fn optional(self) -> Self {
        CheckResult {
            required: false,
            ..self
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Found { .. })
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.outcome {
            CheckOutcome::Found { path, .. } => Some(path),
            CheckOutcome::Missing(_) => None,
        }
    }

    /// Text after the check name in the report.
    pub fn message(&self) -> String {
        match &self.outcome {
            CheckOutcome::Found { path, detail } if detail.is_empty() => {
                path.display().to_string()
            }
            CheckOutcome::Found { path, detail } => format!("{} ({})", path.display(), detail),
            CheckOutcome::Missing(reason) => reason.clone(),
        }
    }
}

/// Every check, plus host and project facts for verbose output.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub environment: Vec<(String, String)>,
}

/// Pass/fail counts of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub required_failed: usize,
}

impl DoctorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    pub fn all_required_passed(&self) -> bool {
        self.tally().required_failed == 0
    }

    pub fn tally(&self) -> Tally {
        self.checks.iter().fold(Tally::default(), |mut tally, check| {
            if check.passed() {
                tally.passed += 1;
            } else {
                tally.failed += 1;
                if check.required {
                    tally.required_failed += 1;
                }
            }
            tally
        })
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Run every check against a host view.
///
/// Project-relative checks are skipped when no project was found.
pub fn doctor(
    layout: Option<&ProjectLayout>,
    config: &Config,
    host: &HostInfo,
    sys: &dyn SystemView,
) -> DoctorReport {
    let mut report = DoctorReport::new();
    report
        .environment
        .push(("host".to_string(), format!("{} ({})", host.cmake_system_name(), host.machine)));

    report.add(check_chain(
        "cmake",
        &cmake_chain(config.tools.cmake.as_deref()),
        sys,
        PathBuf::clone,
    ));
    report.add(match host_make_program(sys) {
        Some(path) => CheckResult::found("ninja/make", path, ""),
        None => CheckResult::missing("ninja/make", "not found on PATH"),
    }
    .optional());

    match layout {
        Some(layout) => {
            report
                .environment
                .push(("project".to_string(), layout.root().display().to_string()));
            let sources = layout.llama_dir().join("CMakeLists.txt");
            report.add(if sys.is_file(&sources) {
                CheckResult::found("llama.cpp sources", sources, "")
            } else {
                CheckResult::missing(
                    "llama.cpp sources",
                    format!("missing {}", sources.display()),
                )
            });
        }
        None => report.add(
            CheckResult::missing("project", "no CMakePresets.json in this directory or its parents")
                .optional(),
        ),
    }

    if host.os == HostOs::Linux {
        if let Ok(host_arch) = host.arch() {
            for arch in Arch::ALL.into_iter().filter(|a| *a != host_arch) {
                let chain = cross_compiler_chain(arch);
                report.add(
                    check_chain(chain.dependency().to_string(), &chain, sys, |c| c.cc.clone())
                        .optional(),
                );
            }
        }
    }

    report.add(check_chain("CUDA compiler", &nvcc_chain(), sys, PathBuf::clone).optional());
    report.add(
        check_chain(
            "Vulkan SDK",
            &vulkan::sdk_chain(config.windows.vulkan_sdk.as_deref()),
            sys,
            PathBuf::clone,
        )
        .optional(),
    );
    report.add(check_chain("vcpkg", &vcpkg::root_chain(), sys, PathBuf::clone).optional());

    add_android_checks(&mut report, layout, sys);
    report
}

fn add_android_checks(report: &mut DoctorReport, layout: Option<&ProjectLayout>, sys: &dyn SystemView) {
    let ndk_chain = ndk::ndk_chain();
    let ndk_check = check_chain("Android NDK", &ndk_chain, sys, PathBuf::clone).optional();
    let ndk_root = ndk_check.path().map(Path::to_path_buf);
    report.add(ndk_check);

    if let Some(layout) = layout {
        report.add(
            match vulkan::vendored_headers(sys, &layout.vulkan_headers_dir()) {
                Ok(include) => CheckResult::found("Vulkan headers", include, ""),
                Err(err) => CheckResult::missing("Vulkan headers", err.to_string()),
            }
            .optional(),
        );
        report.add(
            check_chain(
                "OpenCL headers",
                &opencl::include_chain(layout),
                sys,
                PathBuf::clone,
            )
            .optional(),
        );
    }

    let Some(ndk_root) = ndk_root else {
        return;
    };
    for abi in AndroidAbi::ALL {
        report.add(
            check_chain(
                format!("libvulkan.so ({})", abi),
                &vulkan::android_library_chain(&ndk_root, abi),
                sys,
                PathBuf::clone,
            )
            .optional(),
        );
        if let Some(layout) = layout {
            report.add(
                check_chain(
                    format!("OpenCL library ({})", abi),
                    &opencl::library_chain(layout, &ndk_root, abi),
                    sys,
                    PathBuf::clone,
                )
                .optional(),
            );
        }
    }
}

/// Run a chain without failing: report the hit or the sources tried.
fn check_chain<T>(
    name: impl Into<String>,
    chain: &DiscoveryChain<'_, T>,
    sys: &dyn SystemView,
    path_of: impl Fn(&T) -> PathBuf,
) -> CheckResult {
    let name = name.into();
    match chain.find(sys) {
        Ok(Some(found)) => {
            CheckResult::found(name, path_of(&found.value), format!("via {}", found.source))
        }
        Ok(None) => CheckResult::missing(
            name,
            format!("not found; tried {}", chain.sources().join(", ")),
        ),
        Err(err) => CheckResult::missing(name, err.to_string()),
    }
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    let mut lines = vec!["Prebuild Doctor".to_string(), "===============".to_string(), String::new()];

    if verbose {
        lines.push("Environment:".to_string());
        for (key, value) in &report.environment {
            lines.push(format!("  {}: {}", key, value));
        }
        lines.push(String::new());
    }

    lines.push("Checks:".to_string());
    for check in &report.checks {
        let status = if check.passed() { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };
        lines.push(format!(
            "  {} {}{}: {}",
            status,
            check.name,
            required,
            check.message()
        ));
    }
    lines.push(String::new());

    let tally = report.tally();
    lines.push(format!(
        "Summary: {} passed, {} failed",
        tally.passed, tally.failed
    ));
    lines.push(match tally {
        Tally {
            required_failed: 0,
            failed: 0,
            ..
        } => "All checks passed.".to_string(),
        Tally {
            required_failed: 0,
            failed,
            ..
        } => format!("Optional checks missing: {}. Builds needing them will fail.", failed),
        Tally {
            required_failed, ..
        } => format!("{} required check(s) failed; builds will not run.", required_failed),
    });

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockSystem;

    fn linux_host() -> HostInfo {
        HostInfo::new(HostOs::Linux, "x86_64")
    }

    #[test]
    fn test_optional_failures_do_not_gate() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::found("cmake", PathBuf::from("/usr/bin/cmake"), ""));
        report.add(CheckResult::missing("vcpkg", "not found").optional());

        assert!(report.all_required_passed());
        assert_eq!(
            report.tally(),
            Tally {
                passed: 1,
                failed: 1,
                required_failed: 0
            }
        );
    }

    #[test]
    fn test_missing_cmake_fails_required() {
        let sys = MockSystem::new();
        let report = doctor(None, &Config::default(), &linux_host(), &sys);

        assert!(!report.all_required_passed());
        let cmake = report.check("cmake").unwrap();
        assert!(cmake.required);
        assert_eq!(cmake.message(), "not found; tried config tools.cmake, cmake on PATH");
    }

    #[test]
    fn test_found_dependencies_show_source() {
        let sys = MockSystem::new()
            .with_program("cmake", "/usr/bin/cmake")
            .with_env("ANDROID_NDK_HOME", "/opt/ndk")
            .with_dir("/opt/ndk")
            .with_file("/opt/ndk/sysroot/usr/lib/x86_64-linux-android/28/libvulkan.so");
        let report = doctor(None, &Config::default(), &linux_host(), &sys);

        assert!(report.all_required_passed());
        assert_eq!(
            report.check("Android NDK").unwrap().message(),
            "/opt/ndk (via env ANDROID_NDK_HOME)"
        );
        assert!(report.check("libvulkan.so (x86_64)").unwrap().passed());
        assert!(!report.check("libvulkan.so (arm64-v8a)").unwrap().passed());
        assert!(report.check("aarch64-linux-gnu cross compilers").is_some());
    }

    #[test]
    fn test_report_never_builds_loader() {
        let layout = ProjectLayout::new("/repo");
        let sys = MockSystem::new()
            .with_program("cmake", "/usr/bin/cmake")
            .with_env("ANDROID_NDK_HOME", "/opt/ndk")
            .with_dir("/opt/ndk")
            .with_file("/repo/third_party/llama.cpp/CMakeLists.txt")
            .with_file("/repo/third_party/OpenCL-ICD-Loader/CMakeLists.txt")
            .with_file("/repo/third_party/OpenCL-Headers/CL/cl.h");
        let report = doctor(Some(&layout), &Config::default(), &linux_host(), &sys);

        let opencl = report.check("OpenCL library (arm64-v8a)").unwrap();
        assert!(!opencl.passed());
        assert!(opencl.message().contains("opencl-stubs"));
        assert!(report.check("OpenCL headers").unwrap().passed());
    }

    #[test]
    fn test_format_report() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::found(
            "cmake",
            PathBuf::from("/usr/bin/cmake"),
            "via cmake on PATH",
        ));
        report.add(CheckResult::missing("vcpkg", "not found; tried env VCPKG_ROOT").optional());

        let output = format_report(&report, false);
        assert!(output.contains("  [OK] cmake: /usr/bin/cmake (via cmake on PATH)\n"));
        assert!(output.contains("  [!!] vcpkg (optional): not found; tried env VCPKG_ROOT\n"));
        assert!(output.contains("Summary: 1 passed, 1 failed"));
        assert!(output.contains("Optional checks missing: 1."));
    }
}
