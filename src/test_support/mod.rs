//! Test utilities and mocks for prebuild unit tests.
//!
//! The build pipeline reaches the outside world through two seams: the host
//! view used by discovery ([`SystemView`]) and the process runner
//! ([`CommandRunner`]). This module provides in-memory stand-ins for both.
//!
//! # Example
//!
//! ```rust,ignore
//! let sys = MockSystem::new()
//!     .with_env("ANDROID_NDK_HOME", "/opt/ndk")
//!     .with_dir("/opt/ndk");
//!
//! let exec = MockExecutor::new().fail_on("cmake --build", 2);
//! ```

pub mod fixtures;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::toolchain::SystemView;
use crate::util::process::{CommandRunner, ProcessStatus, ToolCommand};

pub use fixtures::*;

/// In-memory host for discovery tests.
///
/// Registering a file registers every ancestor directory. Programs put on
/// the mock `PATH` with [`with_program`](Self::with_program) also exist as
/// files. Paths are compared as given, so a test sticks to one separator
/// style.
#[derive(Debug, Clone, Default)]
pub struct MockSystem {
    files: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
    env: HashMap<String, String>,
    programs: HashMap<String, PathBuf>,
    home: Option<PathBuf>,
}

impl MockSystem {
    pub fn new() -> Self {
        MockSystem::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.add_file(path.as_ref());
        self
    }

    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path.as_ref());
        self
    }

    /// Set an environment variable. Empty values read as unset.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Put a program on the mock `PATH`.
    pub fn with_program(mut self, name: &str, path: impl AsRef<Path>) -> Self {
        self.add_file(path.as_ref());
        self.programs
            .insert(name.to_string(), path.as_ref().to_path_buf());
        self
    }

    pub fn with_home(mut self, home: impl AsRef<Path>) -> Self {
        self.add_dir(home.as_ref());
        self.home = Some(home.as_ref().to_path_buf());
        self
    }

    fn add_file(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path.to_path_buf());
    }

    fn add_dir(&mut self, path: &Path) {
        for dir in path.ancestors().filter(|d| !d.as_os_str().is_empty()) {
            if !self.dirs.insert(dir.to_path_buf()) {
                break;
            }
        }
    }
}

impl SystemView for MockSystem {
    fn env(&self, key: &str) -> Option<String> {
        self.env.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn subdirs(&self, path: &Path) -> Vec<PathBuf> {
        self.dirs
            .iter()
            .filter(|d| d.parent() == Some(path))
            .cloned()
            .collect()
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|p| p.starts_with(root) && p.as_path() != root)
            .cloned()
            .collect()
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        self.programs.get(program).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}

#[derive(Debug, Default)]
struct ExecutorState {
    /// Command-line prefix and the exit code it returns
    failures: Vec<(String, i32)>,
    calls: Vec<ToolCommand>,
}

/// Recording process runner.
///
/// Every command succeeds unless its command line starts with a prefix
/// registered through [`fail_on`](Self::fail_on).
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<ExecutorState>,
}

impl MockExecutor {
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Make commands starting with `prefix` exit with `code`.
    pub fn fail_on(self, prefix: &str, code: i32) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.failures.push((prefix.to_string(), code));
        }
        self
    }

    /// Every command run so far.
    pub fn calls(&self) -> Vec<ToolCommand> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    /// Every command run so far, rendered as command lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.display_command()).collect()
    }
}

impl CommandRunner for MockExecutor {
    fn run(&self, cmd: &ToolCommand) -> Result<ProcessStatus> {
        let Ok(mut state) = self.state.lock() else {
            bail!("mock executor state poisoned");
        };
        let line = cmd.display_command();
        state.calls.push(cmd.clone());

        let code = state
            .failures
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map_or(0, |(_, code)| *code);
        Ok(ProcessStatus::from_code(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_system_tracks_ancestors() {
        let sys = MockSystem::new()
            .with_file("/a/b/c.txt")
            .with_file("/a/d/e.txt");

        assert!(sys.is_dir(Path::new("/a")));
        assert!(sys.is_dir(Path::new("/a/b")));
        assert_eq!(
            sys.subdirs(Path::new("/a")),
            vec![PathBuf::from("/a/b"), PathBuf::from("/a/d")]
        );
        assert_eq!(
            sys.walk_files(Path::new("/a/b")),
            vec![PathBuf::from("/a/b/c.txt")]
        );
    }

    #[test]
    fn test_empty_env_reads_as_unset() {
        let sys = MockSystem::new().with_env("VULKAN_SDK", "");
        assert_eq!(sys.env("VULKAN_SDK"), None);
    }

    #[test]
    fn test_mock_executor_records_and_fails_by_prefix() {
        let exec = MockExecutor::new().fail_on("cmake --build", 2);

        let configure = exec.run(&ToolCommand::new("cmake").args(["--preset", "p"])).unwrap();
        let build = exec
            .run(&ToolCommand::new("cmake").args(["--build", "--preset", "p"]))
            .unwrap();

        assert!(configure.success);
        assert_eq!(build.code, Some(2));
        assert_eq!(
            exec.command_lines(),
            vec!["cmake --preset p", "cmake --build --preset p"]
        );
    }
}
