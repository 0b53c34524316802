//! Read-only view of the host used by discovery.
//!
//! Every probe reads the environment, the filesystem, and `PATH` through
//! [`SystemView`], so discovery chains can run against an in-memory host
//! in tests.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// The parts of the host a discovery probe may look at.
pub trait SystemView {
    /// Value of an environment variable. Unset and empty are both `None`.
    fn env(&self, key: &str) -> Option<String>;

    /// Whether `path` is a file (following symlinks).
    fn is_file(&self, path: &Path) -> bool;

    /// Whether `path` is a directory (following symlinks).
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate subdirectories of `path`, sorted by path.
    fn subdirs(&self, path: &Path) -> Vec<PathBuf>;

    /// Every file below `root`, recursively, sorted by path.
    fn walk_files(&self, root: &Path) -> Vec<PathBuf>;

    /// Locate an executable on `PATH`.
    fn which(&self, program: &str) -> Option<PathBuf>;

    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Whether `path` exists at all.
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    /// Environment variable interpreted as a path, with `~` expanded.
    fn env_path(&self, key: &str) -> Option<PathBuf> {
        self.env(key).map(|value| self.expand_home(&value))
    }

    /// Expand a leading `~` to the home directory.
    fn expand_home(&self, value: &str) -> PathBuf {
        if let Some(rest) = value.strip_prefix("~/").or_else(|| value.strip_prefix("~\\")) {
            if let Some(home) = self.home_dir() {
                return home.join(rest);
            }
        } else if value == "~" {
            if let Some(home) = self.home_dir() {
                return home;
            }
        }
        PathBuf::from(value)
    }
}

/// The real host.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealSystem;

impl SystemView for RealSystem {
    fn env(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn subdirs(&self, path: &Path) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(path) else {
            return Vec::new();
        };
        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();
        dirs
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file())
            .collect()
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf())
    }
}
