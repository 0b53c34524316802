//! Resolved build configuration.

use std::path::{Path, PathBuf};

use crate::builder::patch::SourcePatch;
use crate::core::flags::{cache_args, BackendFlagSet};
use crate::core::platform::Target;

/// A file written into the build tree before configuring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Everything needed to configure, build, and package one request.
///
/// Platform builders assemble it with the `with_*` methods while resolving.
/// Once handed to the pipeline it is only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    target: Target,
    /// Configure/build preset name
    preset: String,
    build_dir: PathBuf,
    output_dir: PathBuf,
    flags: BackendFlagSet,
    /// Toolchain cache variables, as `-D` arguments, after the flags
    extra_args: Vec<String>,
    /// Environment overlay for every command
    env: Vec<(String, String)>,
    generated_files: Vec<GeneratedFile>,
    /// Patches held for the duration of the build
    source_patches: Vec<SourcePatch>,
}

impl ResolvedConfiguration {
    pub fn new(
        target: Target,
        build_dir: PathBuf,
        output_dir: PathBuf,
        flags: BackendFlagSet,
    ) -> Self {
        ResolvedConfiguration {
            target,
            preset: target.preset_name(),
            build_dir,
            output_dir,
            flags,
            extra_args: Vec::new(),
            env: Vec::new(),
            generated_files: Vec::new(),
            source_patches: Vec::new(),
        }
    }

    /// Add a `-DKEY=VALUE` argument after the backend flags.
    pub fn with_define(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.extra_args
            .push(format!("-D{}={}", key, value.as_ref()));
        self
    }

    /// Add an environment overlay entry.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Add several environment overlay entries.
    pub fn with_envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(vars);
        self
    }

    pub fn with_generated_file(mut self, file: GeneratedFile) -> Self {
        self.generated_files.push(file);
        self
    }

    pub fn with_source_patch(mut self, patch: SourcePatch) -> Self {
        self.source_patches.push(patch);
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn preset(&self) -> &str {
        &self.preset
    }

    /// Where the preset builds.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Packaged library directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn flags(&self) -> &BackendFlagSet {
        &self.flags
    }

    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Files to write before configuring.
    pub fn generated_files(&self) -> &[GeneratedFile] {
        &self.generated_files
    }

    pub fn source_patches(&self) -> &[SourcePatch] {
        &self.source_patches
    }

    /// Backend cache variables as `(key, value)` pairs.
    pub fn cache_vars(&self) -> Vec<(String, String)> {
        self.flags.cache_vars()
    }

    /// Arguments for the configure step: backend flags, then toolchain arguments.
    pub fn configure_args(&self) -> Vec<String> {
        let mut args = cache_args(&self.cache_vars());
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Value of an environment overlay entry.
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a `-D` argument, searching flags and toolchain arguments.
    pub fn define_value(&self, key: &str) -> Option<String> {
        let prefix = format!("-D{}=", key);
        self.configure_args()
            .into_iter()
            .find_map(|arg| arg.strip_prefix(&prefix).map(str::to_string))
    }
}
