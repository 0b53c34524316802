//! Test fixtures for common test scenarios.
//!
//! This module provides a project checkout generator for tests that need
//! a real directory tree: presets, vendored sources, and build outputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Install command of the ZenDNN external project before patching.
pub const ZENDNN_INSTALL_LINE: &str =
    "INSTALL_COMMAND ${CMAKE_COMMAND} --build ${ZENDNN_BUILD_DIR} --target install";

/// Fixture for a project checkout.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// CMakePresets.json content.
    pub presets: String,
    /// Extra files (path relative to project root -> content).
    pub files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// A checkout with an empty preset list and the llama.cpp submodule present.
    pub fn new() -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            PathBuf::from("third_party/llama.cpp/CMakeLists.txt"),
            "cmake_minimum_required(VERSION 3.14)\nproject(llama.cpp)\n".to_string(),
        );
        ProjectFixture {
            presets: r#"{ "version": 6, "configurePresets": [] }"#.to_string(),
            files,
        }
    }

    /// Replace the presets document.
    pub fn with_presets(mut self, presets: impl Into<String>) -> Self {
        self.presets = presets.into();
        self
    }

    /// Add a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Add the ggml-zendnn build description in its unpatched form.
    pub fn with_zendnn_sources(self) -> Self {
        self.with_file(
            "third_party/llama.cpp/ggml/src/ggml-zendnn/CMakeLists.txt",
            zendnn_cmake_lists(),
        )
    }

    /// Write the fixture into `root`.
    pub fn write_to(&self, root: &Path) {
        std::fs::write(root.join("CMakePresets.json"), &self.presets)
            .expect("failed to write presets");
        for (rel, content) in &self.files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("failed to create fixture dir");
            }
            std::fs::write(&path, content).expect("failed to write fixture file");
        }
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        ProjectFixture::new()
    }
}

/// Build description of the ZenDNN backend as the submodule ships it.
pub fn zendnn_cmake_lists() -> String {
    format!(
        "ExternalProject_Add(zendnnl\n    SOURCE_DIR ${{ZENDNN_SOURCE_DIR}}\n    {}\n    BUILD_BYPRODUCTS ${{ZENDNN_LIB}}\n)\n",
        ZENDNN_INSTALL_LINE
    )
}

/// Create a temporary project checkout from a fixture.
///
/// Returns the TempDir handle - dropping it will clean up the directory.
pub fn create_test_project(fixture: &ProjectFixture) -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().expect("failed to create temp dir");
    fixture.write_to(tmp.path());
    tmp
}

/// Create empty files below `root`, creating parents as needed.
pub fn touch_files(root: &Path, files: &[&str]) {
    for rel in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create dir");
        }
        std::fs::write(&path, rel.as_bytes()).expect("failed to write file");
    }
}
