//! Android NDK discovery.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::toolchain::chain::DiscoveryChain;
use crate::toolchain::find_file_with_suffix;
use crate::toolchain::system::SystemView;

/// NDK location of the pre side-by-side SDK layout.
pub const LEGACY_NDK_BUNDLE: &str = "/usr/local/lib/android/sdk/ndk-bundle";

/// Directory names that look like an installed NDK version.
const VERSION_DIR_PATTERN: &str = "[0-9]*";

/// SDK roots searched for side-by-side NDK installs, in order.
enum SdkRoot {
    Env(&'static str),
    Home(&'static str),
    Fixed(&'static str),
}

const SDK_ROOTS: [SdkRoot; 5] = [
    SdkRoot::Env("ANDROID_SDK_ROOT"),
    SdkRoot::Env("ANDROID_HOME"),
    SdkRoot::Home("Library/Android/sdk"),
    SdkRoot::Home("Android/Sdk"),
    SdkRoot::Fixed("/usr/local/lib/android/sdk"),
];

impl SdkRoot {
    fn describe(&self) -> String {
        match self {
            SdkRoot::Env(key) => format!("env {} (ndk/<version>)", key),
            SdkRoot::Home(rel) => format!("~/{}/ndk/<version>", rel),
            SdkRoot::Fixed(path) => format!("{}/ndk/<version>", path),
        }
    }

    fn locate(&self, sys: &dyn SystemView) -> Option<PathBuf> {
        match self {
            SdkRoot::Env(key) => sys.env_path(key),
            SdkRoot::Home(rel) => sys.home_dir().map(|home| home.join(rel)),
            SdkRoot::Fixed(path) => Some(PathBuf::from(path)),
        }
    }
}

/// Discovery chain for the NDK root.
///
/// `ANDROID_NDK_HOME`, then the highest installed version under each known
/// SDK root, then the legacy bundled NDK.
pub fn ndk_chain<'a>() -> DiscoveryChain<'a, PathBuf> {
    let mut chain = DiscoveryChain::new("Android NDK").probe("env ANDROID_NDK_HOME", |sys| {
        Ok(sys
            .env_path("ANDROID_NDK_HOME")
            .filter(|path| sys.exists(path)))
    });

    for root in SDK_ROOTS {
        chain = chain.probe(root.describe(), move |sys| {
            Ok(root
                .locate(sys)
                .and_then(|sdk| highest_installed(sys, &sdk.join("ndk"))))
        });
    }

    chain
        .probe(LEGACY_NDK_BUNDLE, |sys| {
            let legacy = PathBuf::from(LEGACY_NDK_BUNDLE);
            Ok(sys.is_dir(&legacy).then_some(legacy))
        })
        .help("Set ANDROID_NDK_HOME to the NDK root")
        .help("Install an NDK with: sdkmanager \"ndk;<version>\"")
}

/// Highest-versioned NDK directory inside an SDK's `ndk/` directory.
///
/// Directories with semver names order by version and sort above
/// anything unparsable; ties and unparsable names order lexically.
pub fn highest_installed(sys: &dyn SystemView, ndk_dir: &Path) -> Option<PathBuf> {
    let dirs = sys.subdirs(ndk_dir);
    let pattern = glob::Pattern::new(VERSION_DIR_PATTERN).ok();

    let versioned: Vec<PathBuf> = dirs
        .iter()
        .filter(|dir| match (&pattern, dir_name(dir)) {
            (Some(pattern), Some(name)) => pattern.matches(name),
            _ => true,
        })
        .cloned()
        .collect();
    let candidates = if versioned.is_empty() { dirs } else { versioned };

    candidates
        .into_iter()
        .max_by(|a, b| version_key(a).cmp(&version_key(b)))
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn version_key(path: &Path) -> (Option<Version>, String) {
    let name = dir_name(path).unwrap_or_default().to_string();
    (Version::parse(&name).ok(), name)
}

/// The NDK's CMake toolchain file.
pub fn cmake_toolchain_file(ndk: &Path) -> PathBuf {
    ndk.join("build").join("cmake").join("android.toolchain.cmake")
}

/// Shader compiler shipped inside the NDK, if any.
pub fn find_glslc(sys: &dyn SystemView, ndk: &Path) -> Option<PathBuf> {
    find_file_with_suffix(sys, ndk, "glslc", None)
        .or_else(|| find_file_with_suffix(sys, ndk, "glslc.exe", None))
}

/// Search the NDK for a library built for an ABI's sysroot triple.
pub fn find_abi_library(
    sys: &dyn SystemView,
    ndk: &Path,
    file_name: &str,
    triple_dir: &str,
) -> Option<PathBuf> {
    find_file_with_suffix(sys, ndk, file_name, Some(&format!("/{}/", triple_dir)))
}
