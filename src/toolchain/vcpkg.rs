//! Vcpkg integration for Windows BLAS builds.
//!
//! When a vcpkg root is found its CMake toolchain file is passed to the
//! configure step so OpenBLAS resolves through vcpkg. A missing vcpkg is
//! not an error: the build falls back to whatever CMake finds on its own.

use std::path::{Path, PathBuf};

use crate::core::platform::Arch;
use crate::toolchain::chain::DiscoveryChain;
use crate::toolchain::system::SystemView;

/// Well-known install directories, searched after the environment.
pub const WELL_KNOWN_ROOTS: [&str; 2] = ["C:/vcpkg", "C:/tools/vcpkg"];

/// Discovery chain for the vcpkg root.
pub fn root_chain<'a>() -> DiscoveryChain<'a, PathBuf> {
    let mut chain = DiscoveryChain::new("vcpkg");

    for key in ["VCPKG_ROOT", "VCPKG_INSTALLATION_ROOT"] {
        chain = chain.probe(format!("env {}", key), move |sys| {
            Ok(sys.env_path(key).filter(|root| sys.is_dir(root)))
        });
    }

    for root in WELL_KNOWN_ROOTS {
        chain = chain.probe(root, move |sys| {
            let root = PathBuf::from(root);
            Ok(sys.is_dir(&root).then_some(root))
        });
    }

    chain
        .help("Set VCPKG_ROOT to the vcpkg checkout")
        .help("Install OpenBLAS with: vcpkg install openblas")
}

/// The CMake toolchain file of a vcpkg root, if the root has one.
pub fn toolchain_file(sys: &dyn SystemView, root: &Path) -> Option<PathBuf> {
    let file = root
        .join("scripts")
        .join("buildsystems")
        .join("vcpkg.cmake");
    sys.is_file(&file).then_some(file)
}

/// Vcpkg triplet for a Windows architecture.
pub fn windows_triplet(arch: Arch) -> String {
    format!("{}-windows", arch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockSystem;

    #[test]
    fn test_env_precedes_well_known_roots() {
        let sys = MockSystem::new()
            .with_env("VCPKG_INSTALLATION_ROOT", "D:/vcpkg")
            .with_dir("D:/vcpkg")
            .with_dir("C:/vcpkg");

        assert_eq!(root_chain().resolve(&sys).unwrap(), PathBuf::from("D:/vcpkg"));
    }

    #[test]
    fn test_well_known_root() {
        let sys = MockSystem::new().with_dir("C:/tools/vcpkg");
        assert_eq!(
            root_chain().resolve(&sys).unwrap(),
            PathBuf::from("C:/tools/vcpkg")
        );
    }

    #[test]
    fn test_toolchain_file_requires_script() {
        let sys = MockSystem::new()
            .with_dir("C:/vcpkg")
            .with_file("D:/vcpkg/scripts/buildsystems/vcpkg.cmake");

        assert_eq!(toolchain_file(&sys, Path::new("C:/vcpkg")), None);
        assert_eq!(
            toolchain_file(&sys, Path::new("D:/vcpkg")),
            Some(PathBuf::from("D:/vcpkg/scripts/buildsystems/vcpkg.cmake"))
        );
    }

    #[test]
    fn test_triplets() {
        assert_eq!(windows_triplet(Arch::X64), "x64-windows");
        assert_eq!(windows_triplet(Arch::Arm64), "arm64-windows");
    }
}
