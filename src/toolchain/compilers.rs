//! Compiler and build tool discovery.

use std::path::{Path, PathBuf};

use crate::core::platform::Arch;
use crate::toolchain::chain::DiscoveryChain;
use crate::toolchain::system::SystemView;

/// C and C++ compilers targeting another architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossCompilers {
    pub cc: PathBuf,
    pub cxx: PathBuf,
}

/// Resolve a compiler given as either a path or a program name.
fn resolve_program(sys: &dyn SystemView, value: &str) -> Option<PathBuf> {
    let path = sys.expand_home(value);
    if sys.is_file(&path) {
        return Some(path);
    }
    sys.which(value)
}

/// Discovery chain for a Linux cross compiler pair targeting `arch`.
///
/// `CROSS_CC` and `CROSS_CXX` must both resolve; otherwise the GNU
/// `<triple>-gcc` and `<triple>-g++` pair is looked up on `PATH`.
pub fn cross_compiler_chain<'a>(arch: Arch) -> DiscoveryChain<'a, CrossCompilers> {
    let triple = arch.gnu_linux_triple();

    DiscoveryChain::new(format!("{} cross compilers", triple))
        .probe("env CROSS_CC + CROSS_CXX", |sys| {
            let (Some(cc), Some(cxx)) = (sys.env("CROSS_CC"), sys.env("CROSS_CXX")) else {
                return Ok(None);
            };
            Ok(resolve_program(sys, &cc)
                .zip(resolve_program(sys, &cxx))
                .map(|(cc, cxx)| CrossCompilers { cc, cxx }))
        })
        .probe(format!("{triple}-gcc and {triple}-g++ on PATH"), move |sys| {
            let cc = sys.which(&format!("{}-gcc", triple));
            let cxx = sys.which(&format!("{}-g++", triple));
            Ok(cc.zip(cxx).map(|(cc, cxx)| CrossCompilers { cc, cxx }))
        })
        .help(format!("Install {triple}-gcc and {triple}-g++"))
        .help("Set CROSS_CC and CROSS_CXX to the cross compilers")
}

fn nvcc_in(sys: &dyn SystemView, root: &Path) -> Option<PathBuf> {
    ["nvcc", "nvcc.exe"]
        .into_iter()
        .map(|name| root.join("bin").join(name))
        .find(|path| sys.is_file(path))
}

/// Default CUDA toolkit location on Linux.
pub const DEFAULT_CUDA_ROOT: &str = "/usr/local/cuda";

/// Discovery chain for the CUDA compiler.
pub fn nvcc_chain<'a>() -> DiscoveryChain<'a, PathBuf> {
    let mut chain = DiscoveryChain::new("CUDA compiler (nvcc)");

    for key in ["CUDA_PATH", "CUDA_HOME"] {
        chain = chain.probe(format!("env {} (bin/nvcc)", key), move |sys| {
            Ok(sys.env_path(key).and_then(|root| nvcc_in(sys, &root)))
        });
    }

    chain
        .probe("nvcc on PATH", |sys| {
            Ok(sys.which("nvcc").or_else(|| sys.which("nvcc.exe")))
        })
        .probe(format!("{}/bin/nvcc", DEFAULT_CUDA_ROOT), |sys| {
            Ok(nvcc_in(sys, Path::new(DEFAULT_CUDA_ROOT)))
        })
        .help("Install the CUDA toolkit")
        .help("Set CUDA_PATH to the toolkit root")
}

/// Discovery chain for the `cmake` executable.
pub fn cmake_chain<'a>(configured: Option<&'a Path>) -> DiscoveryChain<'a, PathBuf> {
    DiscoveryChain::new("cmake")
        .probe("config tools.cmake", move |sys| {
            Ok(configured.and_then(|p| resolve_program(sys, &p.to_string_lossy())))
        })
        .probe("cmake on PATH", |sys| Ok(sys.which("cmake")))
        .help("Install CMake 3.21 or newer")
        .help("Set `cmake` under [tools] in .prebuild/config.toml")
}

/// Make program for the host shader-generator toolchain: `ninja`, then `make`.
pub fn host_make_program(sys: &dyn SystemView) -> Option<PathBuf> {
    sys.which("ninja").or_else(|| sys.which("make"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BuildError;
    use crate::test_support::MockSystem;

    #[test]
    fn test_cross_compilers_from_path() {
        let sys = MockSystem::new()
            .with_program("aarch64-linux-gnu-gcc", "/usr/bin/aarch64-linux-gnu-gcc")
            .with_program("aarch64-linux-gnu-g++", "/usr/bin/aarch64-linux-gnu-g++");

        let cross = cross_compiler_chain(Arch::Arm64).resolve(&sys).unwrap();
        assert_eq!(cross.cc, PathBuf::from("/usr/bin/aarch64-linux-gnu-gcc"));
        assert_eq!(cross.cxx, PathBuf::from("/usr/bin/aarch64-linux-gnu-g++"));
    }

    #[test]
    fn test_cross_compilers_need_both() {
        let sys = MockSystem::new()
            .with_program("aarch64-linux-gnu-gcc", "/usr/bin/aarch64-linux-gnu-gcc")
            .with_env("CROSS_CC", "/opt/cc");

        let err = cross_compiler_chain(Arch::Arm64).resolve(&sys).unwrap_err();
        assert!(matches!(err, BuildError::DependencyNotFound { .. }));
    }

    #[test]
    fn test_cross_compilers_from_env() {
        let sys = MockSystem::new()
            .with_env("CROSS_CC", "clang")
            .with_env("CROSS_CXX", "/opt/llvm/bin/clang++")
            .with_program("clang", "/opt/llvm/bin/clang")
            .with_file("/opt/llvm/bin/clang++");

        let cross = cross_compiler_chain(Arch::X64).resolve(&sys).unwrap();
        assert_eq!(cross.cc, PathBuf::from("/opt/llvm/bin/clang"));
        assert_eq!(cross.cxx, PathBuf::from("/opt/llvm/bin/clang++"));
    }

    #[test]
    fn test_nvcc_chain_order() {
        let sys = MockSystem::new()
            .with_env("CUDA_HOME", "/opt/cuda")
            .with_file("/opt/cuda/bin/nvcc")
            .with_file("/usr/local/cuda/bin/nvcc");
        assert_eq!(
            nvcc_chain().resolve(&sys).unwrap(),
            PathBuf::from("/opt/cuda/bin/nvcc")
        );

        let sys = MockSystem::new().with_file("/usr/local/cuda/bin/nvcc");
        assert_eq!(
            nvcc_chain().resolve(&sys).unwrap(),
            PathBuf::from("/usr/local/cuda/bin/nvcc")
        );
    }

    #[test]
    fn test_cmake_config_precedes_path() {
        let sys = MockSystem::new()
            .with_program("cmake", "/usr/bin/cmake")
            .with_file("/opt/cmake/bin/cmake");

        let configured = PathBuf::from("/opt/cmake/bin/cmake");
        assert_eq!(
            cmake_chain(Some(configured.as_path())).resolve(&sys).unwrap(),
            configured
        );
        assert_eq!(
            cmake_chain(None).resolve(&sys).unwrap(),
            PathBuf::from("/usr/bin/cmake")
        );
    }
}
