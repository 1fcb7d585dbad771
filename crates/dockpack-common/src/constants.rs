//! System-wide constants and default values.

use std::path::PathBuf;

/// Directory inside the build context holding every contributed file.
pub const APPLICATION_DIR: &str = "application";

/// Name of the generated recipe at the root of the build context.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Default build file name, looked up at the workspace root.
pub const BUILD_FILE_NAME: &str = "dockpack.yaml";

/// Working directory used when a `docker_image` target declares none.
pub const DEFAULT_WORKDIR: &str = "container";

/// Default directory (relative to the workspace) for package outputs.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// Default package index consulted by `pip install`.
pub const DEFAULT_PYTHON_INDEX: &str = "https://pypi.org/simple/";

/// Default source roots stripped from Python sources and resources.
pub const DEFAULT_SOURCE_ROOTS: &[&str] = &["src/python", "src"];

/// Name of the container-build executable.
pub const DOCKER_BINARY: &str = "docker";

/// Location of the virtual environment created inside the image.
pub const VIRTUAL_ENV_DIR: &str = "/.virtual_env";

/// Environment variables forwarded verbatim to the container-build process.
///
/// Docker reads these to locate and authenticate against its daemon.
pub const DOCKER_ENV_VARS: &[&str] = &[
    "DOCKER_CERT_PATH",
    "DOCKER_CONFIG",
    "DOCKER_CONTENT_TRUST_SERVER",
    "DOCKER_CONTENT_TRUST",
    "DOCKER_CONTEXT",
    "DOCKER_DEFAULT_PLATFORM",
    "DOCKER_HIDE_LEGACY_COMMANDS",
    "DOCKER_HOST",
    "DOCKER_STACK_ORCHESTRATOR",
    "DOCKER_TLS_VERIFY",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "NO_PROXY",
];

/// Process variables forwarded alongside [`DOCKER_ENV_VARS`] when set.
///
/// Credential helpers are resolved through `PATH` and read `HOME`.
pub const PROCESS_ENV_VARS: &[&str] = &["HOME", "PATH"];

/// Returns the ordered directories searched for the `docker` executable.
///
/// `$HOME/bin` is only included when `HOME` is set.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = ["/bin", "/usr/bin", "/usr/local/bin"]
        .iter()
        .map(PathBuf::from)
        .collect();
    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join("bin"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_paths_start_with_system_dirs_in_order() {
        let paths = default_search_paths();
        assert_eq!(paths[0], PathBuf::from("/bin"));
        assert_eq!(paths[1], PathBuf::from("/usr/bin"));
        assert_eq!(paths[2], PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn proxy_variables_are_forwarded() {
        for var in ["HTTP_PROXY", "HTTPS_PROXY", "NO_PROXY", "DOCKER_HOST"] {
            assert!(DOCKER_ENV_VARS.contains(&var), "{var} missing");
        }
    }
}
