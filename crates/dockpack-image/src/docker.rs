//! Discovery and invocation of the `docker` executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use dockpack_common::constants::{DOCKER_BINARY, DOCKER_ENV_VARS, PROCESS_ENV_VARS};
use dockpack_common::error::{DockpackError, Result};

/// A located `docker` executable.
#[derive(Debug, Clone)]
pub struct Docker {
    program: PathBuf,
    report_progress: bool,
}

impl Docker {
    /// Searches `search_paths`, in order, for the `docker` executable.
    ///
    /// # Errors
    ///
    /// Returns [`DockpackError::NotFound`] naming every searched directory
    /// if none holds an executable `docker`.
    pub fn locate(search_paths: &[PathBuf]) -> Result<Self> {
        let searched = search_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let not_found = || DockpackError::NotFound {
            kind: "executable",
            id: format!("{DOCKER_BINARY} (searched: {searched})"),
        };

        let paths = std::env::join_paths(search_paths).map_err(|e| {
            DockpackError::config(format!("invalid docker search path: {e}"))
        })?;
        let cwd = std::env::current_dir().map_err(|e| DockpackError::io(".", e))?;
        let program = which::which_in(DOCKER_BINARY, Some(paths), cwd).map_err(|_| not_found())?;

        tracing::debug!(program = %program.display(), "located docker");
        Ok(Self::at(program))
    }

    /// Uses the executable at `program` without searching.
    #[must_use]
    pub fn at(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            report_progress: false,
        }
    }

    /// Logs docker's stdout and stderr at `info` instead of `debug`.
    #[must_use]
    pub const fn with_report_progress(mut self, report_progress: bool) -> Self {
        self.report_progress = report_progress;
        self
    }

    /// Returns the executable path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs `docker build -t <ref>... .` inside `context_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or exits non-zero.
    pub fn build(&self, context_dir: &Path, references: &[String]) -> Result<()> {
        let mut args: Vec<OsString> = vec!["build".into()];
        for reference in references {
            args.push("-t".into());
            args.push(reference.into());
        }
        args.push(".".into());

        tracing::info!(context = %context_dir.display(), ?references, "running docker build");
        let output = self.run(&args, context_dir)?;
        self.log_output(&output);
        Ok(())
    }

    /// Runs `docker save -o <archive> <reference>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or exits non-zero.
    pub fn save(&self, reference: &str, archive: &Path, cwd: &Path) -> Result<()> {
        let args: Vec<OsString> = vec![
            "save".into(),
            "-o".into(),
            archive.as_os_str().to_owned(),
            reference.into(),
        ];
        tracing::info!(reference, archive = %archive.display(), "running docker save");
        let output = self.run(&args, cwd)?;
        self.log_output(&output);
        Ok(())
    }

    // BuildKit reports progress on stderr, so both streams are logged.
    fn log_output(&self, output: &ProcessOutput) {
        for (stream, text) in [("stdout", &output.stdout), ("stderr", &output.stderr)] {
            if self.report_progress {
                for line in text.lines() {
                    tracing::info!(target: "docker", stream, "{line}");
                }
            } else if !text.is_empty() {
                tracing::debug!(stream, output = %text, "docker output");
            }
        }
    }

    fn run(&self, args: &[OsString], cwd: &Path) -> Result<ProcessOutput> {
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .env_clear()
            .envs(forwarded_env())
            .output()
            .map_err(|e| DockpackError::io(&self.program, e))?;

        if !output.status.success() {
            return Err(DockpackError::Process {
                program: self.program.display().to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Captured streams of a successful docker invocation.
#[derive(Debug, Default)]
struct ProcessOutput {
    stdout: String,
    stderr: String,
}

/// Returns the variables passed through to the docker process.
///
/// Only variables set in the current environment are included.
#[must_use]
pub fn forwarded_env() -> Vec<(&'static str, OsString)> {
    DOCKER_ENV_VARS
        .iter()
        .chain(PROCESS_ENV_VARS)
        .filter_map(|&key| std::env::var_os(key).map(|value| (key, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use crate::test_support::{lock_scripts, script};

    #[test]
    fn locate_reports_searched_directories() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let err = Docker::locate(&[dir.path().to_path_buf()]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("docker"), "got: {msg}");
        assert!(msg.contains(&dir.path().display().to_string()), "got: {msg}");
    }

    #[test]
    fn forwarded_env_only_holds_known_keys() {
        for (key, _) in forwarded_env() {
            assert!(
                DOCKER_ENV_VARS.contains(&key) || PROCESS_ENV_VARS.contains(&key),
                "unexpected {key}"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn fake_docker_invocations() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let log = dir.path().join("args.log");
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).expect("mkdir");
        let _ = script(&bin, "docker", &format!("echo \"$@\" >> {}", log.display()));
        let failing = script(dir.path(), "failing", "echo boom >&2\nexit 3");

        let docker = Docker::locate(&[dir.path().join("missing"), bin.clone()]).expect("locate");
        assert_eq!(docker.program(), bin.join("docker"));

        docker
            .build(dir.path(), &["svc:v1".into(), "svc".into()])
            .expect("build");
        docker
            .save("svc", Path::new("dist/svc.tar"), dir.path())
            .expect("save");
        let calls = std::fs::read_to_string(&log).expect("read log");
        assert_eq!(calls, "build -t svc:v1 -t svc .\nsave -o dist/svc.tar svc\n");

        let chatty = script(dir.path(), "chatty", "echo step >&2\necho done");
        let output = Docker::at(&chatty)
            .run(&["build".into()], dir.path())
            .expect("run");
        assert_eq!(output.stdout, "done\n");
        assert_eq!(output.stderr, "step\n");
        Docker::at(chatty)
            .with_report_progress(true)
            .build(dir.path(), &[])
            .expect("build succeeds despite stderr output");

        let err = Docker::at(failing).build(dir.path(), &[]).unwrap_err();
        match err {
            DockpackError::Process { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom\n");
            }
            other => panic!("expected process error, got: {other}"),
        }
    }
}
