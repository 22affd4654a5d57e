//! Running a built artifact.
//!
//! A program replaces the current process and receives the remaining
//! command-line arguments. An extension module is imported by a freshly
//! spawned runtime interpreter, with the output directory on its search
//! path.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::debug;

use crate::BuildOutcome;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("cannot execute {}: {source}", .artifact.display())]
    Exec { artifact: PathBuf, source: io::Error },
    #[error("cannot start `{program}`: {source}")]
    Spawn { program: String, source: io::Error },
}

/// The command that runs `outcome`'s artifact.
pub fn launch_command(outcome: &BuildOutcome, args: &[OsString]) -> Command {
    let config = &outcome.config;
    if config.module_mode {
        let mut command = Command::new(interpreter(&config.runtime_version));
        command.arg("-c").arg(format!("import {}", config.name));
        if let Some(dir) = config.result_file.parent() {
            command.env("PYTHONPATH", dir);
        }
        command
    } else {
        let mut command = Command::new(&outcome.artifact);
        command.args(args);
        command
    }
}

/// Name of the interpreter binary for a runtime version.
pub fn interpreter(version: &str) -> String {
    format!("python{version}")
}

/// Run the artifact.
///
/// In program mode on Unix this only returns on failure: the artifact
/// replaces the current process.
pub fn launch(outcome: &BuildOutcome, args: &[OsString]) -> Result<ExitStatus, LaunchError> {
    let mut command = launch_command(outcome, args);
    debug!(command = ?command, "launching");
    if outcome.config.module_mode {
        return command.status().map_err(|source| LaunchError::Spawn {
            program: interpreter(&outcome.config.runtime_version),
            source,
        });
    }
    exec(&mut command, outcome)
}

#[cfg(unix)]
fn exec(command: &mut Command, outcome: &BuildOutcome) -> Result<ExitStatus, LaunchError> {
    use std::os::unix::process::CommandExt;

    command.arg0(format!("{}.exe", outcome.config.name));
    let source = command.exec();
    Err(LaunchError::Exec {
        artifact: outcome.artifact.clone(),
        source,
    })
}

#[cfg(not(unix))]
fn exec(command: &mut Command, outcome: &BuildOutcome) -> Result<ExitStatus, LaunchError> {
    command.status().map_err(|source| LaunchError::Exec {
        artifact: outcome.artifact.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        reason = "test code uses unwrap for concise assertions"
    )]

    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{BuildConfig, BuildOptions, SourceDirectory};

    fn outcome(module_mode: bool) -> BuildOutcome {
        let options = BuildOptions::new("hello")
            .with_output_dir("/out")
            .with_module_mode(module_mode)
            .with_runtime_version("3.11");
        let sources = SourceDirectory {
            path: options.source_dir(),
            files: Vec::new(),
        };
        let config = BuildConfig::new(&options, &sources);
        BuildOutcome {
            artifact: config.artifact(),
            config,
        }
    }

    #[test]
    fn test_program_forwards_arguments() {
        let args = [OsString::from("a"), OsString::from("--b")];
        let command = launch_command(&outcome(false), &args);
        assert_eq!(Path::new(command.get_program()), Path::new("/out/hello.exe"));
        assert_eq!(command.get_args().collect::<Vec<_>>(), vec!["a", "--b"]);
    }

    #[test]
    fn test_module_is_imported_by_interpreter() {
        let command = launch_command(&outcome(true), &[OsString::from("ignored")]);
        assert_eq!(command.get_program(), "python3.11");
        assert_eq!(
            command.get_args().collect::<Vec<_>>(),
            vec!["-c", "import hello"]
        );
        let path = command
            .get_envs()
            .find(|(key, _)| *key == "PYTHONPATH")
            .and_then(|(_, value)| value)
            .unwrap();
        assert_eq!(Path::new(path), Path::new("/out"));
    }

    #[test]
    fn test_missing_artifact_fails_to_exec() {
        let err = launch(&outcome(false), &[]).unwrap_err();
        assert!(matches!(err, LaunchError::Exec { .. }), "{err}");
    }
}
