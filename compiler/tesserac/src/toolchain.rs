//! Native build of an assembled source directory.
//!
//! The build itself is delegated to an external toolchain behind the
//! [`Toolchain`] trait. [`SconsToolchain`] drives the `SingleExe.scons`
//! build script shipped with the runtime support files.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

use crate::{BuildOptions, SourceDirectory};

/// Environment variable naming the directory holding `SingleExe.scons`.
pub const SCONS_DIR_VAR: &str = "TESSERA_SCONS";

pub const SCONS_SCRIPT: &str = "SingleExe.scons";

/// Flat record handed to the toolchain.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BuildConfig {
    pub name: String,
    /// Artifact path without its suffix; the toolchain appends `.exe` or
    /// `.so`.
    pub result_file: PathBuf,
    pub source_dir: PathBuf,
    pub debug_mode: bool,
    pub module_mode: bool,
    pub optimize_mode: bool,
    pub runtime_version: String,
    pub runtime_debug: bool,
    pub lto_mode: bool,
    pub job_limit: usize,
}

impl BuildConfig {
    pub fn new(options: &BuildOptions, sources: &SourceDirectory) -> Self {
        BuildConfig {
            name: options.entry_name.clone(),
            result_file: options.result_file(),
            source_dir: sources.path().to_path_buf(),
            debug_mode: options.debug,
            module_mode: options.module_mode,
            optimize_mode: options.optimize,
            runtime_version: options.effective_runtime_version().to_owned(),
            runtime_debug: options.runtime_debug,
            lto_mode: options.lto,
            job_limit: options.effective_jobs(),
        }
    }

    /// `key=value` settings in the order the build script documents them.
    pub fn settings(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("result_file", self.result_file.display().to_string()),
            ("source_dir", self.source_dir.display().to_string()),
            ("debug_mode", bool_str(self.debug_mode).to_owned()),
            ("module_mode", bool_str(self.module_mode).to_owned()),
            ("optimize_mode", bool_str(self.optimize_mode).to_owned()),
            ("python_version", self.runtime_version.clone()),
            ("python_debug", bool_str(self.runtime_debug).to_owned()),
            ("lto_mode", bool_str(self.lto_mode).to_owned()),
        ]
    }

    /// Path of the built artifact.
    pub fn artifact(&self) -> PathBuf {
        let suffix = if self.module_mode { ".so" } else { ".exe" };
        let mut artifact = self.result_file.clone().into_os_string();
        artifact.push(suffix);
        PathBuf::from(artifact)
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.settings() {
            writeln!(f, "{key:>16}: {value}")?;
        }
        write!(f, "{:>16}: {}", "job_limit", self.job_limit)
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// A successful build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOutcome {
    pub artifact: PathBuf,
    /// The configuration the artifact was built with.
    pub config: BuildConfig,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("TESSERA_SCONS is not set; it must name the directory containing SingleExe.scons")]
    MissingScriptDir,
    #[error("cannot run `{program}`: {source}")]
    Spawn { program: String, source: io::Error },
    /// The sources stay on disk for inspection.
    #[error("`{program}` failed ({}); sources kept in {}", exit_description(.code.as_ref()), .source_dir.display())]
    ToolchainFailed {
        program: String,
        code: Option<i32>,
        source_dir: PathBuf,
    },
}

fn exit_description(code: Option<&i32>) -> String {
    code.map_or_else(
        || "terminated by signal".to_owned(),
        |code| format!("exit code {code}"),
    )
}

/// Turns a source directory into an artifact. Blocks until done.
pub trait Toolchain {
    fn build(&self, config: &BuildConfig) -> Result<BuildOutcome, BuildError>;
}

/// Runs `scons [--quiet] -f <dir>/SingleExe.scons --jobs <n> key=value...`.
#[derive(Clone, Debug)]
pub struct SconsToolchain {
    program: OsString,
    script_dir: PathBuf,
    quiet: bool,
    show_command: bool,
}

impl SconsToolchain {
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        SconsToolchain {
            program: OsString::from("scons"),
            script_dir: script_dir.into(),
            quiet: false,
            show_command: false,
        }
    }

    /// Locate the build script directory through [`SCONS_DIR_VAR`].
    pub fn from_env() -> Result<Self, BuildError> {
        std::env::var_os(SCONS_DIR_VAR)
            .filter(|dir| !dir.is_empty())
            .map(Self::new)
            .ok_or(BuildError::MissingScriptDir)
    }

    /// Take `--quiet` and the command echo from the build options.
    #[must_use]
    pub fn configured(self, options: &BuildOptions) -> Self {
        self.with_quiet(options.quiet)
            .with_show_command(options.show_command)
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    #[must_use]
    pub fn with_show_command(mut self, show_command: bool) -> Self {
        self.show_command = show_command;
        self
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    /// Arguments passed to the build program.
    pub fn arguments(&self, config: &BuildConfig) -> Vec<OsString> {
        let mut args = Vec::new();
        if self.quiet {
            args.push(OsString::from("--quiet"));
        }
        args.push(OsString::from("-f"));
        args.push(self.script_dir.join(SCONS_SCRIPT).into_os_string());
        args.push(OsString::from("--jobs"));
        args.push(OsString::from(config.job_limit.to_string()));
        for (key, value) in config.settings() {
            args.push(OsString::from(format!("{key}={value}")));
        }
        args
    }

    /// The full command line, for display.
    pub fn command_line(&self, config: &BuildConfig) -> String {
        std::iter::once(self.program.clone())
            .chain(self.arguments(config))
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Toolchain for SconsToolchain {
    fn build(&self, config: &BuildConfig) -> Result<BuildOutcome, BuildError> {
        let program = self.program.to_string_lossy().into_owned();
        if self.show_command {
            println!("Scons command: {}", self.command_line(config));
        }
        debug!(command = %self.command_line(config), "running toolchain");

        let status = Command::new(&self.program)
            .args(self.arguments(config))
            .status()
            .map_err(|source| BuildError::Spawn {
                program: program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(BuildError::ToolchainFailed {
                program,
                code: status.code(),
                source_dir: config.source_dir.clone(),
            });
        }

        let artifact = config.artifact();
        info!(artifact = %artifact.display(), "build finished");
        Ok(BuildOutcome {
            artifact,
            config: config.clone(),
        })
    }
}
