//! Build options.

use std::path::PathBuf;

use tessera_opt::OptimizerConfig;

/// Runtime version targeted when none is given.
pub const DEFAULT_RUNTIME_VERSION: &str = "3.12";

/// Everything one compilation needs to know, decided before it starts.
///
/// The mode flags are independent settings, not states of one machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BuildOptions {
    /// Name of the entry module; names the build directory and the artifact.
    pub entry_name: String,
    /// Directory receiving `<entry>.build/` and the artifact.
    pub output_dir: PathBuf,
    /// Build with debug checks in the generated code (--debug)
    pub debug: bool,
    /// Build an importable extension module instead of a program (--module)
    pub module_mode: bool,
    /// Optimize the native build (--optimize)
    pub optimize: bool,
    /// Link-time optimization (--lto)
    pub lto: bool,
    /// Target runtime version, `major.minor` (--runtime=<ver>)
    pub runtime_version: Option<String>,
    /// Link against the debug build of the runtime (--runtime-debug)
    pub runtime_debug: bool,
    /// Parallel toolchain jobs (--jobs=<n>)
    pub jobs: Option<usize>,
    /// Silence the toolchain (--quiet)
    pub quiet: bool,
    /// Print the toolchain command line (--show-scons)
    pub show_command: bool,
    pub optimizer: OptimizerConfig,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            entry_name: String::from("main"),
            output_dir: PathBuf::from("."),
            debug: false,
            module_mode: false,
            optimize: false,
            lto: false,
            runtime_version: None,
            runtime_debug: false,
            jobs: None,
            quiet: false,
            show_command: false,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl BuildOptions {
    pub fn new(entry_name: impl Into<String>) -> Self {
        Self {
            entry_name: entry_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_module_mode(mut self, module_mode: bool) -> Self {
        self.module_mode = module_mode;
        self
    }

    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    #[must_use]
    pub fn with_lto(mut self, lto: bool) -> Self {
        self.lto = lto;
        self
    }

    #[must_use]
    pub fn with_runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_runtime_debug(mut self, runtime_debug: bool) -> Self {
        self.runtime_debug = runtime_debug;
        self
    }

    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
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

    #[must_use]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.optimizer = self.optimizer.with_max_passes(max_passes);
        self
    }

    /// `<output>/<entry>.build`
    pub fn source_dir(&self) -> PathBuf {
        self.output_dir.join(format!("{}.build", self.entry_name))
    }

    /// Path the toolchain builds to, before it adds the artifact suffix.
    pub fn result_file(&self) -> PathBuf {
        self.output_dir.join(&self.entry_name)
    }

    /// The runtime version, defaulting to [`DEFAULT_RUNTIME_VERSION`].
    pub fn effective_runtime_version(&self) -> &str {
        self.runtime_version
            .as_deref()
            .unwrap_or(DEFAULT_RUNTIME_VERSION)
    }

    /// The job limit, defaulting to the available parallelism.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        })
    }
}
