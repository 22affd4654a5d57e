//! Tessera compiler driver.
//!
//! Ties the pipeline together and owns everything that touches the outside
//! world:
//!
//! - [`BuildOptions`]: the options of one compilation
//! - tree builders: [`InMemoryBuilder`], [`SerializedTreeBuilder`]
//! - source assembly into `<output>/<entry>.build/` ([`assemble_sources`])
//! - the native build ([`Toolchain`], [`SconsToolchain`])
//! - running the artifact ([`launch()`])
//! - tree inspection ([`TreeRenderer`], [`dump_tree`])
//!
//! The `tesserac` binary is a thin command-line layer over [`compile`],
//! [`build`] and [`launch()`].

mod assembly;
mod builder;
mod driver;
mod error;
mod launch;
mod options;
mod render;
mod toolchain;

pub use assembly::{
    assemble_sources, AssemblyError, SourceDirectory, CONSTANTS_HEADER, CONSTANTS_SOURCE,
    MAIN_SOURCE,
};
pub use builder::{
    decode_tree, encode_tree, InMemoryBuilder, SerializedTreeBuilder, TREE_EXTENSION,
};
pub use driver::{build, compile, generate_sources, load_program, make_module_source};
pub use error::{CompileError, Phase};
pub use launch::{interpreter, launch, launch_command, LaunchError};
pub use options::{BuildOptions, DEFAULT_RUNTIME_VERSION};
pub use render::{dump_tree, TextRenderer, TreeRenderer};
pub use toolchain::{
    BuildConfig, BuildError, BuildOutcome, SconsToolchain, Toolchain, SCONS_DIR_VAR, SCONS_SCRIPT,
};

/// Install the log subscriber when `RUST_LOG` is set.
///
/// Uses an indented tree layout so spans of nested stages read as a call
/// tree. Safe to call more than once.
pub fn init_tracing() {
    use std::sync::Once;

    use tracing_subscriber::{prelude::*, EnvFilter};
    use tracing_tree::HierarchicalLayer;

    static TRACING_INIT: Once = Once::new();

    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(
                    HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
