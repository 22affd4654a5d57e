//! The compilation pipeline.
//!
//! ```text
//! TreeBuilder → discover + optimize → freeze → finalize → assemble → build → launch
//! ```
//!
//! Each step is a separate function so the CLI can stop after any of them
//! (`--dump-tree` stops after optimization).

use tracing::{debug, info, info_span};

use tessera_codegen::{generate_module_code, GlobalContext};
use tessera_finalize::{finalize_all, finalize_module, ImportTable};
use tessera_ir::{FrozenModuleSet, NodeTree, QualifiedName, SourceId, TreeBuilder};
use tessera_opt::{discover_modules, optimize_tree, ImportQueue, OptimizerConfig};

use crate::{
    assemble_sources, BuildConfig, BuildOptions, BuildOutcome, CompileError, SourceDirectory,
    Toolchain,
};

/// Build, optimize and collect the entry module and everything it imports
/// that the builder can locate.
pub fn load_program(
    entry: &SourceId,
    builder: &mut dyn TreeBuilder,
    options: &BuildOptions,
) -> Result<FrozenModuleSet, CompileError> {
    let modules = discover_modules(entry, builder, &options.optimizer)?;
    Ok(modules.freeze())
}

/// Finalize every module and write all translation units.
pub fn generate_sources(
    mut modules: FrozenModuleSet,
    options: &BuildOptions,
) -> Result<SourceDirectory, CompileError> {
    let imports = if options.module_mode {
        ImportTable::from_modules(&modules)
    } else {
        ImportTable::for_program(&modules)
    };
    finalize_all(&mut modules, &imports)?;
    let mut global = GlobalContext::new();
    let sources = assemble_sources(&modules, &mut global, options)?;
    info!(
        modules = modules.len(),
        dir = %sources.path().display(),
        "sources written"
    );
    Ok(sources)
}

/// [`load_program`] followed by [`generate_sources`].
pub fn compile(
    entry: &SourceId,
    builder: &mut dyn TreeBuilder,
    options: &BuildOptions,
) -> Result<SourceDirectory, CompileError> {
    let _span = info_span!("compile", entry = %entry).entered();
    let modules = load_program(entry, builder, options)?;
    generate_sources(modules, options)
}

/// Run the native toolchain over written sources.
pub fn build(
    sources: &SourceDirectory,
    options: &BuildOptions,
    toolchain: &dyn Toolchain,
) -> Result<BuildOutcome, CompileError> {
    let config = BuildConfig::new(options, sources);
    debug!(config = ?config, "build configuration");
    Ok(toolchain.build(&config)?)
}

/// Optimize, finalize and generate one module on its own, with a fresh
/// global context. Every import is left to the runtime.
///
/// The returned unit still refers to the pool symbols it used; it is meant
/// for inspecting what a module translates to.
pub fn make_module_source(
    mut tree: NodeTree,
    module: &QualifiedName,
    config: &OptimizerConfig,
) -> Result<String, CompileError> {
    let mut queue = ImportQueue::new();
    optimize_tree(&mut tree, config, &mut queue).map_err(|source| {
        tessera_opt::DiscoveryError::Optimization {
            module: module.clone(),
            source,
        }
    })?;
    finalize_module(&mut tree, module, &ImportTable::default())?;
    let mut global = GlobalContext::new();
    generate_module_code(&tree, module, module.as_str(), &mut global).map_err(|source| {
        CompileError::CodeGeneration {
            module: module.clone(),
            source,
        }
    })
}
