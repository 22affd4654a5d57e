//! Import discovery: build and optimize every module reachable from the
//! entry module.

use thiserror::Error;
use tracing::{debug, info_span};

use tessera_ir::{
    ModuleKind, ModuleRecord, ModuleSet, NodeTree, ParseError, QualifiedName, SourceId,
    TreeBuilder,
};

use crate::{optimize_tree, ImportQueue, OptimizationError, OptimizerConfig};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("optimizing module `{module}`: {source}")]
    Optimization {
        module: QualifiedName,
        source: OptimizationError,
    },
}

/// Build the entry module, then every module it transitively imports that
/// the builder can locate, optimizing each tree to its fixpoint.
///
/// Imports the builder cannot locate are left to the runtime and produce no
/// record.
pub fn discover_modules(
    entry: &SourceId,
    builder: &mut dyn TreeBuilder,
    config: &OptimizerConfig,
) -> Result<ModuleSet, DiscoveryError> {
    let mut modules = ModuleSet::new();
    let mut queue = ImportQueue::new();

    let entry_name = entry.module_name();
    queue.mark_seen(entry_name.clone());
    let tree = builder.build(entry, true)?;
    add_module(
        &mut modules,
        &mut queue,
        config,
        entry_name,
        entry.clone(),
        tree,
        ModuleKind::Entry,
    )?;

    while let Some(name) = queue.pop() {
        let Some(source) = builder.locate(&name) else {
            debug!(module = %name, "not located, left to the runtime");
            continue;
        };
        modules.mark_located(name.clone());
        let tree = builder.build(&source, false)?;
        add_module(
            &mut modules,
            &mut queue,
            config,
            name,
            source,
            tree,
            ModuleKind::Importable,
        )?;
    }

    debug!(modules = modules.len(), "module set closed");
    Ok(modules)
}

fn add_module(
    modules: &mut ModuleSet,
    queue: &mut ImportQueue,
    config: &OptimizerConfig,
    name: QualifiedName,
    source: SourceId,
    mut tree: NodeTree,
    kind: ModuleKind,
) -> Result<(), DiscoveryError> {
    let _span = info_span!("optimize", module = %name).entered();
    let report = optimize_tree(&mut tree, config, queue).map_err(|source| {
        DiscoveryError::Optimization {
            module: name.clone(),
            source,
        }
    })?;
    debug!(
        passes = report.passes,
        rewrites = report.rewrites,
        anomalies = report.anomalies.len(),
        imports = report.imports_queued,
        "module optimized"
    );
    modules.insert(ModuleRecord {
        name,
        source,
        tree,
        kind,
    });
    Ok(())
}
