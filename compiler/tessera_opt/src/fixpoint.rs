//! The fixpoint driver.

use tracing::{debug, trace};

use tessera_ir::NodeTree;

use crate::rules::{self, AnomalySink, PassFacts};
use crate::{ImportQueue, OptimizationAnomaly, OptimizationError, OptimizerConfig};

/// Outcome of optimizing one tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptimizationReport {
    /// Passes run, including the final pass that changed nothing.
    pub passes: usize,
    pub rewrites: usize,
    pub initial_weight: usize,
    pub final_weight: usize,
    pub anomalies: Vec<OptimizationAnomaly>,
    /// Import targets newly queued by this tree.
    pub imports_queued: usize,
}

/// Rewrite `tree` until no rule fires, then queue its imports.
pub fn optimize_tree(
    tree: &mut NodeTree,
    config: &OptimizerConfig,
    imports: &mut ImportQueue,
) -> Result<OptimizationReport, OptimizationError> {
    let mut report = OptimizationReport {
        initial_weight: tree.weight(),
        ..OptimizationReport::default()
    };
    let mut anomalies = AnomalySink::default();

    loop {
        if report.passes >= config.max_passes {
            return Err(OptimizationError::NoFixpoint {
                passes: report.passes,
                weight: tree.weight(),
            });
        }
        report.passes += 1;
        let rewrites = run_pass(tree, &mut anomalies)?;
        report.rewrites += rewrites;
        debug!(
            pass = report.passes,
            rewrites,
            weight = tree.weight(),
            "optimization pass"
        );
        if rewrites == 0 {
            break;
        }
    }

    for id in tree.preorder() {
        report.imports_queued += imports.request(tree.kind(id));
    }
    report.final_weight = tree.weight();
    report.anomalies = anomalies.found;
    Ok(report)
}

/// One pre-order sweep. A node that was rewritten is retried, then its
/// parent is tried, so rewrites cascade toward the root.
fn run_pass(tree: &mut NodeTree, anomalies: &mut AnomalySink) -> Result<usize, OptimizationError> {
    let order = tree.preorder();
    let facts = PassFacts::gather(tree, &order);
    let mut rewrites = 0;

    for id in order {
        let mut current = id;
        while tree.is_attached(current) {
            let mut fired = false;
            while let Some(rule) = rules::apply(tree, &facts, anomalies, current)? {
                trace!(node = ?current, rule, "rewrite");
                fired = true;
                rewrites += 1;
                if !tree.is_attached(current) {
                    break;
                }
            }
            match tree.parent(current) {
                Some(parent) if fired => current = parent,
                _ => break,
            }
        }
    }
    Ok(rewrites)
}
