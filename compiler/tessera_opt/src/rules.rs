//! Local rewrite rules.
//!
//! Every rule replaces a node by a fresh constant leaf, by one of its own
//! descendants, or splices a statement's chosen body into the enclosing
//! statement list. Each of these lowers the tree weight.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use tessera_ir::{
    ConstValue, Name, NodeId, NodeKind, NodeTree, Resolution, ScopeIndex, TreeError,
};

use crate::fold::{fold_binary, fold_compare, fold_unary, short_circuit, FoldResult, ShortCircuit};
use crate::{AnomalyKind, OptimizationAnomaly};

/// Facts computed once per pass.
///
/// Rewrites only remove bindings and never reorder statements, so facts
/// gathered at the start of a pass stay conservative for the whole pass.
pub(crate) struct PassFacts {
    scopes: ScopeIndex,
    positions: FxHashMap<NodeId, usize>,
}

impl PassFacts {
    pub(crate) fn gather(tree: &NodeTree, order: &[NodeId]) -> Self {
        PassFacts {
            scopes: ScopeIndex::build(tree),
            positions: order.iter().enumerate().map(|(i, &id)| (id, i)).collect(),
        }
    }
}

/// Anomalies found so far, deduplicated across passes.
#[derive(Default)]
pub(crate) struct AnomalySink {
    seen: FxHashSet<OptimizationAnomaly>,
    pub(crate) found: Vec<OptimizationAnomaly>,
}

impl AnomalySink {
    fn record(&mut self, tree: &NodeTree, node: NodeId, kind: AnomalyKind) {
        let anomaly = OptimizationAnomaly {
            node,
            span: tree.span(node),
            kind,
        };
        if self.seen.insert(anomaly) {
            debug!(%anomaly, "optimization anomaly");
            self.found.push(anomaly);
        }
    }
}

/// Apply the first matching rule to `id`. Returns the rule's name if the
/// tree changed.
pub(crate) fn apply(
    tree: &mut NodeTree,
    facts: &PassFacts,
    anomalies: &mut AnomalySink,
    id: NodeId,
) -> Result<Option<&'static str>, TreeError> {
    match tree.kind(id) {
        NodeKind::BinaryOp { op, left, right } => {
            let (op, left, right) = (*op, *left, *right);
            fold_pair(tree, anomalies, id, left, right, |l, r| fold_binary(op, l, r))
        }
        NodeKind::Compare { op, left, right } => {
            let (op, left, right) = (*op, *left, *right);
            fold_pair(tree, anomalies, id, left, right, |l, r| fold_compare(op, l, r))
        }
        NodeKind::UnaryOp { op, operand } => {
            let op = *op;
            let Some(value) = tree.kind(*operand).as_constant() else {
                return Ok(None);
            };
            let result = fold_unary(op, value);
            finish_fold(tree, anomalies, id, result)
        }
        NodeKind::BoolOp { op, left, right } => {
            let Some(value) = tree.kind(*left).as_constant() else {
                return Ok(None);
            };
            let chosen = match short_circuit(*op, value) {
                ShortCircuit::Left => *left,
                ShortCircuit::Right => *right,
            };
            tree.hoist(id, chosen)?;
            Ok(Some("short-circuit"))
        }
        NodeKind::Conditional {
            cond,
            then_value,
            else_value,
        } => {
            let Some(value) = tree.kind(*cond).as_constant() else {
                return Ok(None);
            };
            let chosen = if value.is_truthy() {
                *then_value
            } else {
                *else_value
            };
            tree.hoist(id, chosen)?;
            Ok(Some("dead-branch"))
        }
        NodeKind::Tuple { elements } => {
            let values: Option<Vec<ConstValue>> = elements
                .iter()
                .map(|&e| tree.kind(e).as_constant().cloned())
                .collect();
            let Some(values) = values else {
                return Ok(None);
            };
            tree.replace(id, NodeKind::Constant(ConstValue::Tuple(values)))?;
            Ok(Some("constant-tuple"))
        }
        NodeKind::Call { callee, args } => {
            let (callee, args) = (*callee, args.clone());
            builtin_len(tree, facts, anomalies, id, callee, &args)
        }
        NodeKind::Name(name) => {
            let name = name.clone();
            propagate_constant(tree, facts, id, &name)
        }
        NodeKind::If {
            cond,
            then_body,
            else_body,
        } => {
            let Some(value) = tree.kind(*cond).as_constant() else {
                return Ok(None);
            };
            let chosen = if value.is_truthy() {
                then_body.clone()
            } else {
                else_body.clone()
            };
            splice(tree, id, chosen)
        }
        NodeKind::While { cond, .. } => {
            let never_runs =
                matches!(tree.kind(*cond).as_constant(), Some(value) if !value.is_truthy());
            if never_runs {
                splice(tree, id, Vec::new())
            } else {
                Ok(None)
            }
        }
        _ => Ok(None),
    }
}

fn fold_pair(
    tree: &mut NodeTree,
    anomalies: &mut AnomalySink,
    id: NodeId,
    left: NodeId,
    right: NodeId,
    fold: impl FnOnce(&ConstValue, &ConstValue) -> FoldResult,
) -> Result<Option<&'static str>, TreeError> {
    let (Some(l), Some(r)) = (tree.kind(left).as_constant(), tree.kind(right).as_constant())
    else {
        return Ok(None);
    };
    let result = fold(l, r);
    finish_fold(tree, anomalies, id, result)
}

fn finish_fold(
    tree: &mut NodeTree,
    anomalies: &mut AnomalySink,
    id: NodeId,
    result: FoldResult,
) -> Result<Option<&'static str>, TreeError> {
    match result {
        Ok(Some(value)) => {
            tree.replace(id, NodeKind::Constant(value))?;
            Ok(Some("constant-fold"))
        }
        Ok(None) => Ok(None),
        Err(kind) => {
            anomalies.record(tree, id, kind);
            Ok(None)
        }
    }
}

/// `len(<constant>)` where `len` is the builtin.
fn builtin_len(
    tree: &mut NodeTree,
    facts: &PassFacts,
    anomalies: &mut AnomalySink,
    id: NodeId,
    callee: NodeId,
    args: &[NodeId],
) -> Result<Option<&'static str>, TreeError> {
    let NodeKind::Name(name) = tree.kind(callee) else {
        return Ok(None);
    };
    if name.as_str() != "len" || facts.scopes.resolve(callee, name) != Resolution::Builtin {
        return Ok(None);
    }
    let [arg] = args else {
        anomalies.record(
            tree,
            id,
            AnomalyKind::BuiltinArity {
                builtin: "len",
                expected: 1,
                found: args.len(),
            },
        );
        return Ok(None);
    };
    let Some(len) = tree
        .kind(*arg)
        .as_constant()
        .and_then(ConstValue::sized_len)
        .and_then(|len| i64::try_from(len).ok())
    else {
        return Ok(None);
    };
    tree.replace(id, NodeKind::Constant(ConstValue::Int(len)))?;
    Ok(Some("builtin-len"))
}

/// Replace a load of a module-level name by its value when the name is
/// bound exactly once, by a module-body assignment of a constant that
/// precedes the load.
fn propagate_constant(
    tree: &mut NodeTree,
    facts: &PassFacts,
    id: NodeId,
    name: &Name,
) -> Result<Option<&'static str>, TreeError> {
    if facts.scopes.resolve(id, name) != Resolution::Module {
        return Ok(None);
    }
    let [site] = facts.scopes.module_binding_sites(name) else {
        return Ok(None);
    };
    if tree.parent(*site) != Some(tree.root()) {
        return Ok(None);
    }
    let NodeKind::Assign { value, .. } = tree.kind(*site) else {
        return Ok(None);
    };
    let Some(constant) = tree.kind(*value).as_constant() else {
        return Ok(None);
    };
    let (Some(site_pos), Some(ref_pos)) = (facts.positions.get(site), facts.positions.get(&id))
    else {
        return Ok(None);
    };
    if ref_pos <= site_pos {
        return Ok(None);
    }
    let constant = constant.clone();
    tree.replace(id, NodeKind::Constant(constant))?;
    Ok(Some("constant-propagation"))
}

/// Replace statement `id` by `body` in its owner's statement list.
fn splice(
    tree: &mut NodeTree,
    id: NodeId,
    body: Vec<NodeId>,
) -> Result<Option<&'static str>, TreeError> {
    let Some(slot) = tree.statement_slot(id) else {
        return Ok(None);
    };
    let Some(current) = tree.kind(slot.owner).statement_list(slot.slot) else {
        return Ok(None);
    };
    let mut statements = current.to_vec();
    statements.splice(slot.index..=slot.index, body);
    tree.set_statement_list(slot.owner, slot.slot, statements)?;
    Ok(Some("dead-branch"))
}
