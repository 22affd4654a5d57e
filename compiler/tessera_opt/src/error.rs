//! Optimizer errors and anomalies.

use thiserror::Error;

use tessera_ir::{NodeId, Span, TreeError};

/// Fatal optimizer failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OptimizationError {
    /// The pass ceiling was reached while rules were still firing.
    #[error("no fixpoint after {passes} passes (tree weight {weight})")]
    NoFixpoint { passes: usize, weight: usize },
    /// A rewrite violated tree ownership. Indicates a broken rule.
    #[error("invalid rewrite: {0}")]
    Tree(#[from] TreeError),
}

/// Why a rule declined to rewrite a node it otherwise matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    IntegerOverflow,
    DivisionByZero,
    NegativeShift,
    BuiltinArity {
        builtin: &'static str,
        expected: usize,
        found: usize,
    },
}

/// A non-fatal finding: the node is left for the runtime to evaluate (and,
/// typically, to raise).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("{kind} at {span}")]
pub struct OptimizationAnomaly {
    pub node: NodeId,
    pub span: Span,
    pub kind: AnomalyKind,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyKind::IntegerOverflow => f.write_str("integer overflow in constant expression"),
            AnomalyKind::DivisionByZero => f.write_str("division by zero in constant expression"),
            AnomalyKind::NegativeShift => f.write_str("negative shift count"),
            AnomalyKind::BuiltinArity {
                builtin,
                expected,
                found,
            } => write!(
                f,
                "{builtin}() takes {expected} argument(s) but {found} were given"
            ),
        }
    }
}
