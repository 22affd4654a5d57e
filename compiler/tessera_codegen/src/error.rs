use thiserror::Error;

use tessera_ir::{NodeId, NodeTag, QualifiedName};

use crate::EmitterKind;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodeGenerationError {
    /// A node was handed to an emitter for a different kind of construct.
    #[error("{tag} node {node:?} cannot be emitted as {expected}")]
    UnexpectedKind {
        node: NodeId,
        tag: NodeTag,
        expected: EmitterKind,
    },
    #[error("cannot release `{code}`: it is not an owned temporary")]
    ReleaseOfUnowned { code: String },
    /// A name reference or store without finalizer metadata.
    #[error("{tag} node {node:?} has no resolved binding")]
    UnresolvedBinding { node: NodeId, tag: NodeTag },
    #[error("dict node {node:?} has {keys} keys but {values} values")]
    UnpairedDict {
        node: NodeId,
        keys: usize,
        values: usize,
    },
    #[error("module `{module}` was not finalized before code generation")]
    NotFinalized { module: QualifiedName },
}
