use thiserror::Error;

use tessera_ir::{Name, NodeTag, QualifiedName, Span};

/// A construct the finalizer rejects, with its location.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{module}: {kind} ({node} at {span})")]
pub struct FinalizationError {
    pub module: QualifiedName,
    pub node: NodeTag,
    pub span: Span,
    pub kind: FinalizationErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FinalizationErrorKind {
    #[error("'return' outside function")]
    ReturnOutsideFunction,
    #[error("'break' outside loop")]
    BreakOutsideLoop,
    #[error("'continue' not properly in loop")]
    ContinueOutsideLoop,
    #[error("nested function captures `{name}` from an enclosing function; closures are not supported")]
    UnsupportedClosure { name: Name },
    #[error("module `{name}` was located for compilation but is missing from the module set")]
    MissingModule { name: QualifiedName },
    #[error("module was already finalized")]
    AlreadyFinalized,
}
