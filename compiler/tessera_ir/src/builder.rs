//! The tree builder contract.
//!
//! Lexing and parsing live outside the compiler core. A [`TreeBuilder`]
//! turns a module name into a source location and a source location into a
//! raw [`NodeTree`]; the import discovery loop drives it.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{NodeTree, QualifiedName, Span};

/// Opaque handle for a module's source, as returned by [`TreeBuilder::locate`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceId(PathBuf);

impl SourceId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceId(path.into())
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Module name derived from the file stem (`dir/main.py` gives `main`).
    pub fn module_name(&self) -> QualifiedName {
        let stem = self
            .0
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        QualifiedName::new(stem)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0.display())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A source could not be turned into a tree.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{source_id}: {message}{}", at_span(.span))]
pub struct ParseError {
    pub source_id: SourceId,
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    pub fn new(source_id: SourceId, message: impl Into<String>) -> Self {
        ParseError {
            source_id,
            message: message.into(),
            span: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

fn at_span(span: &Option<Span>) -> String {
    span.map(|s| format!(" at {s}")).unwrap_or_default()
}

/// Produces raw trees for the compiler.
pub trait TreeBuilder {
    /// Where the source of `module` lives, or `None` if the module is not
    /// available for compilation (its import is left to the runtime).
    fn locate(&self, module: &QualifiedName) -> Option<SourceId>;

    /// Build the raw tree of one source. `is_entry` is set for the program's
    /// entry module.
    fn build(&mut self, source: &SourceId, is_entry: bool) -> Result<NodeTree, ParseError>;
}
