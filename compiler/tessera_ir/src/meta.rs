//! Emission metadata attached by the finalizer.
//!
//! A raw tree carries default (empty) metadata on every node; the finalizer
//! fills in what code generation needs and nothing else reads it earlier.

use crate::{Name, QualifiedName};

/// Where a name reference (or store) lives at run time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Binding {
    /// Function-local variable in the given slot of the enclosing scope
    /// layout (parameters occupy the first slots).
    Local { slot: u32 },
    /// Entry of the module's globals table.
    ModuleGlobal,
    /// Entry of the class namespace being built.
    ClassLocal,
    /// Not bound anywhere in the module; looked up as a builtin at run time.
    Builtin,
}

/// How an import statement is satisfied.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImportResolution {
    /// The module is part of the compiled set and initialized from the
    /// embedded module table.
    Compiled(QualifiedName),
    /// Left to the target runtime's import machinery.
    Runtime,
}

impl ImportResolution {
    #[inline]
    pub fn is_compiled(&self) -> bool {
        matches!(self, ImportResolution::Compiled(_))
    }
}

/// Specialized lowering for a call whose callee resolves to a builtin.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Specialization {
    BuiltinLen,
    BuiltinRepr,
    BuiltinIsinstance,
}

impl Specialization {
    /// Builtin name and exact argument count this specialization applies to.
    pub fn for_builtin(name: &str, arg_count: usize) -> Option<Self> {
        match (name, arg_count) {
            ("len", 1) => Some(Specialization::BuiltinLen),
            ("repr", 1) => Some(Specialization::BuiltinRepr),
            ("isinstance", 2) => Some(Specialization::BuiltinIsinstance),
            _ => None,
        }
    }

    /// Runtime helper implementing the specialized call.
    pub fn helper(self) -> &'static str {
        match self {
            Specialization::BuiltinLen => "BUILTIN_LEN",
            Specialization::BuiltinRepr => "BUILTIN_REPR",
            Specialization::BuiltinIsinstance => "BUILTIN_ISINSTANCE",
        }
    }
}

/// Variables owned by a scope-owning node.
///
/// For functions and lambdas, `locals` starts with the parameters (`params`
/// of them), then the other bound names in first-binding order. For classes
/// and modules `params` is zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScopeLayout {
    pub locals: Vec<Name>,
    pub params: u32,
}

impl ScopeLayout {
    pub fn slot_of(&self, name: &Name) -> Option<u32> {
        self.locals
            .iter()
            .position(|local| local == name)
            .and_then(|slot| u32::try_from(slot).ok())
    }
}

/// Per-node metadata consumed by code generation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmitMeta {
    /// `Name` references, `Assign`/`For`/`Delete` targets, definition names.
    pub binding: Option<Binding>,
    /// Store bindings for statements binding several names (`ImportFrom`,
    /// one entry per imported name; `Global` is left empty).
    pub target_bindings: Vec<Binding>,
    pub import: Option<ImportResolution>,
    pub specialization: Option<Specialization>,
    pub scope: Option<ScopeLayout>,
}
