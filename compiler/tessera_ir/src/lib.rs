//! Tessera IR - Node Tree and Module Records
//!
//! This crate contains the data model shared by every stage of the compiler:
//! - Names and qualified module names
//! - Source spans
//! - Constant values with structural equality
//! - The node tree (arena of [`Node`]s addressed by [`NodeId`])
//! - Emission metadata attached by the finalizer
//! - Scope queries (which names a scope binds, how a reference resolves)
//! - Module records and the module set
//! - The tree builder contract consumed by the pipeline
//!
//! # Design Philosophy
//!
//! - **Closed node set**: [`NodeKind`] is a sum type; every pass matches it
//!   exhaustively, so adding a kind is a compile-time obligation everywhere.
//! - **Arena storage**: children are `NodeId` indices, parents are
//!   back-references only. Rewrites replace a node in place.
//! - **Structure only**: nothing here optimizes or emits code.
//!
//! Floats are stored as `u64` bits so constants can be hashed and compared
//! structurally.

pub mod builder;
mod constant;
pub mod construct;
mod meta;
mod module;
mod name;
mod node;
pub mod scope;
mod span;
mod stack;
mod tree;

pub use builder::{ParseError, SourceId, TreeBuilder};
pub use constant::ConstValue;
pub use meta::{Binding, EmitMeta, ImportResolution, ScopeLayout, Specialization};
pub use module::{FrozenModuleSet, ModuleKind, ModuleRecord, ModuleSet};
pub use name::{Name, QualifiedName};
pub use node::{
    BinaryOp, BoolOp, CompareOp, ImportedName, NodeCategory, NodeId, NodeKind, NodeTag, UnaryOp,
};
pub use scope::{Resolution, ScopeIndex, ScopeKind};
pub use span::Span;
pub use stack::ensure_sufficient_stack;
pub use tree::{Node, NodeTree, StatementSlot, TreeError};
