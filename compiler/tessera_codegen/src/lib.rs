//! C++ code generation for the Tessera compiler.
//!
//! Walks finalized module trees and produces translation units written
//! against the target runtime's C API.
//!
//! # Architecture
//!
//! ```text
//! finalized NodeTree + EmitMeta
//!        ↓
//!   CodeGenContext     (one per module; frames for functions and classes)
//!        ↓
//!   emit_statement / emit_expression  (exhaustive per-kind dispatch)
//!        ↓
//!   Identifier         (emitted code + reference ownership)
//!        ↓
//!   generate_*         (module, declaration, main and constants units)
//! ```
//!
//! A single [`GlobalContext`] is threaded through every module of a run. It
//! owns the [`ConstantPool`], so one constant value has one symbol across all
//! translation units, and the [`DeclarationRegistry`] of forward declarations
//! the shared constants header provides.

mod constants;
mod context;
mod declarations;
mod emit;
mod error;
mod identifier;
mod mangle;
mod unit;

pub use constants::{ConstantEntry, ConstantPool};
pub use context::{CodeGenContext, CodeWriter, GlobalContext};
pub use declarations::DeclarationRegistry;
pub use emit::{emit_expression, emit_statement, emitter_for, EmitterKind};
pub use error::CodeGenerationError;
pub use identifier::{ConstructorContract, Identifier, Ownership};
pub use mangle::{mangle_identifier, mangle_module};
pub use unit::{
    generate_constants_declaration, generate_constants_definition, generate_extension_module_code,
    generate_main_code, generate_module_code, generate_module_declaration, MAIN_MODULE_NAME,
};
