//! Finalization for the Tessera compiler.
//!
//! The last tree pass before code generation. Runs exactly once per module,
//! after the module set is frozen, and attaches the [`EmitMeta`] code
//! generation reads:
//!
//! - scope layouts of the module, every function, lambda and class
//! - a [`Binding`] for every name load and store
//! - an [`ImportResolution`] for every import statement
//! - a [`Specialization`] for calls to recognized builtins
//!
//! It also rejects programs the emitter cannot express: `return` outside a
//! function, `break`/`continue` outside a loop, and nested functions that
//! capture an enclosing function's locals.
//!
//! [`EmitMeta`]: tessera_ir::EmitMeta
//! [`Binding`]: tessera_ir::Binding
//! [`ImportResolution`]: tessera_ir::ImportResolution
//! [`Specialization`]: tessera_ir::Specialization

mod error;
mod walk;

pub use error::{FinalizationError, FinalizationErrorKind};
pub use walk::{finalize_all, finalize_module, ImportTable};
