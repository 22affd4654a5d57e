//! Tree optimizer for the Tessera compiler.
//!
//! Rewrites a module's node tree to a fixpoint and discovers the modules it
//! imports.
//!
//! # Pipeline Position
//!
//! ```text
//! Tree Builder → **Optimize + Discover** → Finalize → Codegen → Assembly
//! ```
//!
//! # Rewrites
//!
//! Each pass walks the live tree in pre-order and applies local rules
//! (`rules`):
//!
//! - constant folding of operators over constants (`fold`)
//! - constant tuple formation
//! - `len()` of a constant
//! - propagation of module-level names assigned once to a constant
//! - dead branch collapse of `if`, `while` and conditional expressions
//!
//! A rewrite retries the rewritten node, then cascades to its parent, so a
//! nested constant expression collapses in a single pass. Passes repeat
//! until one fires nothing. Every rule strictly decreases
//! [`NodeTree::weight`](tessera_ir::NodeTree::weight), which bounds the
//! number of passes; [`OptimizerConfig::max_passes`] turns a rule that
//! breaks this into an error instead of a hang.
//!
//! # Import Discovery
//!
//! After a tree reaches its fixpoint, its surviving imports are pushed onto
//! an [`ImportQueue`]. [`discover_modules`] drains the queue through a
//! [`TreeBuilder`](tessera_ir::TreeBuilder) until no new module appears.

mod config;
mod discover;
mod error;
pub mod fold;
mod fixpoint;
mod imports;
mod rules;

pub use config::OptimizerConfig;
pub use discover::{discover_modules, DiscoveryError};
pub use error::{AnomalyKind, OptimizationAnomaly, OptimizationError};
pub use fixpoint::{optimize_tree, OptimizationReport};
pub use imports::ImportQueue;
