#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

//! Whole-pipeline tests: trees in, translation units on disk out.
//!
//! The native toolchain is not run here; `build` is covered with a
//! recording toolchain in the crate's unit tests.
//!
//! # Organization
//!
//! - `common` - program fixtures and directory helpers
//! - `end_to_end` - entry plus imports through to written sources
//! - `layout` - directory hygiene, write order, determinism
//! - `modes` - program versus extension module builds
//! - `serialized` - trees loaded from disk by `SerializedTreeBuilder`

#[path = "pipeline/common.rs"]
mod common;

#[path = "pipeline/end_to_end.rs"]
mod end_to_end;

#[path = "pipeline/layout.rs"]
mod layout;

#[path = "pipeline/modes.rs"]
mod modes;

#[path = "pipeline/serialized.rs"]
mod serialized;
