//! Pending module imports.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tessera_ir::{NodeKind, QualifiedName};

/// Work list of modules to locate and build.
///
/// Each distinct name is queued at most once over the queue's lifetime,
/// so a module that imports itself (or a cycle of modules) terminates.
#[derive(Clone, Debug, Default)]
pub struct ImportQueue {
    seen: FxHashSet<QualifiedName>,
    pending: VecDeque<QualifiedName>,
}

impl ImportQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `name` unless it was queued (or marked seen) before.
    pub fn push(&mut self, name: QualifiedName) -> bool {
        if self.seen.insert(name.clone()) {
            self.pending.push_back(name);
            true
        } else {
            false
        }
    }

    /// Record `name` as handled without queueing it (the entry module).
    pub fn mark_seen(&mut self, name: QualifiedName) {
        self.seen.insert(name);
    }

    pub fn pop(&mut self) -> Option<QualifiedName> {
        self.pending.pop_front()
    }

    /// Queue the modules an import statement needs: every package on the
    /// dotted path, and for `from m import n` also `m.n`, which may be a
    /// submodule. Returns how many names were newly queued.
    pub fn request(&mut self, statement: &NodeKind) -> usize {
        let mut queued = 0;
        match statement {
            NodeKind::Import { module, .. } => {
                for prefix in module.prefixes() {
                    queued += usize::from(self.push(prefix));
                }
            }
            NodeKind::ImportFrom { module, names } => {
                for prefix in module.prefixes() {
                    queued += usize::from(self.push(prefix));
                }
                for imported in names {
                    queued += usize::from(self.push(module.child(&imported.name)));
                }
            }
            _ => {}
        }
        queued
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn was_seen(&self, name: &QualifiedName) -> bool {
        self.seen.contains(name)
    }
}
