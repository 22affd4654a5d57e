//! Arena-backed node tree.
//!
//! Every node is owned by exactly one parent; `parent` back-references exist
//! for queries only. Nodes removed by a rewrite stay in the arena but lose
//! their parent link, so they are no longer reachable from the root.
//!
//! Rewrites go through [`NodeTree::replace`], which rejects new kinds that
//! would share a node with another attached subtree or place a node under
//! its own descendant.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{EmitMeta, NodeId, NodeKind, Span};

/// A node and its bookkeeping.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    parent: Option<NodeId>,
    meta: EmitMeta,
}

impl Node {
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn meta(&self) -> &EmitMeta {
        &self.meta
    }
}

/// Structural violations detected when rewriting or validating a tree.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("rewrite of {node:?} would place an ancestor ({child:?}) beneath it")]
    WouldCycle { node: NodeId, child: NodeId },
    #[error("{child:?} is already owned by {owner:?}")]
    SharedNode { child: NodeId, owner: NodeId },
    #[error("{node:?} has no statement list in slot {slot}")]
    NoStatementList { node: NodeId, slot: usize },
    #[error("dict {node:?} has {keys} keys but {values} values")]
    UnpairedDict {
        node: NodeId,
        keys: usize,
        values: usize,
    },
    #[error("{child:?} records parent {recorded:?} but is a child of {actual:?}")]
    ParentMismatch {
        child: NodeId,
        recorded: Option<NodeId>,
        actual: NodeId,
    },
}

/// Position of a statement inside its owner's statement list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatementSlot {
    pub owner: NodeId,
    pub slot: usize,
    pub index: usize,
}

/// The node tree of one module.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeTree {
    nodes: Vec<Node>,
    root: NodeId,
    finalized: bool,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// A tree holding an empty `Module` root.
    pub fn new() -> Self {
        NodeTree {
            nodes: vec![Node {
                kind: NodeKind::Module { body: Vec::new() },
                span: Span::DUMMY,
                parent: None,
                meta: EmitMeta::default(),
            }],
            root: NodeId::new(0),
            finalized: false,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node. Its children are re-parented to it.
    ///
    /// Children must be fresh (not yet linked anywhere); [`Self::validate`]
    /// reports trees where that was not respected.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        for child in kind.children() {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            meta: EmitMeta::default(),
        });
        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    #[inline]
    pub fn meta(&self, id: NodeId) -> &EmitMeta {
        &self.nodes[id.index()].meta
    }

    #[inline]
    pub fn meta_mut(&mut self, id: NodeId) -> &mut EmitMeta {
        &mut self.nodes[id.index()].meta
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Whether `ancestor` lies on the parent chain of `id` (or is `id`).
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Replace the kind of `id` in place.
    ///
    /// Each child of `kind` must be a fresh node, a current child of `id`,
    /// or a deeper descendant of `id` (hoisting). Former children that are
    /// not kept are detached together with their subtrees.
    pub fn replace(&mut self, id: NodeId, kind: NodeKind) -> Result<(), TreeError> {
        let new_children = kind.children();
        let mut seen = FxHashSet::default();
        for &child in &new_children {
            if self.is_ancestor_or_self(child, id) {
                return Err(TreeError::WouldCycle { node: id, child });
            }
            if !seen.insert(child) {
                return Err(TreeError::SharedNode { child, owner: id });
            }
            if let Some(owner) = self.parent(child) {
                if !self.is_ancestor_or_self(id, owner) {
                    return Err(TreeError::SharedNode { child, owner });
                }
            }
        }

        for old in self.nodes[id.index()].kind.children() {
            if !seen.contains(&old) {
                self.nodes[old.index()].parent = None;
            }
        }
        for &child in &new_children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes[id.index()].kind = kind;
        Ok(())
    }

    /// Replace `id` by its descendant `descendant`: `id` takes over the
    /// descendant's kind and span, and the descendant node itself is
    /// detached.
    pub fn hoist(&mut self, id: NodeId, descendant: NodeId) -> Result<(), TreeError> {
        if descendant == id || !self.is_ancestor_or_self(id, descendant) {
            return Err(TreeError::SharedNode {
                child: descendant,
                owner: self.parent(descendant).unwrap_or(descendant),
            });
        }
        let kind = self.kind(descendant).clone();
        let span = self.span(descendant);
        self.replace(id, kind)?;
        self.nodes[descendant.index()].parent = None;
        self.nodes[id.index()].span = span;
        Ok(())
    }

    /// Replace one statement list of `owner`.
    pub fn set_statement_list(
        &mut self,
        owner: NodeId,
        slot: usize,
        statements: Vec<NodeId>,
    ) -> Result<(), TreeError> {
        let mut kind = self.kind(owner).clone();
        let list = kind
            .statement_list_mut(slot)
            .ok_or(TreeError::NoStatementList { node: owner, slot })?;
        *list = statements;
        self.replace(owner, kind)
    }

    /// Append a fresh statement to one statement list of `owner`.
    pub fn push_statement(
        &mut self,
        owner: NodeId,
        slot: usize,
        statement: NodeId,
    ) -> Result<(), TreeError> {
        let mut statements = self
            .kind(owner)
            .statement_list(slot)
            .ok_or(TreeError::NoStatementList { node: owner, slot })?
            .to_vec();
        statements.push(statement);
        self.set_statement_list(owner, slot, statements)
    }

    /// Where `id` sits if it is an element of its parent's statement list.
    pub fn statement_slot(&self, id: NodeId) -> Option<StatementSlot> {
        let owner = self.parent(id)?;
        let kind = self.kind(owner);
        (0..kind.statement_list_count()).find_map(|slot| {
            let list = kind.statement_list(slot)?;
            let index = list.iter().position(|&s| s == id)?;
            Some(StatementSlot { owner, slot, index })
        })
    }

    /// Attached nodes in pre-order, starting at `start`.
    pub fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children = self.kind(id).children();
            stack.extend(children.iter().rev().copied());
        }
        order
    }

    /// All attached nodes in pre-order.
    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_from(self.root)
    }

    /// Termination measure of the optimizer: constants weigh 1, every other
    /// attached node weighs 2.
    pub fn weight(&self) -> usize {
        self.preorder()
            .into_iter()
            .map(|id| if self.kind(id).is_constant() { 1 } else { 2 })
            .sum()
    }

    /// Check exclusive ownership and parent links of every attached node,
    /// and that every dict pairs each key with a value.
    pub fn validate(&self) -> Result<(), TreeError> {
        let mut visited = FxHashSet::default();
        let mut stack = vec![self.root];
        visited.insert(self.root);
        while let Some(id) = stack.pop() {
            if let NodeKind::Dict { keys, values } = self.kind(id) {
                if keys.len() != values.len() {
                    return Err(TreeError::UnpairedDict {
                        node: id,
                        keys: keys.len(),
                        values: values.len(),
                    });
                }
            }
            for child in self.kind(id).children() {
                if !visited.insert(child) {
                    return Err(if self.is_ancestor_or_self(child, id) {
                        TreeError::WouldCycle { node: id, child }
                    } else {
                        TreeError::SharedNode { child, owner: id }
                    });
                }
                if self.parent(child) != Some(id) {
                    return Err(TreeError::ParentMismatch {
                        child,
                        recorded: self.parent(child),
                        actual: id,
                    });
                }
                stack.push(child);
            }
        }
        Ok(())
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn mark_finalized(&mut self) {
        self.finalized = true;
    }
}

#[cfg(test)]
mod tests;
