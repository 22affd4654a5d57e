//! Scope queries over a node tree.
//!
//! [`ScopeIndex::build`] walks a tree once and records, for every attached
//! node, the scope it is evaluated in, and for every scope the names it
//! binds. The optimizer uses it to decide whether a module-level name is a
//! constant; the finalizer uses it to compute bindings and scope layouts.
//!
//! Scoping follows the source language: functions, lambdas and class bodies
//! open scopes; a definition's name and a class's bases belong to the
//! enclosing scope; class scopes are invisible from functions nested in
//! them; `global` redirects both loads and stores to the module.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Name, NodeId, NodeKind, NodeTree, ScopeLayout};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Module,
    Function,
    Class,
}

/// Outcome of resolving a name at a given node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Local of the scope the reference is evaluated in.
    Local { owner: NodeId, slot: u32 },
    /// Bound in the class body being evaluated.
    Class { owner: NodeId },
    /// Bound at module level.
    Module,
    /// Not bound in the module; a builtin at run time.
    Builtin,
    /// Local of an enclosing function (a closure capture).
    Enclosing { owner: NodeId },
}

#[derive(Clone, Debug)]
struct ScopeInfo {
    kind: ScopeKind,
    parent: Option<NodeId>,
    locals: Vec<Name>,
    params: usize,
    globals: FxHashSet<Name>,
}

impl ScopeInfo {
    fn new(kind: ScopeKind, parent: Option<NodeId>, params: &[Name]) -> Self {
        ScopeInfo {
            kind,
            parent,
            locals: params.to_vec(),
            params: params.len(),
            globals: FxHashSet::default(),
        }
    }

    fn slot_of(&self, name: &Name) -> Option<u32> {
        self.locals
            .iter()
            .position(|local| local == name)
            .and_then(|slot| u32::try_from(slot).ok())
    }
}

/// Scope information for one tree.
#[derive(Clone, Debug)]
pub struct ScopeIndex {
    root: NodeId,
    /// Scope owners in pre-order.
    owners: Vec<NodeId>,
    scopes: FxHashMap<NodeId, ScopeInfo>,
    scope_of: FxHashMap<NodeId, NodeId>,
    module_sites: FxHashMap<Name, Vec<NodeId>>,
}

impl ScopeIndex {
    pub fn build(tree: &NodeTree) -> Self {
        let root = tree.root();
        let mut index = ScopeIndex {
            root,
            owners: vec![root],
            scopes: FxHashMap::default(),
            scope_of: FxHashMap::default(),
            module_sites: FxHashMap::default(),
        };
        index
            .scopes
            .insert(root, ScopeInfo::new(ScopeKind::Module, None, &[]));

        // (scope, name, binding site) in pre-order; applied after the walk so
        // `global` declarations are known for every scope.
        let mut bindings: Vec<(NodeId, Name, NodeId)> = Vec::new();

        let mut stack = vec![(root, root)];
        while let Some((id, scope)) = stack.pop() {
            index.scope_of.insert(id, scope);
            let kind = tree.kind(id);
            let mut children: Vec<(NodeId, NodeId)> = Vec::new();
            match kind {
                NodeKind::FunctionDef { name, params, body } => {
                    bindings.push((scope, name.clone(), id));
                    index.open(id, ScopeKind::Function, scope, params);
                    children.extend(body.iter().map(|&c| (c, id)));
                }
                NodeKind::Lambda { params, body } => {
                    index.open(id, ScopeKind::Function, scope, params);
                    children.push((*body, id));
                }
                NodeKind::ClassDef { name, bases, body } => {
                    bindings.push((scope, name.clone(), id));
                    index.open(id, ScopeKind::Class, scope, &[]);
                    children.extend(bases.iter().map(|&c| (c, scope)));
                    children.extend(body.iter().map(|&c| (c, id)));
                }
                _ => {
                    for name in bound_names(kind) {
                        bindings.push((scope, name, id));
                    }
                    if let NodeKind::Global { names } = kind {
                        if let Some(info) = index.scopes.get_mut(&scope) {
                            info.globals.extend(names.iter().cloned());
                        }
                    }
                    children.extend(kind.children().into_iter().map(|c| (c, scope)));
                }
            }
            stack.extend(children.into_iter().rev());
        }

        for (scope, name, site) in bindings {
            index.bind(scope, name, site);
        }
        index
    }

    fn open(&mut self, owner: NodeId, kind: ScopeKind, parent: NodeId, params: &[Name]) {
        self.owners.push(owner);
        self.scopes
            .insert(owner, ScopeInfo::new(kind, Some(parent), params));
    }

    fn bind(&mut self, scope: NodeId, name: Name, site: NodeId) {
        let is_global = self.scopes.get(&scope).is_some_and(|info| {
            info.kind == ScopeKind::Module || info.globals.contains(&name)
        });
        if is_global {
            if let Some(module) = self.scopes.get_mut(&self.root) {
                if module.slot_of(&name).is_none() {
                    module.locals.push(name.clone());
                }
            }
            self.module_sites.entry(name).or_default().push(site);
        } else if let Some(info) = self.scopes.get_mut(&scope) {
            if info.slot_of(&name).is_none() {
                info.locals.push(name);
            }
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Scope-owning nodes (module, functions, lambdas, classes) in pre-order.
    pub fn owners(&self) -> &[NodeId] {
        &self.owners
    }

    /// The scope `node` is evaluated in, if it was attached when indexed.
    pub fn scope_of(&self, node: NodeId) -> Option<NodeId> {
        self.scope_of.get(&node).copied()
    }

    pub fn scope_kind(&self, owner: NodeId) -> Option<ScopeKind> {
        self.scopes.get(&owner).map(|info| info.kind)
    }

    /// Variables of a scope in slot order.
    pub fn layout(&self, owner: NodeId) -> Option<ScopeLayout> {
        let info = self.scopes.get(&owner)?;
        Some(ScopeLayout {
            locals: info.locals.clone(),
            params: u32::try_from(info.params).unwrap_or(u32::MAX),
        })
    }

    /// Nodes that bind `name` at module level: module-body statements and
    /// stores to names declared `global` in nested scopes.
    pub fn module_binding_sites(&self, name: &Name) -> &[NodeId] {
        self.module_sites.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn is_module_bound(&self, name: &Name) -> bool {
        self.module_sites.contains_key(name)
    }

    /// Resolve a load of `name` evaluated at `node`.
    pub fn resolve(&self, node: NodeId, name: &Name) -> Resolution {
        let Some(start) = self.scope_of(node) else {
            return self.module_or_builtin(name);
        };
        let mut current = Some(start);
        let mut crossed_function = false;
        while let Some(scope) = current {
            let Some(info) = self.scopes.get(&scope) else {
                break;
            };
            match info.kind {
                ScopeKind::Module => break,
                _ if info.globals.contains(name) => break,
                ScopeKind::Function => {
                    if let Some(slot) = info.slot_of(name) {
                        return if scope == start {
                            Resolution::Local { owner: scope, slot }
                        } else {
                            Resolution::Enclosing { owner: scope }
                        };
                    }
                    crossed_function = true;
                }
                ScopeKind::Class => {
                    if !crossed_function && info.slot_of(name).is_some() {
                        return Resolution::Class { owner: scope };
                    }
                }
            }
            current = info.parent;
        }
        self.module_or_builtin(name)
    }

    /// Resolve a store to `name` performed by `node`.
    pub fn resolve_store(&self, node: NodeId, name: &Name) -> Resolution {
        let Some(scope) = self.scope_of(node) else {
            return Resolution::Module;
        };
        match self.scopes.get(&scope) {
            Some(info) if info.globals.contains(name) => Resolution::Module,
            Some(info) if info.kind == ScopeKind::Function => match info.slot_of(name) {
                Some(slot) => Resolution::Local { owner: scope, slot },
                None => Resolution::Module,
            },
            Some(info) if info.kind == ScopeKind::Class => Resolution::Class { owner: scope },
            _ => Resolution::Module,
        }
    }

    fn module_or_builtin(&self, name: &Name) -> Resolution {
        if self.is_module_bound(name) {
            Resolution::Module
        } else {
            Resolution::Builtin
        }
    }
}

/// Names a statement binds in the scope it is evaluated in.
pub fn bound_names(kind: &NodeKind) -> Vec<Name> {
    match kind {
        NodeKind::Assign { target, .. } | NodeKind::For { target, .. } => vec![target.clone()],
        NodeKind::Delete { name } => vec![name.clone()],
        NodeKind::Import { module, alias } => {
            vec![alias.clone().unwrap_or_else(|| module.top_level())]
        }
        NodeKind::ImportFrom { names, .. } => {
            names.iter().map(|n| n.bound_name().clone()).collect()
        }
        NodeKind::ExceptHandler {
            name: Some(name), ..
        } => vec![name.clone()],
        NodeKind::FunctionDef { name, .. } | NodeKind::ClassDef { name, .. } => {
            vec![name.clone()]
        }
        _ => Vec::new(),
    }
}
