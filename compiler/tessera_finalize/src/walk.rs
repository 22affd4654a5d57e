//! The finalization walk.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use tessera_ir::{
    ensure_sufficient_stack, Binding, FrozenModuleSet, ImportResolution, Name, NodeId, NodeKind,
    NodeTree, QualifiedName, Resolution, ScopeIndex, Specialization,
};

use crate::{FinalizationError, FinalizationErrorKind};

/// Which imported modules are compiled into the program.
///
/// Built from the frozen module set before any record is finalized, so every
/// module sees the same answer.
#[derive(Clone, Debug, Default)]
pub struct ImportTable {
    compiled: BTreeSet<QualifiedName>,
    located: BTreeSet<QualifiedName>,
}

impl ImportTable {
    pub fn new(
        compiled: impl IntoIterator<Item = QualifiedName>,
        located: impl IntoIterator<Item = QualifiedName>,
    ) -> Self {
        let compiled: BTreeSet<_> = compiled.into_iter().collect();
        let mut located: BTreeSet<_> = located.into_iter().collect();
        located.extend(compiled.iter().cloned());
        ImportTable { compiled, located }
    }

    /// Every record is importable, the entry included. Used when the entry
    /// is built as an extension module and initializes under its own name.
    pub fn from_modules(modules: &FrozenModuleSet) -> Self {
        Self::new(modules.names().cloned(), modules.located().cloned())
    }

    /// The entry of a program initializes as `__main__`, so importing it by
    /// name is left to the runtime.
    pub fn for_program(modules: &FrozenModuleSet) -> Self {
        Self::new(
            modules.importable().map(|record| record.name.clone()),
            modules.located().cloned(),
        )
    }

    fn resolve(&self, module: &QualifiedName) -> Result<ImportResolution, FinalizationErrorKind> {
        if self.compiled.contains(module) {
            Ok(ImportResolution::Compiled(module.clone()))
        } else if self.located.contains(module) {
            Err(FinalizationErrorKind::MissingModule {
                name: module.clone(),
            })
        } else {
            Ok(ImportResolution::Runtime)
        }
    }
}

/// Finalize every module of a frozen set, in name order.
pub fn finalize_all(
    modules: &mut FrozenModuleSet,
    imports: &ImportTable,
) -> Result<(), FinalizationError> {
    for record in modules.records_mut() {
        finalize_module(&mut record.tree, &record.name, imports)?;
    }
    Ok(())
}

/// Attach emission metadata to one module tree and mark it finalized.
///
/// On error the tree may carry partial metadata and stays unfinalized.
pub fn finalize_module(
    tree: &mut NodeTree,
    module: &QualifiedName,
    imports: &ImportTable,
) -> Result<(), FinalizationError> {
    let root = tree.root();
    if tree.is_finalized() {
        return Err(FinalizationError {
            module: module.clone(),
            node: tree.kind(root).tag(),
            span: tree.span(root),
            kind: FinalizationErrorKind::AlreadyFinalized,
        });
    }

    let scopes = ScopeIndex::build(tree);
    let mut finalizer = Finalizer {
        tree,
        scopes: &scopes,
        module,
        imports,
    };
    for &owner in scopes.owners() {
        let layout = scopes.layout(owner);
        finalizer.tree.meta_mut(owner).scope = layout;
    }
    finalizer.visit(root, Context::MODULE)?;

    tree.mark_finalized();
    debug!(module = %module, scopes = scopes.owners().len(), "module finalized");
    Ok(())
}

#[derive(Copy, Clone, Debug)]
struct Context {
    in_function: bool,
    loop_depth: u32,
}

impl Context {
    const MODULE: Context = Context {
        in_function: false,
        loop_depth: 0,
    };

    const FUNCTION: Context = Context {
        in_function: true,
        loop_depth: 0,
    };

    fn in_loop(self) -> Context {
        Context {
            loop_depth: self.loop_depth + 1,
            ..self
        }
    }
}

struct Finalizer<'a> {
    tree: &'a mut NodeTree,
    scopes: &'a ScopeIndex,
    module: &'a QualifiedName,
    imports: &'a ImportTable,
}

impl Finalizer<'_> {
    fn error(&self, id: NodeId, kind: FinalizationErrorKind) -> FinalizationError {
        FinalizationError {
            module: self.module.clone(),
            node: self.tree.kind(id).tag(),
            span: self.tree.span(id),
            kind,
        }
    }

    fn visit(&mut self, id: NodeId, ctx: Context) -> Result<(), FinalizationError> {
        ensure_sufficient_stack(|| self.visit_inner(id, ctx))
    }

    fn visit_all(&mut self, ids: &[NodeId], ctx: Context) -> Result<(), FinalizationError> {
        for &id in ids {
            self.visit(id, ctx)?;
        }
        Ok(())
    }

    fn visit_inner(&mut self, id: NodeId, ctx: Context) -> Result<(), FinalizationError> {
        let kind = self.tree.kind(id).clone();
        match &kind {
            NodeKind::Module { body } => self.visit_all(body, ctx),
            NodeKind::FunctionDef { name, body, .. } => {
                self.bind_store(id, name)?;
                self.visit_all(body, Context::FUNCTION)
            }
            NodeKind::Lambda { body, .. } => self.visit(*body, Context::FUNCTION),
            NodeKind::ClassDef { name, bases, body } => {
                self.visit_all(bases, ctx)?;
                self.bind_store(id, name)?;
                self.visit_all(body, Context::MODULE)
            }
            NodeKind::Assign { target, value } => {
                self.visit(*value, ctx)?;
                self.bind_store(id, target)
            }
            NodeKind::For { target, iter, body } => {
                self.visit(*iter, ctx)?;
                self.bind_store(id, target)?;
                self.visit_all(body, ctx.in_loop())
            }
            NodeKind::While { cond, body } => {
                self.visit(*cond, ctx)?;
                self.visit_all(body, ctx.in_loop())
            }
            NodeKind::Delete { name } => self.bind_store(id, name),
            NodeKind::Return { value } => {
                if !ctx.in_function {
                    return Err(self.error(id, FinalizationErrorKind::ReturnOutsideFunction));
                }
                match value {
                    Some(value) => self.visit(*value, ctx),
                    None => Ok(()),
                }
            }
            NodeKind::Break if ctx.loop_depth == 0 => {
                Err(self.error(id, FinalizationErrorKind::BreakOutsideLoop))
            }
            NodeKind::Continue if ctx.loop_depth == 0 => {
                Err(self.error(id, FinalizationErrorKind::ContinueOutsideLoop))
            }
            NodeKind::Import { module, alias } => {
                let resolution = self.resolve_import(id, module)?;
                self.tree.meta_mut(id).import = Some(resolution);
                let bound = alias.clone().unwrap_or_else(|| module.top_level());
                self.bind_store(id, &bound)
            }
            NodeKind::ImportFrom { module, names } => {
                let resolution = self.resolve_import(id, module)?;
                let mut bindings = Vec::with_capacity(names.len());
                for imported in names {
                    bindings.push(self.store_binding(id, imported.bound_name())?);
                }
                let meta = self.tree.meta_mut(id);
                meta.import = Some(resolution);
                meta.target_bindings = bindings;
                Ok(())
            }
            NodeKind::ExceptHandler {
                exception,
                name,
                body,
            } => {
                if let Some(exception) = exception {
                    self.visit(*exception, ctx)?;
                }
                if let Some(name) = name {
                    self.bind_store(id, name)?;
                }
                self.visit_all(body, ctx)
            }
            NodeKind::Name(name) => {
                let binding = self.load_binding(id, name)?;
                self.tree.meta_mut(id).binding = Some(binding);
                Ok(())
            }
            NodeKind::Call { callee, args } => {
                self.visit(*callee, ctx)?;
                self.visit_all(args, ctx)?;
                if let Some(specialization) = self.specialization(*callee, args.len()) {
                    trace!(node = ?id, ?specialization, "call specialized");
                    self.tree.meta_mut(id).specialization = Some(specialization);
                }
                Ok(())
            }
            other => {
                for child in other.children() {
                    self.visit(child, ctx)?;
                }
                Ok(())
            }
        }
    }

    fn resolve_import(
        &self,
        id: NodeId,
        module: &QualifiedName,
    ) -> Result<ImportResolution, FinalizationError> {
        self.imports
            .resolve(module)
            .map_err(|kind| self.error(id, kind))
    }

    fn specialization(&self, callee: NodeId, arg_count: usize) -> Option<Specialization> {
        let NodeKind::Name(name) = self.tree.kind(callee) else {
            return None;
        };
        if self.tree.meta(callee).binding != Some(Binding::Builtin) {
            return None;
        }
        Specialization::for_builtin(name.as_str(), arg_count)
    }

    fn bind_store(&mut self, id: NodeId, name: &Name) -> Result<(), FinalizationError> {
        let binding = self.store_binding(id, name)?;
        self.tree.meta_mut(id).binding = Some(binding);
        Ok(())
    }

    fn store_binding(&self, id: NodeId, name: &Name) -> Result<Binding, FinalizationError> {
        let resolution = self.scopes.resolve_store(id, name);
        self.to_binding(id, name, resolution)
    }

    fn load_binding(&self, id: NodeId, name: &Name) -> Result<Binding, FinalizationError> {
        let resolution = self.scopes.resolve(id, name);
        self.to_binding(id, name, resolution)
    }

    fn to_binding(
        &self,
        id: NodeId,
        name: &Name,
        resolution: Resolution,
    ) -> Result<Binding, FinalizationError> {
        match resolution {
            Resolution::Local { slot, .. } => Ok(Binding::Local { slot }),
            Resolution::Class { .. } => Ok(Binding::ClassLocal),
            Resolution::Module => Ok(Binding::ModuleGlobal),
            Resolution::Builtin => Ok(Binding::Builtin),
            Resolution::Enclosing { .. } => Err(self.error(
                id,
                FinalizationErrorKind::UnsupportedClosure { name: name.clone() },
            )),
        }
    }
}
