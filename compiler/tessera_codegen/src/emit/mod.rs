//! Per-kind emission.
//!
//! [`emit_expression`] and [`emit_statement`] match every [`NodeKind`]
//! explicitly. Adding a node kind fails to compile until both know about
//! it; there is no fallback arm.

use std::fmt;

use tessera_ir::{ensure_sufficient_stack, Binding, Name, NodeId, NodeKind, NodeTag, ScopeLayout};

use crate::context::{local_variable, FrameKind};
use crate::{CodeGenContext, CodeGenerationError, Identifier};

mod expressions;
mod statements;

/// Which emitter handles a node kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EmitterKind {
    /// The module root; laid out by the unit generator.
    Module,
    /// Definitions and statements: [`emit_statement`].
    Statement,
    /// `except` clauses, emitted as part of their `try`.
    Clause,
    /// [`emit_expression`], producing an [`Identifier`].
    Expression,
}

impl fmt::Display for EmitterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmitterKind::Module => "a module",
            EmitterKind::Statement => "a statement",
            EmitterKind::Clause => "an except clause",
            EmitterKind::Expression => "an expression",
        })
    }
}

/// The dispatch table.
pub fn emitter_for(tag: NodeTag) -> EmitterKind {
    match tag {
        NodeTag::Module => EmitterKind::Module,
        NodeTag::FunctionDef
        | NodeTag::ClassDef
        | NodeTag::Assign
        | NodeTag::AttributeAssign
        | NodeTag::SubscriptAssign
        | NodeTag::ExprStmt
        | NodeTag::Return
        | NodeTag::If
        | NodeTag::While
        | NodeTag::For
        | NodeTag::Break
        | NodeTag::Continue
        | NodeTag::Pass
        | NodeTag::Raise
        | NodeTag::Try
        | NodeTag::Import
        | NodeTag::ImportFrom
        | NodeTag::Global
        | NodeTag::Delete => EmitterKind::Statement,
        NodeTag::ExceptHandler => EmitterKind::Clause,
        NodeTag::Constant
        | NodeTag::Name
        | NodeTag::Attribute
        | NodeTag::Subscript
        | NodeTag::BinaryOp
        | NodeTag::UnaryOp
        | NodeTag::Compare
        | NodeTag::BoolOp
        | NodeTag::Conditional
        | NodeTag::Call
        | NodeTag::Tuple
        | NodeTag::List
        | NodeTag::Set
        | NodeTag::Dict
        | NodeTag::Lambda => EmitterKind::Expression,
    }
}

/// Emit an expression node, returning the identifier holding its value.
/// Helper lines (temporary declarations) go into the current frame.
pub fn emit_expression(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
) -> Result<Identifier, CodeGenerationError> {
    ensure_sufficient_stack(|| emit_expression_inner(ctx, id))
}

fn emit_expression_inner(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
) -> Result<Identifier, CodeGenerationError> {
    let tree = ctx.tree();
    match tree.kind(id) {
        NodeKind::Constant(value) => Ok(ctx.constant(value)),
        NodeKind::Name(name) => load_name(ctx, id, name),
        NodeKind::Attribute { object, attribute } => {
            expressions::attribute(ctx, *object, attribute)
        }
        NodeKind::Subscript { object, index } => expressions::subscript(ctx, *object, *index),
        NodeKind::BinaryOp { op, left, right } => expressions::binary(ctx, *op, *left, *right),
        NodeKind::UnaryOp { op, operand } => expressions::unary(ctx, *op, *operand),
        NodeKind::Compare { op, left, right } => expressions::compare(ctx, *op, *left, *right),
        NodeKind::BoolOp { op, left, right } => expressions::bool_op(ctx, *op, *left, *right),
        NodeKind::Conditional {
            cond,
            then_value,
            else_value,
        } => expressions::conditional(ctx, *cond, *then_value, *else_value),
        NodeKind::Call { callee, args } => expressions::call(ctx, id, *callee, args),
        NodeKind::Tuple { elements } => {
            expressions::container(ctx, crate::ConstructorContract::TUPLE, elements)
        }
        NodeKind::List { elements } => {
            expressions::container(ctx, crate::ConstructorContract::LIST, elements)
        }
        NodeKind::Set { elements } => {
            expressions::container(ctx, crate::ConstructorContract::SET, elements)
        }
        NodeKind::Dict { keys, values } => expressions::dict(ctx, id, keys, values),
        NodeKind::Lambda { params: _, body } => statements::lambda(ctx, id, *body),

        NodeKind::Module { .. }
        | NodeKind::FunctionDef { .. }
        | NodeKind::ClassDef { .. }
        | NodeKind::Assign { .. }
        | NodeKind::AttributeAssign { .. }
        | NodeKind::SubscriptAssign { .. }
        | NodeKind::ExprStmt { .. }
        | NodeKind::Return { .. }
        | NodeKind::If { .. }
        | NodeKind::While { .. }
        | NodeKind::For { .. }
        | NodeKind::Break
        | NodeKind::Continue
        | NodeKind::Pass
        | NodeKind::Raise { .. }
        | NodeKind::Try { .. }
        | NodeKind::ExceptHandler { .. }
        | NodeKind::Import { .. }
        | NodeKind::ImportFrom { .. }
        | NodeKind::Global { .. }
        | NodeKind::Delete { .. } => Err(unexpected(ctx, id, EmitterKind::Expression)),
    }
}

/// Emit a statement or definition into the current frame.
pub fn emit_statement(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
) -> Result<(), CodeGenerationError> {
    ensure_sufficient_stack(|| emit_statement_inner(ctx, id))
}

fn emit_statement_inner(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
) -> Result<(), CodeGenerationError> {
    let tree = ctx.tree();
    match tree.kind(id) {
        NodeKind::FunctionDef { name, params: _, body } => {
            statements::function_def(ctx, id, name, body)
        }
        NodeKind::ClassDef { name, bases, body } => {
            statements::class_def(ctx, id, name, bases, body)
        }
        NodeKind::Assign { target, value } => {
            let value = emit_expression(ctx, *value)?;
            store_name(ctx, id, target, &value)
        }
        NodeKind::AttributeAssign {
            object,
            attribute,
            value,
        } => statements::attribute_assign(ctx, *object, attribute, *value),
        NodeKind::SubscriptAssign {
            object,
            index,
            value,
        } => statements::subscript_assign(ctx, *object, *index, *value),
        NodeKind::ExprStmt { value } => {
            let value = emit_expression(ctx, *value)?;
            ctx.writeln(&format!("{};", value.drop_ref()));
            Ok(())
        }
        NodeKind::Return { value } => statements::return_stmt(ctx, *value),
        NodeKind::If {
            cond,
            then_body,
            else_body,
        } => statements::if_stmt(ctx, *cond, then_body, else_body),
        NodeKind::While { cond, body } => statements::while_stmt(ctx, *cond, body),
        NodeKind::For { target, iter, body } => statements::for_stmt(ctx, id, target, *iter, body),
        NodeKind::Break => {
            ctx.writeln("break;");
            Ok(())
        }
        NodeKind::Continue => {
            ctx.writeln("continue;");
            Ok(())
        }
        NodeKind::Pass | NodeKind::Global { .. } => Ok(()),
        NodeKind::Raise { exception } => statements::raise(ctx, *exception),
        NodeKind::Try { body, handlers } => statements::try_stmt(ctx, body, handlers),
        NodeKind::Import { module, alias } => statements::import(ctx, id, module, alias.as_ref()),
        NodeKind::ImportFrom { module, names } => {
            statements::import_from(ctx, id, module, names)
        }
        NodeKind::Delete { name } => delete_name(ctx, id, name),

        NodeKind::Module { .. } => Err(unexpected(ctx, id, EmitterKind::Statement)),
        NodeKind::ExceptHandler { .. } => Err(unexpected(ctx, id, EmitterKind::Statement)),
        NodeKind::Constant(_)
        | NodeKind::Name(_)
        | NodeKind::Attribute { .. }
        | NodeKind::Subscript { .. }
        | NodeKind::BinaryOp { .. }
        | NodeKind::UnaryOp { .. }
        | NodeKind::Compare { .. }
        | NodeKind::BoolOp { .. }
        | NodeKind::Conditional { .. }
        | NodeKind::Call { .. }
        | NodeKind::Tuple { .. }
        | NodeKind::List { .. }
        | NodeKind::Set { .. }
        | NodeKind::Dict { .. }
        | NodeKind::Lambda { .. } => Err(unexpected(ctx, id, EmitterKind::Statement)),
    }
}

/// Emit every statement of the module body into the init frame.
pub(crate) fn emit_module_body(
    ctx: &mut CodeGenContext<'_, '_>,
) -> Result<(), CodeGenerationError> {
    let tree = ctx.tree();
    let root = tree.root();
    match tree.kind(root) {
        NodeKind::Module { body } => {
            for &statement in body {
                emit_statement(ctx, statement)?;
            }
            Ok(())
        }
        _ => Err(CodeGenerationError::UnexpectedKind {
            node: root,
            tag: tree.kind(root).tag(),
            expected: EmitterKind::Module,
        }),
    }
}

fn unexpected(
    ctx: &CodeGenContext<'_, '_>,
    id: NodeId,
    expected: EmitterKind,
) -> CodeGenerationError {
    CodeGenerationError::UnexpectedKind {
        node: id,
        tag: ctx.tree().kind(id).tag(),
        expected,
    }
}

fn unresolved(ctx: &CodeGenContext<'_, '_>, id: NodeId) -> CodeGenerationError {
    CodeGenerationError::UnresolvedBinding {
        node: id,
        tag: ctx.tree().kind(id).tag(),
    }
}

/// The binding recorded on `id`. Class namespace bindings are only valid
/// while a class body frame is open.
fn binding_of(ctx: &CodeGenContext<'_, '_>, id: NodeId) -> Result<Binding, CodeGenerationError> {
    match ctx.tree().meta(id).binding {
        Some(Binding::ClassLocal) if ctx.frame_kind() != FrameKind::Class => {
            Err(unresolved(ctx, id))
        }
        Some(binding) => Ok(binding),
        None => Err(unresolved(ctx, id)),
    }
}

fn scope_of(ctx: &CodeGenContext<'_, '_>, id: NodeId) -> Result<ScopeLayout, CodeGenerationError> {
    ctx.tree()
        .meta(id)
        .scope
        .clone()
        .ok_or_else(|| unresolved(ctx, id))
}

/// C++ variable of the local a `Local` binding refers to.
fn local_slot_variable(
    ctx: &CodeGenContext<'_, '_>,
    id: NodeId,
    slot: u32,
) -> Result<String, CodeGenerationError> {
    ctx.local_name(slot)
        .map(local_variable)
        .ok_or_else(|| unresolved(ctx, id))
}

fn load_name(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    name: &Name,
) -> Result<Identifier, CodeGenerationError> {
    let identifier = match binding_of(ctx, id)? {
        Binding::Local { slot } => {
            let variable = local_slot_variable(ctx, id, slot)?;
            Identifier::borrowed(format!("{variable}.asObject()"))
        }
        Binding::ModuleGlobal => {
            let key = ctx.name_constant(name.as_str());
            Identifier::borrowed(format!("LOOKUP_MODULE_VALUE( {}, {key} )", ctx.module_dict()))
        }
        Binding::ClassLocal => {
            let key = ctx.name_constant(name.as_str());
            Identifier::borrowed(format!(
                "LOOKUP_CLASS_VALUE( _locals, {key}, {} )",
                ctx.module_dict()
            ))
        }
        Binding::Builtin => {
            let key = ctx.name_constant(name.as_str());
            Identifier::borrowed(format!("LOOKUP_BUILTIN( {key} )"))
        }
    };
    Ok(identifier)
}

/// Store `value` under the binding recorded on `id`.
fn store_name(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    name: &Name,
    value: &Identifier,
) -> Result<(), CodeGenerationError> {
    let binding = binding_of(ctx, id)?;
    store_binding(ctx, id, name, binding, value)
}

fn store_binding(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    name: &Name,
    binding: Binding,
    value: &Identifier,
) -> Result<(), CodeGenerationError> {
    let line = match binding {
        Binding::Local { slot } => {
            let variable = local_slot_variable(ctx, id, slot)?;
            format!("{variable}.assign( {} );", value.export_ref())
        }
        Binding::ModuleGlobal => {
            let key = ctx.name_constant(name.as_str());
            format!(
                "SET_MODULE_VALUE( {}, {key}, {} );",
                ctx.module_dict(),
                value.temporary_ref()
            )
        }
        Binding::ClassLocal => {
            let key = ctx.name_constant(name.as_str());
            format!("SET_CLASS_VALUE( _locals, {key}, {} );", value.temporary_ref())
        }
        Binding::Builtin => return Err(unresolved(ctx, id)),
    };
    ctx.writeln(&line);
    Ok(())
}

fn delete_name(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    name: &Name,
) -> Result<(), CodeGenerationError> {
    let line = match binding_of(ctx, id)? {
        Binding::Local { slot } => format!("{}.del();", local_slot_variable(ctx, id, slot)?),
        Binding::ModuleGlobal => {
            let key = ctx.name_constant(name.as_str());
            format!("DEL_MODULE_VALUE( {}, {key} );", ctx.module_dict())
        }
        Binding::ClassLocal => {
            let key = ctx.name_constant(name.as_str());
            format!("DEL_CLASS_VALUE( _locals, {key} );")
        }
        Binding::Builtin => return Err(unresolved(ctx, id)),
    };
    ctx.writeln(&line);
    Ok(())
}

#[cfg(test)]
mod tests;
