//! Statement and definition emitters.

use tessera_ir::{
    ConstValue, ImportResolution, ImportedName, Name, NodeId, NodeKind, QualifiedName,
    ScopeLayout,
};

use super::{
    emit_expression, emit_statement, scope_of, store_binding, store_name, unexpected, unresolved,
    EmitterKind,
};
use crate::context::{local_variable, FrameKind};
use crate::identifier::call_code;
use crate::{mangle_module, CodeGenContext, CodeGenerationError, ConstructorContract, Identifier};

type EmitResult = Result<(), CodeGenerationError>;

fn emit_block(ctx: &mut CodeGenContext<'_, '_>, body: &[NodeId]) -> EmitResult {
    ctx.writeln("{");
    ctx.indent();
    for &statement in body {
        emit_statement(ctx, statement)?;
    }
    ctx.dedent();
    ctx.writeln("}");
    Ok(())
}

fn function_signature(symbol: &str) -> String {
    format!("static PyObject *{symbol}( PyObject **_python_args )")
}

/// Declare the frame's locals; parameters take their argument references.
fn write_locals(ctx: &mut CodeGenContext<'_, '_>, layout: &ScopeLayout) {
    for (slot, local) in layout.locals.iter().enumerate() {
        let variable = local_variable(local);
        let is_param = u32::try_from(slot).is_ok_and(|slot| slot < layout.params);
        if is_param {
            ctx.writeln(&format!(
                "PyObjectLocalVariable {variable}( INCREASE_REFCOUNT( _python_args[ {slot} ] ) );"
            ));
        } else {
            ctx.writeln(&format!("PyObjectLocalVariable {variable};"));
        }
    }
}

fn make_function(
    ctx: &mut CodeGenContext<'_, '_>,
    symbol: &str,
    name: &str,
    params: u32,
) -> Identifier {
    let name = ctx.name_constant(name);
    Identifier::owned(format!(
        "MAKE_FUNCTION( {symbol}, {name}, {params}, {} )",
        ctx.module_dict()
    ))
}

pub(super) fn function_def(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    name: &Name,
    body: &[NodeId],
) -> EmitResult {
    let layout = scope_of(ctx, id)?;
    let symbol = ctx.next_function_symbol("function", name.as_str());
    let params = layout.params;

    ctx.push_frame(FrameKind::Function, layout.clone());
    write_locals(ctx, &layout);
    for &statement in body {
        emit_statement(ctx, statement)?;
    }
    ctx.writeln("return INCREASE_REFCOUNT( Py_None );");
    ctx.pop_frame(&function_signature(&symbol));

    let function = make_function(ctx, &symbol, name.as_str(), params);
    store_name(ctx, id, name, &function)
}

/// A lambda becomes a generated function returning its body expression.
pub(super) fn lambda(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    body: NodeId,
) -> Result<Identifier, CodeGenerationError> {
    let layout = scope_of(ctx, id)?;
    let symbol = ctx.next_function_symbol("lambda", "lambda");
    let params = layout.params;

    ctx.push_frame(FrameKind::Function, layout.clone());
    write_locals(ctx, &layout);
    let value = emit_expression(ctx, body)?;
    ctx.writeln(&format!("return {};", value.export_ref()));
    ctx.pop_frame(&function_signature(&symbol));

    Ok(make_function(ctx, &symbol, "<lambda>", params))
}

/// The class body runs in its own function filling a fresh namespace dict;
/// the class object is built from that dict and the bases.
pub(super) fn class_def(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    name: &Name,
    bases: &[NodeId],
    body: &[NodeId],
) -> EmitResult {
    let mut base_identifiers = Vec::with_capacity(bases.len());
    for &base in bases {
        base_identifiers.push(emit_expression(ctx, base)?);
    }
    let bases = if base_identifiers.is_empty() {
        ctx.constant(&ConstValue::empty_tuple())
    } else {
        ConstructorContract::TUPLE.construct(&base_identifiers)
    };

    let layout = scope_of(ctx, id)?;
    let symbol = ctx.next_function_symbol("class", name.as_str());
    ctx.push_frame(FrameKind::Class, layout);
    ctx.writeln("PyObject *_locals = PyDict_New();");
    for &statement in body {
        emit_statement(ctx, statement)?;
    }
    ctx.writeln("return _locals;");
    ctx.pop_frame(&format!("static PyObject *{symbol}( void )"));

    let name_constant = ctx.name_constant(name.as_str());
    let class = Identifier::owned(call_code(
        "MAKE_CLASS",
        &[name_constant, bases.temporary_ref(), format!("{symbol}()")],
    ))
    .with_parts_from(&[bases]);
    store_name(ctx, id, name, &class)
}

pub(super) fn attribute_assign(
    ctx: &mut CodeGenContext<'_, '_>,
    object: NodeId,
    attribute: &Name,
    value: NodeId,
) -> EmitResult {
    let value = emit_expression(ctx, value)?;
    let object = emit_expression(ctx, object)?;
    let key = ctx.name_constant(attribute.as_str());
    let call = call_code(
        "SET_ATTRIBUTE",
        &[value.temporary_ref(), object.temporary_ref(), key],
    );
    ctx.writeln(&format!("{call};"));
    Ok(())
}

pub(super) fn subscript_assign(
    ctx: &mut CodeGenContext<'_, '_>,
    object: NodeId,
    index: NodeId,
    value: NodeId,
) -> EmitResult {
    let value = emit_expression(ctx, value)?;
    let object = emit_expression(ctx, object)?;
    let index = emit_expression(ctx, index)?;
    let call = call_code(
        "SET_SUBSCRIPT",
        &[
            value.temporary_ref(),
            object.temporary_ref(),
            index.temporary_ref(),
        ],
    );
    ctx.writeln(&format!("{call};"));
    Ok(())
}

pub(super) fn return_stmt(ctx: &mut CodeGenContext<'_, '_>, value: Option<NodeId>) -> EmitResult {
    let value = match value {
        Some(value) => emit_expression(ctx, value)?,
        None => ctx.constant(&ConstValue::None),
    };
    ctx.writeln(&format!("return {};", value.export_ref()));
    Ok(())
}

pub(super) fn if_stmt(
    ctx: &mut CodeGenContext<'_, '_>,
    cond: NodeId,
    then_body: &[NodeId],
    else_body: &[NodeId],
) -> EmitResult {
    let cond = emit_expression(ctx, cond)?;
    ctx.writeln(&format!("if ( CHECK_IF_TRUE( {} ) )", cond.temporary_ref()));
    emit_block(ctx, then_body)?;
    if !else_body.is_empty() {
        ctx.writeln("else");
        emit_block(ctx, else_body)?;
    }
    Ok(())
}

/// The condition is evaluated at the top of every iteration, so `continue`
/// re-tests it.
pub(super) fn while_stmt(
    ctx: &mut CodeGenContext<'_, '_>,
    cond: NodeId,
    body: &[NodeId],
) -> EmitResult {
    ctx.writeln("while ( true )");
    ctx.writeln("{");
    ctx.indent();
    let cond = emit_expression(ctx, cond)?;
    ctx.writeln(&format!("if ( !CHECK_IF_TRUE( {} ) )", cond.temporary_ref()));
    ctx.writeln("{");
    ctx.writeln("    break;");
    ctx.writeln("}");
    for &statement in body {
        emit_statement(ctx, statement)?;
    }
    ctx.dedent();
    ctx.writeln("}");
    Ok(())
}

pub(super) fn for_stmt(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    target: &Name,
    iter: NodeId,
    body: &[NodeId],
) -> EmitResult {
    let iter = emit_expression(ctx, iter)?;
    let iterator = ctx.fresh_temp();
    let next = ctx.fresh_temp();

    ctx.writeln("{");
    ctx.indent();
    ctx.writeln(&format!(
        "PyObjectTemporary {iterator}( MAKE_ITERATOR( {} ) );",
        iter.temporary_ref()
    ));
    ctx.writeln("while ( true )");
    ctx.writeln("{");
    ctx.indent();
    ctx.writeln(&format!(
        "PyObject *{next} = ITERATOR_NEXT( {iterator}.asObject() );"
    ));
    ctx.writeln(&format!("if ( {next} == NULL )"));
    ctx.writeln("{");
    ctx.writeln("    break;");
    ctx.writeln("}");
    store_name(ctx, id, target, &Identifier::owned(next))?;
    for &statement in body {
        emit_statement(ctx, statement)?;
    }
    ctx.dedent();
    ctx.writeln("}");
    ctx.dedent();
    ctx.writeln("}");
    Ok(())
}

pub(super) fn raise(ctx: &mut CodeGenContext<'_, '_>, exception: Option<NodeId>) -> EmitResult {
    match exception {
        Some(exception) => {
            let exception = emit_expression(ctx, exception)?;
            ctx.writeln(&format!("RAISE_EXCEPTION( {} );", exception.export_ref()));
        }
        None => ctx.writeln("RERAISE_EXCEPTION();"),
    }
    Ok(())
}

pub(super) fn try_stmt(
    ctx: &mut CodeGenContext<'_, '_>,
    body: &[NodeId],
    handlers: &[NodeId],
) -> EmitResult {
    ctx.writeln("try");
    emit_block(ctx, body)?;
    let exception = ctx.fresh_temp();
    ctx.writeln(&format!("catch ( _PythonException &{exception} )"));
    ctx.writeln("{");
    ctx.indent();
    emit_handlers(ctx, handlers, &exception)?;
    ctx.dedent();
    ctx.writeln("}");
    Ok(())
}

/// Handlers are tested in order; each unmatched test nests the rest in its
/// `else` so a handler's exception expression is only evaluated when the
/// earlier ones did not match. No match re-raises.
fn emit_handlers(
    ctx: &mut CodeGenContext<'_, '_>,
    handlers: &[NodeId],
    exception: &str,
) -> EmitResult {
    let Some((&handler, rest)) = handlers.split_first() else {
        ctx.writeln("throw;");
        return Ok(());
    };
    let NodeKind::ExceptHandler {
        exception: matched,
        name,
        body,
    } = ctx.tree().kind(handler)
    else {
        return Err(unexpected(ctx, handler, EmitterKind::Clause));
    };

    let cond = match matched {
        Some(matched) => {
            let matched = emit_expression(ctx, *matched)?;
            format!("{exception}.matches( {} )", matched.temporary_ref())
        }
        None => "true".to_owned(),
    };
    ctx.writeln(&format!("if ( {cond} )"));
    ctx.writeln("{");
    ctx.indent();
    if let Some(name) = name {
        let value = Identifier::owned(format!("{exception}.getObject()"));
        store_name(ctx, handler, name, &value)?;
    }
    for &statement in body {
        emit_statement(ctx, statement)?;
    }
    ctx.dedent();
    ctx.writeln("}");
    ctx.writeln("else");
    ctx.writeln("{");
    ctx.indent();
    emit_handlers(ctx, rest, exception)?;
    ctx.dedent();
    ctx.writeln("}");
    Ok(())
}

/// Runtime call importing `module`. Compiled modules are initialized from
/// their embedded init function, which must be declared in every unit.
fn import_call(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    module: &QualifiedName,
    top_level: bool,
) -> Result<Identifier, CodeGenerationError> {
    let Some(resolution) = ctx.tree().meta(id).import.clone() else {
        return Err(unresolved(ctx, id));
    };
    let name = ctx.name_constant(module.as_str());
    let suffix = if top_level { "_TOP_LEVEL" } else { "" };
    let code = match resolution {
        ImportResolution::Compiled(compiled) => {
            let mangled = mangle_module(compiled.as_str());
            ctx.global()
                .declarations_mut()
                .declare(format!("MOD_INIT_DECL( {mangled} );"));
            format!("IMPORT_EMBEDDED_MODULE{suffix}( {name}, MOD_INIT_NAME( {mangled} ) )")
        }
        ImportResolution::Runtime => format!("IMPORT_MODULE{suffix}( {name} )"),
    };
    Ok(Identifier::owned(code))
}

/// `import a.b` binds `a`; `import a.b as c` binds the leaf module.
pub(super) fn import(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    module: &QualifiedName,
    alias: Option<&Name>,
) -> EmitResult {
    let top_level = alias.is_none() && module.segments().nth(1).is_some();
    let value = import_call(ctx, id, module, top_level)?;
    let bound = alias.cloned().unwrap_or_else(|| module.top_level());
    store_name(ctx, id, &bound, &value)
}

pub(super) fn import_from(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    module: &QualifiedName,
    names: &[ImportedName],
) -> EmitResult {
    let bindings = ctx.tree().meta(id).target_bindings.clone();
    if bindings.len() != names.len() {
        return Err(unresolved(ctx, id));
    }
    let module_value = import_call(ctx, id, module, false)?;
    let holder = ctx.fresh_temp();
    ctx.writeln("{");
    ctx.indent();
    ctx.writeln(&format!(
        "PyObjectTemporary {holder}( {} );",
        module_value.export_ref()
    ));
    for (imported, binding) in names.iter().zip(bindings) {
        let key = ctx.name_constant(imported.name.as_str());
        let value = Identifier::owned(format!("IMPORT_NAME( {holder}.asObject(), {key} )"));
        store_binding(ctx, id, imported.bound_name(), binding, &value)?;
    }
    ctx.dedent();
    ctx.writeln("}");
    Ok(())
}
