//! Expression emitters.

use tessera_ir::{BinaryOp, BoolOp, CompareOp, Name, NodeId, UnaryOp};

use super::emit_expression;
use crate::identifier::helper_call;
use crate::{CodeGenContext, CodeGenerationError, ConstructorContract, Identifier};

type EmitResult = Result<Identifier, CodeGenerationError>;

fn emit_all(
    ctx: &mut CodeGenContext<'_, '_>,
    ids: &[NodeId],
) -> Result<Vec<Identifier>, CodeGenerationError> {
    ids.iter().map(|&id| emit_expression(ctx, id)).collect()
}

pub(super) fn attribute(
    ctx: &mut CodeGenContext<'_, '_>,
    object: NodeId,
    attribute: &Name,
) -> EmitResult {
    let object = emit_expression(ctx, object)?;
    let key = ctx.name_constant(attribute.as_str());
    Ok(Identifier::owned(format!(
        "LOOKUP_ATTRIBUTE( {}, {key} )",
        object.temporary_ref()
    ))
    .with_parts_from(&[object]))
}

pub(super) fn subscript(
    ctx: &mut CodeGenContext<'_, '_>,
    object: NodeId,
    index: NodeId,
) -> EmitResult {
    let operands = emit_all(ctx, &[object, index])?;
    Ok(helper_call("LOOKUP_SUBSCRIPT", &operands))
}

fn binary_helper(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "BINARY_OPERATION_ADD",
        BinaryOp::Sub => "BINARY_OPERATION_SUB",
        BinaryOp::Mul => "BINARY_OPERATION_MUL",
        BinaryOp::Div => "BINARY_OPERATION_TRUEDIV",
        BinaryOp::FloorDiv => "BINARY_OPERATION_FLOORDIV",
        BinaryOp::Mod => "BINARY_OPERATION_REMAINDER",
        BinaryOp::Pow => "POWER_OPERATION",
        BinaryOp::LShift => "BINARY_OPERATION_LSHIFT",
        BinaryOp::RShift => "BINARY_OPERATION_RSHIFT",
        BinaryOp::BitAnd => "BINARY_OPERATION_BITAND",
        BinaryOp::BitOr => "BINARY_OPERATION_BITOR",
        BinaryOp::BitXor => "BINARY_OPERATION_BITXOR",
    }
}

pub(super) fn binary(
    ctx: &mut CodeGenContext<'_, '_>,
    op: BinaryOp,
    left: NodeId,
    right: NodeId,
) -> EmitResult {
    let operands = emit_all(ctx, &[left, right])?;
    Ok(helper_call(binary_helper(op), &operands))
}

pub(super) fn unary(ctx: &mut CodeGenContext<'_, '_>, op: UnaryOp, operand: NodeId) -> EmitResult {
    let operand = emit_expression(ctx, operand)?;
    let helper = match op {
        // The truth test yields one of the boolean singletons.
        UnaryOp::Not => {
            return Ok(Identifier::constant(format!(
                "UNARY_NOT( {} )",
                operand.temporary_ref()
            ))
            .with_parts_from(&[operand]));
        }
        UnaryOp::Neg => "UNARY_OPERATION_NEGATIVE",
        UnaryOp::Pos => "UNARY_OPERATION_POSITIVE",
        UnaryOp::Invert => "UNARY_OPERATION_INVERT",
    };
    Ok(helper_call(helper, &[operand]))
}

pub(super) fn compare(
    ctx: &mut CodeGenContext<'_, '_>,
    op: CompareOp,
    left: NodeId,
    right: NodeId,
) -> EmitResult {
    let operands = emit_all(ctx, &[left, right])?;
    // Identity and containment tests yield one of the boolean singletons.
    let (helper, yields_singleton) = match op {
        CompareOp::Eq => ("RICH_COMPARE_EQ", false),
        CompareOp::NotEq => ("RICH_COMPARE_NE", false),
        CompareOp::Lt => ("RICH_COMPARE_LT", false),
        CompareOp::LtE => ("RICH_COMPARE_LE", false),
        CompareOp::Gt => ("RICH_COMPARE_GT", false),
        CompareOp::GtE => ("RICH_COMPARE_GE", false),
        CompareOp::Is => ("OBJECT_IS", true),
        CompareOp::IsNot => ("OBJECT_IS_NOT", true),
        CompareOp::In => ("SEQUENCE_CONTAINS", true),
        CompareOp::NotIn => ("SEQUENCE_CONTAINS_NOT", true),
    };
    let call = helper_call(helper, &operands);
    if yields_singleton {
        Ok(Identifier::constant(call.code()).with_parts_from(&operands))
    } else {
        Ok(call)
    }
}

/// Short-circuit evaluation: the left value is kept in a temporary so it can
/// be both tested and returned.
pub(super) fn bool_op(
    ctx: &mut CodeGenContext<'_, '_>,
    op: BoolOp,
    left: NodeId,
    right: NodeId,
) -> EmitResult {
    let keeper = ctx.fresh_temp();
    ctx.writeln(&format!("PyObjectTempKeeper {keeper};"));
    let left = emit_expression(ctx, left)?;
    let right = emit_expression(ctx, right)?;
    let kept = format!("{keeper}.asObject1()");
    let (when_true, when_false) = match op {
        BoolOp::Or => (kept, right.export_ref()),
        BoolOp::And => (right.export_ref(), kept),
    };
    let code = format!(
        "( {keeper}.assign( {} ), CHECK_IF_TRUE( {keeper}.asObject0() ) ? {when_true} : {when_false} )",
        left.export_ref()
    );
    Ok(Identifier::owned(code).with_parts_from(&[left, right]))
}

pub(super) fn conditional(
    ctx: &mut CodeGenContext<'_, '_>,
    cond: NodeId,
    then_value: NodeId,
    else_value: NodeId,
) -> EmitResult {
    let cond = emit_expression(ctx, cond)?;
    let then_value = emit_expression(ctx, then_value)?;
    let else_value = emit_expression(ctx, else_value)?;
    let code = format!(
        "( CHECK_IF_TRUE( {} ) ? {} : {} )",
        cond.temporary_ref(),
        then_value.export_ref(),
        else_value.export_ref()
    );
    Ok(Identifier::owned(code).with_parts_from(&[cond, then_value, else_value]))
}

pub(super) fn call(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    callee: NodeId,
    args: &[NodeId],
) -> EmitResult {
    if let Some(specialization) = ctx.tree().meta(id).specialization {
        let args = emit_all(ctx, args)?;
        return Ok(helper_call(specialization.helper(), &args));
    }

    let callee = emit_expression(ctx, callee)?;
    if args.is_empty() {
        return Ok(helper_call("CALL_FUNCTION_NO_ARGS", &[callee]));
    }
    let args = emit_all(ctx, args)?;
    let args = ConstructorContract::TUPLE.construct(&args);
    Ok(helper_call("CALL_FUNCTION_WITH_ARGS", &[callee, args]))
}

pub(super) fn container(
    ctx: &mut CodeGenContext<'_, '_>,
    contract: ConstructorContract,
    elements: &[NodeId],
) -> EmitResult {
    let elements = emit_all(ctx, elements)?;
    Ok(contract.construct(&elements))
}

/// Keys and values are evaluated pairwise, key first.
pub(super) fn dict(
    ctx: &mut CodeGenContext<'_, '_>,
    id: NodeId,
    keys: &[NodeId],
    values: &[NodeId],
) -> EmitResult {
    if keys.len() != values.len() {
        return Err(CodeGenerationError::UnpairedDict {
            node: id,
            keys: keys.len(),
            values: values.len(),
        });
    }
    let mut entries = Vec::with_capacity(keys.len() * 2);
    for (&key, &value) in keys.iter().zip(values) {
        entries.push(emit_expression(ctx, key)?);
        entries.push(emit_expression(ctx, value)?);
    }
    Ok(ConstructorContract::DICT.construct(&entries))
}
