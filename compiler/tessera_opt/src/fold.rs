//! Evaluation of operators over constant values.
//!
//! Results follow the target runtime's semantics: booleans act as integers
//! in arithmetic, `/` on integers yields a float, `//` and `%` round toward
//! negative infinity.
//!
//! Each function returns `Ok(None)` when the operation is not folded (type
//! combinations the runtime would reject, or results better left to it) and
//! `Err` when folding would change behavior, e.g. a division by zero that
//! must raise at run time.

use std::cmp::Ordering;

use tessera_ir::{BinaryOp, BoolOp, CompareOp, ConstValue, UnaryOp};

use crate::AnomalyKind;

pub type FoldResult = Result<Option<ConstValue>, AnomalyKind>;

/// Longest sequence (in elements or characters) folding will produce.
pub const MAX_FOLDED_LEN: usize = 1024;

/// Largest integer magnitude that converts to `f64` exactly.
const EXACT_FLOAT_INT: u64 = 1 << 53;

#[derive(Copy, Clone, Debug)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &ConstValue) -> Option<Num> {
        match value {
            ConstValue::Bool(b) => Some(Num::Int(i64::from(*b))),
            ConstValue::Int(v) => Some(Num::Int(*v)),
            ConstValue::Float(bits) => Some(Num::Float(f64::from_bits(*bits))),
            _ => None,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "callers only convert integers for mixed int/float arithmetic"
    )]
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(v) => v as f64,
            Num::Float(v) => v,
        }
    }
}

// Binary operators

pub fn fold_binary(op: BinaryOp, left: &ConstValue, right: &ConstValue) -> FoldResult {
    match (op, left, right) {
        (
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor,
            ConstValue::Bool(a),
            ConstValue::Bool(b),
        ) => Ok(Some(ConstValue::Bool(match op {
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            _ => a ^ b,
        }))),

        (BinaryOp::Add, ConstValue::Str(a), ConstValue::Str(b)) => {
            if a.chars().count() + b.chars().count() > MAX_FOLDED_LEN {
                return Ok(None);
            }
            Ok(Some(ConstValue::Str(format!("{a}{b}"))))
        }
        (BinaryOp::Add, ConstValue::Bytes(a), ConstValue::Bytes(b)) => {
            Ok(bounded(a.len() + b.len()).then(|| ConstValue::Bytes([&a[..], &b[..]].concat())))
        }
        (BinaryOp::Add, ConstValue::Tuple(a), ConstValue::Tuple(b)) => {
            Ok(bounded(a.len() + b.len()).then(|| ConstValue::Tuple([&a[..], &b[..]].concat())))
        }
        (BinaryOp::Mul, seq @ (ConstValue::Str(_) | ConstValue::Bytes(_) | ConstValue::Tuple(_)), count)
        | (BinaryOp::Mul, count, seq @ (ConstValue::Str(_) | ConstValue::Bytes(_) | ConstValue::Tuple(_))) => {
            Ok(repeat(seq, count))
        }
        // `%` on strings and bytes is formatting.
        (BinaryOp::Mod, ConstValue::Str(_) | ConstValue::Bytes(_), _) => Ok(None),

        _ => match (Num::of(left), Num::of(right)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => fold_int(op, a, b),
            (Some(a), Some(b)) => fold_float(op, a.as_f64(), b.as_f64()),
            _ => Ok(None),
        },
    }
}

fn bounded(len: usize) -> bool {
    len <= MAX_FOLDED_LEN
}

fn repeat(seq: &ConstValue, count: &ConstValue) -> Option<ConstValue> {
    let times = match count {
        ConstValue::Int(n) => *n,
        ConstValue::Bool(b) => i64::from(*b),
        _ => return None,
    };
    let times = usize::try_from(times.max(0)).ok()?;
    let len = seq.sized_len()?.checked_mul(times)?;
    if !bounded(len) {
        return None;
    }
    Some(match seq {
        ConstValue::Str(s) => ConstValue::Str(s.repeat(times)),
        ConstValue::Bytes(b) => ConstValue::Bytes(b.repeat(times)),
        ConstValue::Tuple(items) => ConstValue::Tuple(
            items.iter().cloned().cycle().take(len).collect(),
        ),
        _ => return None,
    })
}

fn fold_int(op: BinaryOp, a: i64, b: i64) -> FoldResult {
    let overflow = AnomalyKind::IntegerOverflow;
    let value = match op {
        BinaryOp::Add => a.checked_add(b).ok_or(overflow)?,
        BinaryOp::Sub => a.checked_sub(b).ok_or(overflow)?,
        BinaryOp::Mul => a.checked_mul(b).ok_or(overflow)?,
        BinaryOp::Div => {
            if b == 0 {
                return Err(AnomalyKind::DivisionByZero);
            }
            if a.unsigned_abs() > EXACT_FLOAT_INT || b.unsigned_abs() > EXACT_FLOAT_INT {
                return Ok(None);
            }
            let quotient = Num::Int(a).as_f64() / Num::Int(b).as_f64();
            return Ok(Some(ConstValue::float(quotient)));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(AnomalyKind::DivisionByZero);
            }
            let q = a.checked_div(b).ok_or(overflow)?;
            // Round towards negative infinity.
            if (a ^ b) < 0 && q * b != a {
                q - 1
            } else {
                q
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(AnomalyKind::DivisionByZero);
            }
            let r = a.checked_rem(b).ok_or(overflow)?;
            // Result takes the sign of the divisor.
            if r != 0 && (r < 0) != (b < 0) {
                r + b
            } else {
                r
            }
        }
        BinaryOp::Pow => {
            if b < 0 {
                return Ok(None);
            }
            let exp = u32::try_from(b).map_err(|_| overflow)?;
            a.checked_pow(exp).ok_or(overflow)?
        }
        BinaryOp::LShift => {
            if b < 0 {
                return Err(AnomalyKind::NegativeShift);
            }
            if a == 0 {
                0
            } else {
                let shift = u32::try_from(b).ok().filter(|&s| s < 64).ok_or(overflow)?;
                let result = a.wrapping_shl(shift);
                if result.wrapping_shr(shift) != a {
                    return Err(overflow);
                }
                result
            }
        }
        BinaryOp::RShift => {
            if b < 0 {
                return Err(AnomalyKind::NegativeShift);
            }
            let shift = u32::try_from(b.min(63)).unwrap_or(63);
            a >> shift
        }
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
    };
    Ok(Some(ConstValue::Int(value)))
}

fn fold_float(op: BinaryOp, a: f64, b: f64) -> FoldResult {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(AnomalyKind::DivisionByZero);
            }
            a / b
        }
        // Float `//`, `%` and `**` have runtime-specific corner cases.
        _ => return Ok(None),
    };
    Ok(Some(ConstValue::float(value)))
}

// Unary operators

pub fn fold_unary(op: UnaryOp, operand: &ConstValue) -> FoldResult {
    if op == UnaryOp::Not {
        return Ok(Some(ConstValue::Bool(!operand.is_truthy())));
    }
    let Some(num) = Num::of(operand) else {
        return Ok(None);
    };
    let value = match (op, num) {
        (UnaryOp::Neg, Num::Int(v)) => {
            ConstValue::Int(v.checked_neg().ok_or(AnomalyKind::IntegerOverflow)?)
        }
        (UnaryOp::Neg, Num::Float(v)) => ConstValue::float(-v),
        (UnaryOp::Pos, Num::Int(v)) => ConstValue::Int(v),
        (UnaryOp::Pos, Num::Float(v)) => ConstValue::float(v),
        (UnaryOp::Invert, Num::Int(v)) => ConstValue::Int(!v),
        (UnaryOp::Invert, Num::Float(_)) | (UnaryOp::Not, _) => return Ok(None),
    };
    Ok(Some(value))
}

// Comparisons

pub fn fold_compare(op: CompareOp, left: &ConstValue, right: &ConstValue) -> FoldResult {
    let result = match op {
        CompareOp::Eq => Some(const_eq(left, right)),
        CompareOp::NotEq => Some(!const_eq(left, right)),
        CompareOp::Lt => order(left, right).map(|o| o == Some(Ordering::Less)),
        CompareOp::LtE => order(left, right).map(|o| matches!(o, Some(Ordering::Less | Ordering::Equal))),
        CompareOp::Gt => order(left, right).map(|o| o == Some(Ordering::Greater)),
        CompareOp::GtE => order(left, right).map(|o| matches!(o, Some(Ordering::Greater | Ordering::Equal))),
        CompareOp::Is => identical(left, right),
        CompareOp::IsNot => identical(left, right).map(|same| !same),
        CompareOp::In => contains(right, left),
        CompareOp::NotIn => contains(right, left).map(|found| !found),
    };
    Ok(result.map(ConstValue::Bool))
}

/// Value equality as the runtime's `==` computes it for these types.
pub fn const_eq(left: &ConstValue, right: &ConstValue) -> bool {
    match (left, right) {
        (ConstValue::Tuple(a), ConstValue::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| const_eq(x, y))
        }
        _ => match (Num::of(left), Num::of(right)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
            (Some(Num::Int(i)), Some(Num::Float(f))) | (Some(Num::Float(f)), Some(Num::Int(i))) => {
                int_eq_float(i, f)
            }
            (Some(Num::Float(a)), Some(Num::Float(b))) => a == b,
            _ => left == right,
        },
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "integral floats inside the i64 range convert exactly"
)]
fn int_eq_float(i: i64, f: f64) -> bool {
    if f.fract() != 0.0 || !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return false;
    }
    f as i64 == i
}

/// `Some(ordering)` for orderable pairs; the inner `None` is an unordered
/// float comparison (every ordering test is false).
fn order(left: &ConstValue, right: &ConstValue) -> Option<Option<Ordering>> {
    match (left, right) {
        (ConstValue::Str(a), ConstValue::Str(b)) => Some(Some(a.cmp(b))),
        (ConstValue::Bytes(a), ConstValue::Bytes(b)) => Some(Some(a.cmp(b))),
        _ => match (Num::of(left), Num::of(right)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => Some(Some(a.cmp(&b))),
            (Some(a), Some(b)) => {
                let (x, y) = (a.as_f64(), b.as_f64());
                // Mixed comparisons lose precision beyond 2^53.
                let exact = |n: Num| match n {
                    Num::Int(v) => v.unsigned_abs() <= EXACT_FLOAT_INT,
                    Num::Float(_) => true,
                };
                (exact(a) && exact(b)).then(|| x.partial_cmp(&y))
            }
            _ => None,
        },
    }
}

/// Identity is only known for the runtime singletons and across types.
fn identical(left: &ConstValue, right: &ConstValue) -> Option<bool> {
    if left.is_runtime_singleton() && right.is_runtime_singleton() {
        return Some(left == right);
    }
    if left.is_runtime_singleton() || right.is_runtime_singleton() {
        return Some(false);
    }
    None
}

fn contains(container: &ConstValue, item: &ConstValue) -> Option<bool> {
    match (container, item) {
        (ConstValue::Tuple(items), _) => Some(items.iter().any(|x| const_eq(x, item))),
        (ConstValue::Str(haystack), ConstValue::Str(needle)) => {
            Some(haystack.contains(needle.as_str()))
        }
        (ConstValue::Bytes(haystack), ConstValue::Bytes(needle)) => Some(
            needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle.as_slice()),
        ),
        _ => None,
    }
}

// Short-circuit operators

/// Which operand a short-circuit operator yields, given a constant left
/// operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShortCircuit {
    Left,
    Right,
}

pub fn short_circuit(op: BoolOp, left: &ConstValue) -> ShortCircuit {
    match (op, left.is_truthy()) {
        (BoolOp::And, false) | (BoolOp::Or, true) => ShortCircuit::Left,
        (BoolOp::And, true) | (BoolOp::Or, false) => ShortCircuit::Right,
    }
}

#[cfg(test)]
mod tests;
