use super::*;

fn int(v: i64) -> ConstValue {
    ConstValue::Int(v)
}

#[test]
fn test_int_arithmetic() {
    assert_eq!(fold_binary(BinaryOp::Add, &int(2), &int(3)), Ok(Some(int(5))));
    assert_eq!(fold_binary(BinaryOp::Mul, &int(-4), &int(3)), Ok(Some(int(-12))));
    assert_eq!(fold_binary(BinaryOp::Pow, &int(2), &int(10)), Ok(Some(int(1024))));
    assert_eq!(fold_binary(BinaryOp::LShift, &int(1), &int(4)), Ok(Some(int(16))));
    assert_eq!(fold_binary(BinaryOp::RShift, &int(-8), &int(100)), Ok(Some(int(-1))));
}

#[test]
fn test_floor_division_and_modulo_round_down() {
    assert_eq!(fold_binary(BinaryOp::FloorDiv, &int(7), &int(2)), Ok(Some(int(3))));
    assert_eq!(fold_binary(BinaryOp::FloorDiv, &int(-7), &int(2)), Ok(Some(int(-4))));
    assert_eq!(fold_binary(BinaryOp::Mod, &int(-7), &int(2)), Ok(Some(int(1))));
    assert_eq!(fold_binary(BinaryOp::Mod, &int(7), &int(-2)), Ok(Some(int(-1))));
}

#[test]
fn test_true_division_yields_float() {
    assert_eq!(
        fold_binary(BinaryOp::Div, &int(1), &int(2)),
        Ok(Some(ConstValue::float(0.5)))
    );
}

#[test]
fn test_runtime_errors_are_anomalies() {
    assert_eq!(
        fold_binary(BinaryOp::Div, &int(1), &int(0)),
        Err(AnomalyKind::DivisionByZero)
    );
    assert_eq!(
        fold_binary(BinaryOp::Add, &int(i64::MAX), &int(1)),
        Err(AnomalyKind::IntegerOverflow)
    );
    assert_eq!(
        fold_binary(BinaryOp::LShift, &int(1), &int(-1)),
        Err(AnomalyKind::NegativeShift)
    );
    assert_eq!(
        fold_unary(UnaryOp::Neg, &int(i64::MIN)),
        Err(AnomalyKind::IntegerOverflow)
    );
}

#[test]
fn test_type_mismatch_is_left_alone() {
    assert_eq!(
        fold_binary(BinaryOp::Add, &ConstValue::str("a"), &int(1)),
        Ok(None)
    );
    assert_eq!(
        fold_compare(CompareOp::Lt, &ConstValue::str("a"), &int(1)),
        Ok(None)
    );
}

#[test]
fn test_bools_act_as_ints() {
    assert_eq!(
        fold_binary(BinaryOp::Add, &ConstValue::Bool(true), &int(1)),
        Ok(Some(int(2)))
    );
    assert_eq!(
        fold_binary(
            BinaryOp::BitOr,
            &ConstValue::Bool(false),
            &ConstValue::Bool(true)
        ),
        Ok(Some(ConstValue::Bool(true)))
    );
}

#[test]
fn test_sequence_concat_and_repeat() {
    assert_eq!(
        fold_binary(BinaryOp::Add, &ConstValue::str("ab"), &ConstValue::str("c")),
        Ok(Some(ConstValue::str("abc")))
    );
    assert_eq!(
        fold_binary(BinaryOp::Mul, &int(2), &ConstValue::Tuple(vec![int(1)])),
        Ok(Some(ConstValue::Tuple(vec![int(1), int(1)])))
    );
    assert_eq!(
        fold_binary(BinaryOp::Mul, &ConstValue::str("x"), &int(-3)),
        Ok(Some(ConstValue::str("")))
    );
    // Too large to be worth a pool entry.
    assert_eq!(
        fold_binary(BinaryOp::Mul, &ConstValue::str("x"), &int(1_000_000)),
        Ok(None)
    );
}

#[test]
fn test_tuple_repeat() {
    let pair = ConstValue::Tuple(vec![int(1), int(2)]);
    assert_eq!(
        fold_binary(BinaryOp::Mul, &pair, &int(3)),
        Ok(Some(ConstValue::Tuple(vec![
            int(1),
            int(2),
            int(1),
            int(2),
            int(1),
            int(2)
        ])))
    );
    assert_eq!(
        fold_binary(BinaryOp::Mul, &ConstValue::Tuple(vec![]), &int(5)),
        Ok(Some(ConstValue::Tuple(vec![])))
    );
    assert_eq!(
        fold_binary(BinaryOp::Mul, &pair, &int(0)),
        Ok(Some(ConstValue::Tuple(vec![])))
    );
}

#[test]
fn test_comparisons() {
    assert_eq!(
        fold_compare(CompareOp::Eq, &int(1), &ConstValue::float(1.0)),
        Ok(Some(ConstValue::Bool(true)))
    );
    assert_eq!(
        fold_compare(CompareOp::Lt, &ConstValue::str("a"), &ConstValue::str("b")),
        Ok(Some(ConstValue::Bool(true)))
    );
    assert_eq!(
        fold_compare(
            CompareOp::In,
            &int(2),
            &ConstValue::Tuple(vec![int(1), int(2)])
        ),
        Ok(Some(ConstValue::Bool(true)))
    );
    assert_eq!(
        fold_compare(CompareOp::Is, &ConstValue::None, &ConstValue::None),
        Ok(Some(ConstValue::Bool(true)))
    );
    assert_eq!(
        fold_compare(CompareOp::Is, &int(1), &int(1)),
        Ok(None)
    );
    let nan = ConstValue::float(f64::NAN);
    assert_eq!(
        fold_compare(CompareOp::GtE, &nan, &ConstValue::float(0.0)),
        Ok(Some(ConstValue::Bool(false)))
    );
}

#[test]
fn test_not_uses_truthiness() {
    assert_eq!(
        fold_unary(UnaryOp::Not, &ConstValue::str("")),
        Ok(Some(ConstValue::Bool(true)))
    );
    assert_eq!(fold_unary(UnaryOp::Invert, &int(0)), Ok(Some(int(-1))));
}

#[test]
fn test_short_circuit_choice() {
    assert_eq!(short_circuit(BoolOp::And, &int(0)), ShortCircuit::Left);
    assert_eq!(short_circuit(BoolOp::And, &int(1)), ShortCircuit::Right);
    assert_eq!(short_circuit(BoolOp::Or, &ConstValue::str("x")), ShortCircuit::Left);
    assert_eq!(short_circuit(BoolOp::Or, &ConstValue::None), ShortCircuit::Right);
}
