#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use super::*;
use crate::Ownership;

#[test]
fn test_same_value_same_symbol() {
    let mut pool = ConstantPool::new();
    let first = pool.intern(&ConstValue::Int(42));
    let second = pool.intern(&ConstValue::Int(42));
    assert_eq!(first, "const_int_42");
    assert_eq!(first, second);
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_symbol_names() {
    let mut pool = ConstantPool::new();
    let symbols: Vec<String> = [
        ConstValue::Int(-7),
        ConstValue::str("x"),
        ConstValue::str(""),
        ConstValue::str("hello world"),
        ConstValue::float(1.5),
        ConstValue::Bytes(Vec::new()),
        ConstValue::Bytes(vec![0, 1]),
        ConstValue::empty_tuple(),
    ]
    .iter()
    .map(|value| pool.intern(value))
    .collect();
    assert_eq!(
        symbols,
        vec![
            "const_int_neg_7",
            "const_str_plain_x",
            "const_str_empty",
            "const_str_3",
            "const_float_4",
            "const_bytes_empty",
            "const_bytes_6",
            "const_tuple_empty",
        ]
    );
}

#[test]
fn test_distinct_types_get_distinct_symbols() {
    let mut pool = ConstantPool::new();
    let int = pool.intern(&ConstValue::Int(1));
    let float = pool.intern(&ConstValue::float(1.0));
    let string = pool.intern(&ConstValue::str("1"));
    assert_eq!(pool.len(), 3);
    assert_ne!(int, float);
    assert_ne!(int, string);
    assert_ne!(float, string);
}

#[test]
fn test_singletons_are_not_pooled() {
    let mut pool = ConstantPool::new();
    let none = pool.identifier(&ConstValue::None);
    let yes = pool.identifier(&ConstValue::Bool(true));
    assert_eq!(none.code(), "Py_None");
    assert_eq!(yes.code(), "Py_True");
    assert_eq!(none.ownership(), Ownership::Constant);
    assert!(pool.is_empty());
}

#[test]
fn test_tuple_elements_are_pooled_first() {
    let mut pool = ConstantPool::new();
    let tuple = ConstValue::Tuple(vec![
        ConstValue::Int(1),
        ConstValue::None,
        ConstValue::str("a"),
    ]);
    let symbol = pool.intern(&tuple);
    assert_eq!(symbol, "const_tuple_2");
    let entries: Vec<(&str, &str)> = pool
        .iter()
        .map(|entry| (entry.symbol.as_str(), entry.initializer.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("const_int_1", "MAKE_CONSTANT_INT( INT64_C(1) )"),
            ("const_str_plain_a", "MAKE_CONSTANT_STRING( \"a\", 1 )"),
            (
                "const_tuple_2",
                "MAKE_CONSTANT_TUPLE( 3, const_int_1, Py_None, const_str_plain_a )"
            ),
        ]
    );
}

#[test]
fn test_string_initializer_escapes() {
    let mut pool = ConstantPool::new();
    pool.intern(&ConstValue::str("a\"b\\\n\u{e9}?"));
    let entry = pool.iter().next().unwrap();
    assert_eq!(
        entry.initializer,
        "MAKE_CONSTANT_STRING( \"a\\\"b\\\\\\n\\303\\251\\?\", 8 )"
    );
}

#[test]
fn test_float_initializers() {
    assert_eq!(float_literal(0.25), "0.25");
    assert_eq!(float_literal(f64::NAN), "NAN");
    assert_eq!(float_literal(f64::NEG_INFINITY), "-INFINITY");
}

#[test]
fn test_get_does_not_insert() {
    let mut pool = ConstantPool::new();
    assert_eq!(pool.get(&ConstValue::Int(3)), None);
    pool.intern(&ConstValue::Int(3));
    assert_eq!(pool.get(&ConstValue::Int(3)), Some("const_int_3"));
    assert_eq!(pool.len(), 1);
}
