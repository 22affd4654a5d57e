//! Compile-time constant values.

use std::fmt;

/// A constant value known at compile time.
///
/// Equality is structural and type-sensitive: `Int(1)`, `Float(1.0)` and
/// `Bool(true)` are distinct values, because the target runtime gives them
/// distinct identities. Floats compare by bit pattern, so `0.0` and `-0.0`
/// are distinct too.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstValue {
    None,
    Bool(bool),
    Int(i64),
    /// IEEE-754 bits.
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<ConstValue>),
}

impl ConstValue {
    #[inline]
    pub fn float(value: f64) -> Self {
        ConstValue::Float(value.to_bits())
    }

    #[inline]
    pub fn str(value: impl Into<String>) -> Self {
        ConstValue::Str(value.into())
    }

    pub fn empty_tuple() -> Self {
        ConstValue::Tuple(Vec::new())
    }

    /// Truth value as the target runtime's truth test would compute it.
    pub fn is_truthy(&self) -> bool {
        match self {
            ConstValue::None => false,
            ConstValue::Bool(b) => *b,
            ConstValue::Int(v) => *v != 0,
            ConstValue::Float(bits) => f64::from_bits(*bits) != 0.0,
            ConstValue::Str(s) => !s.is_empty(),
            ConstValue::Bytes(b) => !b.is_empty(),
            ConstValue::Tuple(items) => !items.is_empty(),
        }
    }

    /// Number of elements for sized values (`len()` of the runtime object).
    pub fn sized_len(&self) -> Option<usize> {
        match self {
            ConstValue::Str(s) => Some(s.chars().count()),
            ConstValue::Bytes(b) => Some(b.len()),
            ConstValue::Tuple(items) => Some(items.len()),
            ConstValue::None
            | ConstValue::Bool(_)
            | ConstValue::Int(_)
            | ConstValue::Float(_) => None,
        }
    }

    /// Runtime type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstValue::None => "NoneType",
            ConstValue::Bool(_) => "bool",
            ConstValue::Int(_) => "int",
            ConstValue::Float(_) => "float",
            ConstValue::Str(_) => "str",
            ConstValue::Bytes(_) => "bytes",
            ConstValue::Tuple(_) => "tuple",
        }
    }

    /// Singletons owned by the runtime itself rather than the constant pool.
    pub fn is_runtime_singleton(&self) -> bool {
        matches!(self, ConstValue::None | ConstValue::Bool(_))
    }
}

impl fmt::Debug for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::None => f.write_str("None"),
            ConstValue::Bool(true) => f.write_str("True"),
            ConstValue::Bool(false) => f.write_str("False"),
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            ConstValue::Str(s) => write!(f, "{s:?}"),
            ConstValue::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            ConstValue::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}
