//! The program-wide constant pool.
//!
//! Every constant an emitter references is interned here. A value gets its
//! symbol the first time it is seen and keeps it for the rest of the run, so
//! two modules using `"x"` both reference `const_str_plain_x`. Entries are
//! never removed; the definitions unit lists them in insertion order, which
//! also guarantees tuple elements are initialized before the tuple.

use rustc_hash::FxHashMap;
use tracing::trace;

use tessera_ir::ConstValue;

use crate::Identifier;

/// Longest string that still gets a readable `const_str_plain_` symbol.
const MAX_PLAIN_STR_LEN: usize = 40;

/// One pooled constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantEntry {
    pub symbol: String,
    pub value: ConstValue,
    /// Runtime call creating the object, run once by `_initConstants`.
    pub initializer: String,
}

#[derive(Clone, Debug, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantEntry>,
    index: FxHashMap<ConstValue, usize>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier for a constant value: a runtime singleton for `None` and
    /// the booleans, a pool symbol for everything else.
    pub fn identifier(&mut self, value: &ConstValue) -> Identifier {
        match value {
            ConstValue::None => Identifier::constant("Py_None"),
            ConstValue::Bool(true) => Identifier::constant("Py_True"),
            ConstValue::Bool(false) => Identifier::constant("Py_False"),
            _ => Identifier::constant(self.intern(value)),
        }
    }

    /// Symbol for `value`, adding it to the pool on first use.
    pub fn intern(&mut self, value: &ConstValue) -> String {
        if let Some(&slot) = self.index.get(value) {
            return self.entries[slot].symbol.clone();
        }

        let initializer = self.initializer(value);
        let slot = self.entries.len();
        let symbol = symbol_name(value, slot);
        trace!(%symbol, "constant pooled");
        self.entries.push(ConstantEntry {
            symbol: symbol.clone(),
            value: value.clone(),
            initializer,
        });
        self.index.insert(value.clone(), slot);
        symbol
    }

    /// Symbol of an already pooled value.
    pub fn get(&self, value: &ConstValue) -> Option<&str> {
        self.index
            .get(value)
            .map(|&slot| self.entries[slot].symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ConstantEntry> {
        self.entries.iter()
    }

    fn initializer(&mut self, value: &ConstValue) -> String {
        match value {
            ConstValue::None => "Py_None".to_owned(),
            ConstValue::Bool(true) => "Py_True".to_owned(),
            ConstValue::Bool(false) => "Py_False".to_owned(),
            ConstValue::Int(v) if *v == i64::MIN => "MAKE_CONSTANT_INT( INT64_MIN )".to_owned(),
            ConstValue::Int(v) => format!("MAKE_CONSTANT_INT( INT64_C({v}) )"),
            ConstValue::Float(bits) => {
                format!("MAKE_CONSTANT_FLOAT( {} )", float_literal(f64::from_bits(*bits)))
            }
            ConstValue::Str(s) => format!(
                "MAKE_CONSTANT_STRING( {}, {} )",
                byte_literal(s.as_bytes()),
                s.len()
            ),
            ConstValue::Bytes(b) => {
                format!("MAKE_CONSTANT_BYTES( {}, {} )", byte_literal(b), b.len())
            }
            ConstValue::Tuple(items) => {
                let mut args = vec![items.len().to_string()];
                for item in items {
                    args.push(self.identifier(item).code().to_owned());
                }
                format!("MAKE_CONSTANT_TUPLE( {} )", args.join(", "))
            }
        }
    }
}

fn symbol_name(value: &ConstValue, slot: usize) -> String {
    match value {
        ConstValue::None => "Py_None".to_owned(),
        ConstValue::Bool(true) => "Py_True".to_owned(),
        ConstValue::Bool(false) => "Py_False".to_owned(),
        ConstValue::Int(v) if *v < 0 => format!("const_int_neg_{}", v.unsigned_abs()),
        ConstValue::Int(v) => format!("const_int_{v}"),
        ConstValue::Float(_) => format!("const_float_{slot}"),
        ConstValue::Str(s) if s.is_empty() => "const_str_empty".to_owned(),
        ConstValue::Str(s) if is_plain(s) => format!("const_str_plain_{s}"),
        ConstValue::Str(_) => format!("const_str_{slot}"),
        ConstValue::Bytes(b) if b.is_empty() => "const_bytes_empty".to_owned(),
        ConstValue::Bytes(_) => format!("const_bytes_{slot}"),
        ConstValue::Tuple(items) if items.is_empty() => "const_tuple_empty".to_owned(),
        ConstValue::Tuple(_) => format!("const_tuple_{slot}"),
    }
}

/// Strings that can be embedded in a symbol as they are.
fn is_plain(s: &str) -> bool {
    s.len() <= MAX_PLAIN_STR_LEN
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "NAN".to_owned()
    } else if f.is_infinite() {
        if f.is_sign_positive() { "INFINITY" } else { "-INFINITY" }.to_owned()
    } else {
        format!("{f:?}")
    }
}

/// C++ string literal for arbitrary bytes. Non-printable bytes use octal
/// escapes, which unlike hex escapes cannot swallow a following digit.
fn byte_literal(bytes: &[u8]) -> String {
    let mut literal = String::with_capacity(bytes.len() + 2);
    literal.push('"');
    for &byte in bytes {
        match byte {
            b'\\' => literal.push_str("\\\\"),
            b'"' => literal.push_str("\\\""),
            b'\n' => literal.push_str("\\n"),
            b'\r' => literal.push_str("\\r"),
            b'\t' => literal.push_str("\\t"),
            // `??` would start a trigraph in older dialects.
            b'?' => literal.push_str("\\?"),
            0x20..=0x7e => literal.push(char::from(byte)),
            _ => literal.push_str(&format!("\\{byte:03o}")),
        }
    }
    literal.push('"');
    literal
}

#[cfg(test)]
mod tests;
