//! Names of generated C++ symbols.
//!
//! Mangling is injective: `$` never occurs in a source name, so it marks both
//! package separators and hex escapes of characters C++ identifiers cannot
//! hold. `a.b` becomes `a$b` and stays distinct from the module `a__b`.

use std::fmt::Write as _;

/// Separator for package components.
const MODULE_SEP: char = '$';

/// Replace every character that cannot appear in a C++ identifier.
pub fn mangle_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    encode_identifier(&mut result, name);
    result
}

/// Symbol fragment for a module: package separators become `$`.
pub fn mangle_module(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for (i, segment) in name.split('.').enumerate() {
        if i > 0 {
            result.push(MODULE_SEP);
        }
        encode_identifier(&mut result, segment);
    }
    result
}

fn encode_identifier(out: &mut String, name: &str) {
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            let _ = write!(out, "{MODULE_SEP}{:02x}", u32::from(c));
        }
    }
}
