//! Forward declarations shared between translation units.

use std::collections::BTreeSet;

/// Ordered set of declarations the shared constants header provides, so any
/// translation unit can reference symbols defined in another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeclarationRegistry {
    declarations: BTreeSet<String>,
}

impl DeclarationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the declaration was already registered.
    pub fn declare(&mut self, declaration: impl Into<String>) -> bool {
        self.declarations.insert(declaration.into())
    }

    pub fn contains(&self, declaration: &str) -> bool {
        self.declarations.contains(declaration)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_declarations_are_deduplicated_and_sorted() {
        let mut registry = DeclarationRegistry::new();
        assert!(registry.declare("MOD_INIT_DECL( util );"));
        assert!(registry.declare("MOD_INIT_DECL( helpers );"));
        assert!(!registry.declare("MOD_INIT_DECL( util );"));
        assert_eq!(
            registry.iter().collect::<Vec<_>>(),
            vec!["MOD_INIT_DECL( helpers );", "MOD_INIT_DECL( util );"]
        );
    }
}
