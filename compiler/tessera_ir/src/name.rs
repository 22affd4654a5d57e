//! Variable names and dotted module names.

use std::borrow::Borrow;
use std::fmt;

/// A source-level identifier (variable, attribute, parameter, function name).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name(Box<str>);

impl Name {
    pub fn new(name: impl Into<Box<str>>) -> Self {
        Name(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name uses only characters that survive into a C identifier.
    pub fn is_plain(&self) -> bool {
        is_plain_identifier(&self.0)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", &*self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified module name, e.g. `package.module`.
///
/// Ordering is lexicographic on the dotted text, which is the order source
/// assembly emits modules in.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedName(Box<str>);

impl QualifiedName {
    pub fn new(name: impl Into<Box<str>>) -> Self {
        QualifiedName(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// First segment; what a plain `import a.b.c` binds in the importing scope.
    pub fn top_level(&self) -> Name {
        Name::new(self.segments().next().unwrap_or_default())
    }

    /// Every dotted prefix, outermost first, ending with the name itself.
    ///
    /// `a.b.c` yields `a`, `a.b`, `a.b.c`.
    pub fn prefixes(&self) -> Vec<QualifiedName> {
        let mut result = Vec::new();
        for (idx, ch) in self.0.char_indices() {
            if ch == '.' {
                result.push(QualifiedName::new(&self.0[..idx]));
            }
        }
        result.push(self.clone());
        result
    }

    /// `self.child`, used for `from package import submodule` candidates.
    pub fn child(&self, name: &Name) -> QualifiedName {
        QualifiedName::new(format!("{}.{}", self.0, name.as_str()))
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        QualifiedName::new(s)
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({:?})", &*self.0)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn is_plain_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
