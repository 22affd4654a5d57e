//! Module records and the module set.
//!
//! Import discovery grows a [`ModuleSet`]; once it is closed under static
//! imports it is frozen. [`FrozenModuleSet`] has no insertion API, so later
//! stages cannot add modules.

use std::collections::{BTreeMap, BTreeSet};

use crate::{NodeTree, QualifiedName, SourceId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModuleKind {
    /// The program's entry module.
    Entry,
    Importable,
}

/// One compiled module.
#[derive(Clone, Debug)]
pub struct ModuleRecord {
    pub name: QualifiedName,
    pub source: SourceId,
    pub tree: NodeTree,
    pub kind: ModuleKind,
}

impl ModuleRecord {
    #[inline]
    pub fn is_entry(&self) -> bool {
        self.kind == ModuleKind::Entry
    }
}

/// Modules found so far by import discovery.
#[derive(Clone, Debug, Default)]
pub struct ModuleSet {
    records: BTreeMap<QualifiedName, ModuleRecord>,
    located: BTreeSet<QualifiedName>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the tree builder found a source for `name`.
    pub fn mark_located(&mut self, name: QualifiedName) {
        self.located.insert(name);
    }

    /// Add a record. Returns `false` (and keeps the existing record) if a
    /// module of the same name is already present.
    pub fn insert(&mut self, record: ModuleRecord) -> bool {
        if self.records.contains_key(&record.name) {
            return false;
        }
        self.located.insert(record.name.clone());
        self.records.insert(record.name.clone(), record);
        true
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.records.contains_key(name)
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&ModuleRecord> {
        self.records.get(name)
    }

    pub fn get_mut(&mut self, name: &QualifiedName) -> Option<&mut ModuleRecord> {
        self.records.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn freeze(self) -> FrozenModuleSet {
        FrozenModuleSet {
            records: self.records,
            located: self.located,
        }
    }
}

/// The closed module set handed to finalization and code generation.
#[derive(Clone, Debug)]
pub struct FrozenModuleSet {
    records: BTreeMap<QualifiedName, ModuleRecord>,
    located: BTreeSet<QualifiedName>,
}

impl FrozenModuleSet {
    /// Whether `name` is compiled into the program.
    pub fn is_compiled(&self, name: &QualifiedName) -> bool {
        self.records.contains_key(name)
    }

    /// Whether the tree builder ever located a source for `name`.
    pub fn was_located(&self, name: &QualifiedName) -> bool {
        self.located.contains(name)
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&ModuleRecord> {
        self.records.get(name)
    }

    pub fn entry(&self) -> Option<&ModuleRecord> {
        self.records.values().find(|record| record.is_entry())
    }

    /// All records ordered by qualified name.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.records.values()
    }

    /// Records other than the entry module, ordered by qualified name.
    pub fn importable(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.records.values().filter(|record| !record.is_entry())
    }

    /// Mutable access for finalization; the set of records stays fixed.
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut ModuleRecord> {
        self.records.values_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &QualifiedName> {
        self.records.keys()
    }

    /// Every name the tree builder located, compiled or not.
    pub fn located(&self) -> impl Iterator<Item = &QualifiedName> {
        self.located.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests;
