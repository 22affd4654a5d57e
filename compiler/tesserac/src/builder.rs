//! Tree builders available to the driver.
//!
//! Parsing source text is the job of an external front end. The driver
//! either receives trees already built in memory or loads the trees a
//! front end serialized to disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, trace};

use tessera_ir::{NodeTree, ParseError, QualifiedName, SourceId, TreeBuilder};

/// File extension of serialized trees.
pub const TREE_EXTENSION: &str = "tree";

/// Serve pre-built trees keyed by module name.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBuilder {
    trees: BTreeMap<QualifiedName, NodeTree>,
}

impl InMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_module(mut self, name: impl Into<QualifiedName>, tree: NodeTree) -> Self {
        self.insert(name, tree);
        self
    }

    pub fn insert(&mut self, name: impl Into<QualifiedName>, tree: NodeTree) {
        self.trees.insert(name.into(), tree);
    }

    /// Source id under which `module` is served.
    pub fn source_id(module: &QualifiedName) -> SourceId {
        SourceId::new(format!("{module}.{TREE_EXTENSION}"))
    }
}

impl TreeBuilder for InMemoryBuilder {
    fn locate(&self, module: &QualifiedName) -> Option<SourceId> {
        self.trees
            .contains_key(module)
            .then(|| Self::source_id(module))
    }

    fn build(&mut self, source: &SourceId, _is_entry: bool) -> Result<NodeTree, ParseError> {
        self.trees
            .get(&source.module_name())
            .cloned()
            .ok_or_else(|| ParseError::new(source.clone(), "no tree registered for this module"))
    }
}

/// Load `<module>.tree` files, encoded with `bincode`, from a list of
/// directories searched in order.
#[derive(Clone, Debug, Default)]
pub struct SerializedTreeBuilder {
    search_path: Vec<PathBuf>,
}

impl SerializedTreeBuilder {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        SerializedTreeBuilder { search_path }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    pub fn file_name(module: &QualifiedName) -> String {
        format!("{module}.{TREE_EXTENSION}")
    }
}

impl TreeBuilder for SerializedTreeBuilder {
    fn locate(&self, module: &QualifiedName) -> Option<SourceId> {
        let file_name = Self::file_name(module);
        let found = self
            .search_path
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file());
        trace!(module = %module, found = found.is_some(), "locate");
        found.map(SourceId::new)
    }

    fn build(&mut self, source: &SourceId, is_entry: bool) -> Result<NodeTree, ParseError> {
        let bytes = fs::read(source.path())
            .map_err(|e| ParseError::new(source.clone(), format!("cannot read tree: {e}")))?;
        let tree = decode_tree(&bytes)
            .map_err(|e| ParseError::new(source.clone(), format!("malformed tree: {e}")))?;
        tree.validate()
            .map_err(|e| ParseError::new(source.clone(), format!("inconsistent tree: {e}")))?;
        debug!(source = %source, nodes = tree.len(), is_entry, "tree loaded");
        Ok(tree)
    }
}

/// Encode a tree the way [`SerializedTreeBuilder`] expects to read it.
pub fn encode_tree(tree: &NodeTree) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(tree)
}

pub fn decode_tree(bytes: &[u8]) -> Result<NodeTree, bincode::Error> {
    bincode::deserialize(bytes)
}
