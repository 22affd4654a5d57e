use std::fs;

use pretty_assertions::assert_eq;

use tessera_ir::SourceId;
use tesserac::{
    compile, encode_tree, BuildOptions, CompileError, Phase, SerializedTreeBuilder, MAIN_SOURCE,
};

use crate::common::{app_tree, read, util_tree};

#[test]
fn test_trees_loaded_from_search_path() {
    let trees = tempfile::tempdir().unwrap();
    let lib = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(trees.path().join("app.tree"), encode_tree(&app_tree()).unwrap()).unwrap();
    fs::write(lib.path().join("util.tree"), encode_tree(&util_tree()).unwrap()).unwrap();

    let mut builder =
        SerializedTreeBuilder::new(vec![trees.path().to_path_buf(), lib.path().to_path_buf()]);
    let options = BuildOptions::new("app").with_output_dir(out.path());
    let sources = compile(
        &SourceId::new(trees.path().join("app.tree")),
        &mut builder,
        &options,
    )
    .unwrap();

    assert_eq!(&sources.file_names()[..2], &["util.cpp", "util.hpp"]);
    assert!(read(&sources, MAIN_SOURCE).contains("MOD_INIT_NAME( util )"));
}

#[test]
fn test_corrupt_tree_is_a_parse_error() {
    let trees = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let path = trees.path().join("app.tree");
    fs::write(&path, b"not a tree").unwrap();

    let mut builder = SerializedTreeBuilder::new(vec![trees.path().to_path_buf()]);
    let options = BuildOptions::new("app").with_output_dir(out.path());
    let err: CompileError = compile(&SourceId::new(&path), &mut builder, &options).unwrap_err();

    assert_eq!(err.phase(), Phase::Parse);
    assert!(err.to_string().contains("malformed tree"), "{err}");
}
