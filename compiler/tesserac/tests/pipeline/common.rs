//! Shared fixtures for pipeline tests.

use std::fs;
use std::path::Path;

use tessera_ir::construct::*;
use tessera_ir::{NodeTree, QualifiedName, SourceId};
use tesserac::{compile, BuildOptions, InMemoryBuilder, SourceDirectory};

/// `app` imports `util` and prints `util.value`; `util` binds `value = 7`.
pub fn app_and_util() -> InMemoryBuilder {
    InMemoryBuilder::new()
        .with_module("app", app_tree())
        .with_module("util", util_tree())
}

pub fn app_tree() -> NodeTree {
    module_tree(|t| {
        let import = import(t, "util", None);
        let util = name(t, "util");
        let value = attribute(t, util, "value");
        let call = call_name(t, "print", vec![value]);
        let print = expr_stmt(t, call);
        let seven = int(t, 7);
        let local = assign(t, "local", seven);
        vec![import, print, local]
    })
    .unwrap()
}

pub fn util_tree() -> NodeTree {
    module_tree(|t| {
        let seven = int(t, 7);
        vec![assign(t, "value", seven)]
    })
    .unwrap()
}

pub fn entry() -> SourceId {
    InMemoryBuilder::source_id(&QualifiedName::from("app"))
}

pub fn compile_into(dir: &Path, mut builder: InMemoryBuilder) -> SourceDirectory {
    let options = BuildOptions::new("app").with_output_dir(dir);
    compile(&entry(), &mut builder, &options).unwrap()
}

pub fn read(sources: &SourceDirectory, file: &str) -> String {
    fs::read_to_string(sources.path().join(file)).unwrap()
}

/// Every file in `dir` with its contents, sorted by name.
pub fn snapshot(dir: &Path) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().into_owned(),
                fs::read_to_string(entry.path()).unwrap(),
            )
        })
        .collect();
    files.sort();
    files
}
