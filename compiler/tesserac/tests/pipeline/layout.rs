use std::fs;

use pretty_assertions::assert_eq;

use tessera_ir::construct::*;
use tesserac::{InMemoryBuilder, CONSTANTS_HEADER, CONSTANTS_SOURCE, MAIN_SOURCE};

use crate::common::{app_and_util, compile_into, snapshot};

#[test]
fn test_modules_written_in_name_order() {
    let out = tempfile::tempdir().unwrap();
    let entry = module_tree(|t| {
        vec![
            import(t, "b.x", None),
            import(t, "a.y", None),
            import(t, "a.z", None),
        ]
    })
    .unwrap();
    let leaf = || module_tree(|t| vec![pass(t)]).unwrap();
    let builder = InMemoryBuilder::new()
        .with_module("app", entry)
        .with_module("b.x", leaf())
        .with_module("a.y", leaf())
        .with_module("a.z", leaf());

    let sources = compile_into(out.path(), builder);
    assert_eq!(
        sources.file_names(),
        vec![
            "a.y.cpp",
            "a.y.hpp",
            "a.z.cpp",
            "a.z.hpp",
            "b.x.cpp",
            "b.x.hpp",
            MAIN_SOURCE,
            CONSTANTS_SOURCE,
            CONSTANTS_HEADER
        ]
    );
}

#[test]
fn test_build_directory_holds_only_this_build() {
    let out = tempfile::tempdir().unwrap();
    let build_dir = out.path().join("app.build");
    fs::create_dir_all(build_dir.join("scons-cache")).unwrap();
    fs::write(build_dir.join("old_module.cpp"), "// stale").unwrap();

    let sources = compile_into(out.path(), app_and_util());

    let on_disk: Vec<String> = snapshot(sources.path()).into_iter().map(|(name, _)| name).collect();
    let mut written = sources.file_names();
    written.sort();
    assert_eq!(on_disk, written);
}

#[test]
fn test_repeated_builds_are_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let a = compile_into(first.path(), app_and_util());
    let b = compile_into(second.path(), app_and_util());

    assert_eq!(snapshot(a.path()), snapshot(b.path()));
}
