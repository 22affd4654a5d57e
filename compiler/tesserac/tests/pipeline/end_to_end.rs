use pretty_assertions::assert_eq;

use tesserac::{CONSTANTS_HEADER, CONSTANTS_SOURCE, MAIN_SOURCE};

use crate::common::{app_and_util, compile_into, read};

#[test]
fn test_entry_and_import() {
    let out = tempfile::tempdir().unwrap();
    let sources = compile_into(out.path(), app_and_util());

    assert_eq!(
        sources.file_names(),
        vec![
            "util.cpp",
            "util.hpp",
            MAIN_SOURCE,
            CONSTANTS_SOURCE,
            CONSTANTS_HEADER
        ]
    );

    let main = read(&sources, MAIN_SOURCE);
    assert!(main.contains("MOD_INIT_DECL( __main__ )"), "{main}");
    assert!(
        main.contains("IMPORT_EMBEDDED_MODULE"),
        "compiled import goes through the embedded module: {main}"
    );
    assert!(main.contains("{ \"util\", MOD_INIT_NAME( util ) },"), "{main}");
    assert!(main.contains("int main( int argc, char *argv[] )"), "{main}");

    let util = read(&sources, "util.cpp");
    assert!(util.contains("MOD_INIT_DECL( util )"), "{util}");
    assert!(util.contains("const_str_plain_value, const_int_7"), "{util}");
}

#[test]
fn test_constant_shared_across_modules() {
    let out = tempfile::tempdir().unwrap();
    let sources = compile_into(out.path(), app_and_util());

    let definitions = read(&sources, CONSTANTS_SOURCE);
    assert_eq!(definitions.matches("PyObject *const_int_7;").count(), 1);
    assert_eq!(definitions.matches("const_int_7 = ").count(), 1);

    assert!(read(&sources, MAIN_SOURCE).contains("const_int_7"));
    assert!(read(&sources, "util.cpp").contains("const_int_7"));
    assert!(read(&sources, CONSTANTS_HEADER).contains("extern PyObject *const_int_7;"));
}

#[test]
fn test_unlocated_import_left_to_runtime() {
    let out = tempfile::tempdir().unwrap();
    let builder = tesserac::InMemoryBuilder::new().with_module("app", crate::common::app_tree());
    let sources = compile_into(out.path(), builder);

    assert_eq!(
        sources.file_names(),
        vec![MAIN_SOURCE, CONSTANTS_SOURCE, CONSTANTS_HEADER]
    );
    let main = read(&sources, MAIN_SOURCE);
    assert!(main.contains("IMPORT_MODULE"), "{main}");
    assert!(!main.contains("IMPORT_EMBEDDED_MODULE"), "{main}");
}
