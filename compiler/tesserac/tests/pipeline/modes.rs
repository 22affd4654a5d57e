use pretty_assertions::assert_eq;

use tessera_ir::construct::*;
use tessera_ir::NodeTree;
use tesserac::{compile, BuildOptions, InMemoryBuilder, CONSTANTS_HEADER, MAIN_SOURCE};

use crate::common::{app_and_util, entry, read, util_tree};

/// `util` imports the entry module back.
fn util_importing_app() -> NodeTree {
    module_tree(|t| {
        let import = import(t, "app", None);
        let seven = int(t, 7);
        vec![import, assign(t, "value", seven)]
    })
    .unwrap()
}

fn cyclic_program() -> InMemoryBuilder {
    InMemoryBuilder::new()
        .with_module("app", crate::common::app_tree())
        .with_module("util", util_importing_app())
}

#[test]
fn test_extension_module_creates_constants() {
    let out = tempfile::tempdir().unwrap();
    let options = BuildOptions::new("app")
        .with_output_dir(out.path())
        .with_module_mode(true);
    let sources = compile(&entry(), &mut app_and_util(), &options).unwrap();

    let main = read(&sources, MAIN_SOURCE);
    assert!(!main.contains("int main("), "{main}");
    let init = main.find("MOD_INIT_DECL( app )").unwrap();
    let constants = main.find("_initConstants();").unwrap();
    let module_object = main.find("MAKE_MODULE( const_str_plain_app )").unwrap();
    assert!(init < constants && constants < module_object, "{main}");
    assert_eq!(main.matches("_initConstants();").count(), 1);
}

#[test]
fn test_program_with_only_an_entry_initializes_constants_in_main() {
    let out = tempfile::tempdir().unwrap();
    let options = BuildOptions::new("app").with_output_dir(out.path());
    let mut builder = InMemoryBuilder::new().with_module("app", util_tree());
    let sources = compile(&entry(), &mut builder, &options).unwrap();

    let main = read(&sources, MAIN_SOURCE);
    let program = main.find("int main( int argc, char *argv[] )").unwrap();
    assert!(main.find("_initConstants();").unwrap() > program, "{main}");
    assert!(!main.contains("_init_done"), "{main}");
}

#[test]
fn test_program_entry_imported_back_at_runtime() {
    let out = tempfile::tempdir().unwrap();
    let options = BuildOptions::new("app").with_output_dir(out.path());
    let sources = compile(&entry(), &mut cyclic_program(), &options).unwrap();

    let util = read(&sources, "util.cpp");
    assert!(
        util.contains("IMPORT_MODULE_TOP_LEVEL( const_str_plain_app )"),
        "{util}"
    );
    assert!(!util.contains("MOD_INIT_NAME( app )"), "{util}");

    let header = read(&sources, CONSTANTS_HEADER);
    assert!(!header.contains("MOD_INIT_DECL( app );"), "{header}");
    let main = read(&sources, MAIN_SOURCE);
    assert!(!main.contains("MOD_INIT_DECL( app )"), "{main}");
    assert!(main.contains("{ \"util\", MOD_INIT_NAME( util ) },"), "{main}");
}

#[test]
fn test_extension_entry_imported_back_as_compiled() {
    let out = tempfile::tempdir().unwrap();
    let options = BuildOptions::new("app")
        .with_output_dir(out.path())
        .with_module_mode(true);
    let sources = compile(&entry(), &mut cyclic_program(), &options).unwrap();

    let util = read(&sources, "util.cpp");
    assert!(util.contains("MOD_INIT_NAME( app )"), "{util}");
    assert!(read(&sources, MAIN_SOURCE).contains("MOD_INIT_DECL( app )"));
}
