//! Translation unit generation.
//!
//! Each function returns the complete text of one generated file. Layout
//! and naming of the files is the caller's concern.

use std::fmt::Write as _;

use tracing::debug;

use tessera_ir::{NodeTree, QualifiedName};

use crate::emit::emit_module_body;
use crate::{mangle_module, CodeGenContext, CodeGenerationError, GlobalContext};

/// Runtime name of a program's entry module.
pub const MAIN_MODULE_NAME: &str = "__main__";

/// Generate the translation unit of one finalized module.
///
/// `runtime_name` is the name the module is initialized under; for the
/// entry module of a program it is [`MAIN_MODULE_NAME`].
pub fn generate_module_code(
    tree: &NodeTree,
    module: &QualifiedName,
    runtime_name: &str,
    global: &mut GlobalContext,
) -> Result<String, CodeGenerationError> {
    module_code(tree, module, runtime_name, false, global)
}

/// Generate the translation unit of a module built as an extension module.
///
/// There is no `main` to create the shared constants, so the module's
/// initialization creates them the first time it runs.
pub fn generate_extension_module_code(
    tree: &NodeTree,
    module: &QualifiedName,
    global: &mut GlobalContext,
) -> Result<String, CodeGenerationError> {
    module_code(tree, module, module.as_str(), true, global)
}

fn module_code(
    tree: &NodeTree,
    module: &QualifiedName,
    runtime_name: &str,
    standalone: bool,
    global: &mut GlobalContext,
) -> Result<String, CodeGenerationError> {
    if !tree.is_finalized() {
        return Err(CodeGenerationError::NotFinalized {
            module: module.clone(),
        });
    }

    let mut ctx = CodeGenContext::new(tree, global, module.clone(), runtime_name);
    emit_module_body(&mut ctx)?;
    let module_object = ctx.module_object();
    let module_dict = ctx.module_dict();
    let mangled = ctx.mangled_module().to_owned();
    let name_constant = ctx.name_constant(runtime_name);
    let parts = ctx.finish();

    let mut code = String::new();
    let _ = writeln!(code, "// Generated code for module `{module}`.");
    code.push('\n');
    code.push_str("#include \"__constants.hpp\"\n\n");
    code.push_str("// The module object and its globals dictionary.\n");
    let _ = writeln!(code, "static PyModuleObject *{module_object};");
    let _ = writeln!(code, "static PyDictObject *{module_dict};");

    if !parts.prototypes.is_empty() {
        code.push_str("\n// Function prototypes.\n");
        for prototype in &parts.prototypes {
            let _ = writeln!(code, "{prototype}");
        }
        code.push_str("\n// Function bodies.\n");
        code.push_str(&parts.bodies.join("\n"));
    }

    code.push_str("\n// Module initialization, running the module-level code.\n");
    let _ = writeln!(code, "MOD_INIT_DECL( {mangled} )");
    code.push_str("{\n");
    if standalone {
        code.push_str("    static bool _init_done = false;\n");
        code.push_str("    if ( !_init_done )\n    {\n");
        code.push_str("        _initConstants();\n");
        code.push_str("        _init_done = true;\n");
        code.push_str("    }\n");
    }
    let _ = writeln!(code, "    {module_object} = MAKE_MODULE( {name_constant} );");
    let _ = writeln!(code, "    {module_dict} = MODULE_DICT( {module_object} );");
    code.push_str(&parts.init);
    let _ = writeln!(code, "    return MOD_RETURN_VALUE( {module_object} );");
    code.push_str("}\n");

    debug!(
        module = %module,
        functions = parts.bodies.len(),
        bytes = code.len(),
        "module code generated"
    );
    Ok(code)
}

/// Declaration header of an importable module.
pub fn generate_module_declaration(module: &QualifiedName) -> String {
    let mangled = mangle_module(module.as_str());
    let guard = format!("__TESSERA_MODULE_{}_H__", mangled.to_ascii_uppercase());
    format!(
        "// Declarations for module `{module}`.\n\
         \n\
         #ifndef {guard}\n\
         #define {guard}\n\
         \n\
         MOD_INIT_DECL( {mangled} );\n\
         \n\
         #endif\n"
    )
}

/// Wrap the entry module's code with the program entry point: the table of
/// compiled modules, runtime start-up and `main`.
pub fn generate_main_code(module_code: &str, compiled_modules: &[QualifiedName]) -> String {
    let mut code = String::from(module_code);
    code.push_str("\n// Modules compiled into the program, found by the import machinery\n");
    code.push_str("// before the search path.\n");
    code.push_str("static struct Tessera_CompiledModuleEntry _compiled_modules[] =\n{\n");
    for module in compiled_modules {
        let _ = writeln!(
            code,
            "    {{ \"{module}\", MOD_INIT_NAME( {} ) }},",
            mangle_module(module.as_str())
        );
    }
    code.push_str("    { NULL, NULL }\n};\n\n");
    code.push_str("int main( int argc, char *argv[] )\n{\n");
    code.push_str("    Py_Initialize();\n");
    code.push_str("    setCommandLineParameters( argc, argv );\n");
    code.push_str("    _initConstants();\n");
    code.push_str("    registerCompiledModules( _compiled_modules );\n");
    let _ = writeln!(code, "    MOD_INIT_NAME( {} )();", mangle_module(MAIN_MODULE_NAME));
    code.push_str("    return finalizeProgram();\n");
    code.push_str("}\n");
    code
}

/// Definitions of every pooled constant and the function creating them.
pub fn generate_constants_definition(global: &GlobalContext) -> String {
    let mut code = String::from("// Constants shared by every module of the program.\n\n");
    code.push_str("#include \"__constants.hpp\"\n\n");
    for entry in global.constants().iter() {
        let _ = writeln!(code, "PyObject *{};", entry.symbol);
    }
    code.push_str("\nvoid _initConstants( void )\n{\n");
    for entry in global.constants().iter() {
        let _ = writeln!(code, "    {} = {};", entry.symbol, entry.initializer);
    }
    code.push_str("}\n");
    code
}

/// The header every translation unit includes: constant declarations,
/// cross-module declarations and the headers of all importable modules.
pub fn generate_constants_declaration(global: &GlobalContext, module_headers: &[String]) -> String {
    let mut code = String::from("// Declarations of the shared constants.\n\n");
    code.push_str("#ifndef __TESSERA_CONSTANTS_H__\n");
    code.push_str("#define __TESSERA_CONSTANTS_H__\n\n");
    code.push_str("#include \"tessera/prelude.hpp\"\n\n");
    for entry in global.constants().iter() {
        let _ = writeln!(code, "extern PyObject *{};", entry.symbol);
    }
    code.push_str("\nextern void _initConstants( void );\n");
    if !global.declarations().is_empty() {
        code.push_str("\n// Cross-module declarations.\n");
        for declaration in global.declarations().iter() {
            let _ = writeln!(code, "{declaration}");
        }
    }
    if !module_headers.is_empty() {
        code.push('\n');
        for header in module_headers {
            let _ = writeln!(code, "#include \"{header}\"");
        }
    }
    code.push_str("\n#endif\n");
    code
}
