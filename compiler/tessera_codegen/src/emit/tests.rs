#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use tessera_finalize::{finalize_module, ImportTable};
use tessera_ir::construct::*;
use tessera_ir::{BoolOp, NodeCategory, NodeTree, QualifiedName, Span};

use super::*;
use crate::context::ModuleParts;
use crate::GlobalContext;

fn module_name() -> QualifiedName {
    QualifiedName::from("m")
}

fn finalized(body: impl FnOnce(&mut NodeTree) -> Vec<NodeId>) -> NodeTree {
    let mut tree = module_tree(body).unwrap();
    finalize_module(&mut tree, &module_name(), &ImportTable::default()).unwrap();
    tree
}

fn generate_with(tree: &NodeTree, global: &mut GlobalContext) -> ModuleParts {
    let mut ctx = CodeGenContext::new(tree, global, module_name(), "m");
    emit_module_body(&mut ctx).unwrap();
    ctx.finish()
}

fn generate(tree: &NodeTree) -> ModuleParts {
    generate_with(tree, &mut GlobalContext::new())
}

#[test]
fn test_dispatch_table_follows_node_categories() {
    for tag in NodeTag::ALL {
        let expected = match tag.category() {
            NodeCategory::Module => EmitterKind::Module,
            NodeCategory::Definition | NodeCategory::Statement => EmitterKind::Statement,
            NodeCategory::Clause => EmitterKind::Clause,
            NodeCategory::Expression => EmitterKind::Expression,
        };
        assert_eq!(emitter_for(tag), expected, "{tag}");
    }
}

#[test]
fn test_statement_rejected_as_expression() {
    let mut tree = NodeTree::new();
    let pass = tree.alloc(NodeKind::Pass, Span::DUMMY);
    let mut global = GlobalContext::new();
    let mut ctx = CodeGenContext::new(&tree, &mut global, module_name(), "m");

    let err = emit_expression(&mut ctx, pass).unwrap_err();
    assert_eq!(
        err,
        CodeGenerationError::UnexpectedKind {
            node: pass,
            tag: NodeTag::Pass,
            expected: EmitterKind::Expression,
        }
    );
    assert_eq!(
        err.to_string(),
        format!("Pass node {pass:?} cannot be emitted as an expression")
    );
}

#[test]
fn test_unpaired_dict_is_rejected() {
    let mut tree = NodeTree::new();
    let key = int(&mut tree, 1);
    let extra = int(&mut tree, 2);
    let value = int(&mut tree, 3);
    let d = dict(&mut tree, vec![key, extra], vec![value]);
    let mut global = GlobalContext::new();
    let mut ctx = CodeGenContext::new(&tree, &mut global, module_name(), "m");

    assert_eq!(
        emit_expression(&mut ctx, d).unwrap_err(),
        CodeGenerationError::UnpairedDict {
            node: d,
            keys: 2,
            values: 1,
        }
    );
}

#[test]
fn test_expression_and_clause_rejected_as_statement() {
    let mut tree = NodeTree::new();
    let one = int(&mut tree, 1);
    let handler = except_handler(&mut tree, None, None, vec![]);
    let mut global = GlobalContext::new();
    let mut ctx = CodeGenContext::new(&tree, &mut global, module_name(), "m");

    assert!(matches!(
        emit_statement(&mut ctx, one),
        Err(CodeGenerationError::UnexpectedKind {
            tag: NodeTag::Constant,
            expected: EmitterKind::Statement,
            ..
        })
    ));
    assert!(matches!(
        emit_statement(&mut ctx, handler),
        Err(CodeGenerationError::UnexpectedKind {
            tag: NodeTag::ExceptHandler,
            expected: EmitterKind::Statement,
            ..
        })
    ));
}

#[test]
fn test_unfinalized_store_is_unresolved() {
    let tree = module_tree(|t| {
        let one = int(t, 1);
        vec![assign(t, "x", one)]
    })
    .unwrap();
    let mut global = GlobalContext::new();
    let mut ctx = CodeGenContext::new(&tree, &mut global, module_name(), "m");

    assert!(matches!(
        emit_module_body(&mut ctx),
        Err(CodeGenerationError::UnresolvedBinding {
            tag: NodeTag::Assign,
            ..
        })
    ));
}

#[test]
fn test_module_assignment() {
    let tree = finalized(|t| {
        let one = int(t, 1);
        vec![assign(t, "x", one)]
    });
    let parts = generate(&tree);

    assert_eq!(
        parts.init,
        "    SET_MODULE_VALUE( _moduledict_m, const_str_plain_x, const_int_1 );\n"
    );
    assert!(parts.prototypes.is_empty());
    assert!(parts.bodies.is_empty());
}

#[test]
fn test_builtin_specialization() {
    let tree = finalized(|t| {
        let one = int(t, 1);
        let x = assign(t, "x", one);
        let load = name(t, "x");
        let call = call_name(t, "len", vec![load]);
        vec![x, expr_stmt(t, call)]
    });
    let parts = generate(&tree);

    assert!(parts.init.contains(
        "DECREASE_REFCOUNT( BUILTIN_LEN( LOOKUP_MODULE_VALUE( _moduledict_m, const_str_plain_x ) ) );"
    ));
    assert!(!parts.init.contains("CALL_FUNCTION"));
}

#[test]
fn test_call_arguments_evaluate_in_order() {
    let tree = finalized(|t| {
        let one = int(t, 1);
        let two = int(t, 2);
        let call = call_name(t, "print", vec![one, two]);
        vec![expr_stmt(t, call)]
    });
    let parts = generate(&tree);

    assert_eq!(
        parts.init,
        "    DECREASE_REFCOUNT( CALL_FUNCTION_WITH_ARGS( EVAL_ORDERED_2( \
         LOOKUP_BUILTIN( const_str_plain_print ), \
         PyObjectTemporary( MAKE_TUPLE( EVAL_ORDERED_2( const_int_1, const_int_2 ) ) ).asObject() ) ) );\n"
    );
}

#[test]
fn test_function_definition() {
    let tree = finalized(|t| {
        let load = name(t, "a");
        let body = vec![ret(t, Some(load))];
        vec![function_def(t, "f", &["a"], body)]
    });
    let parts = generate(&tree);

    assert_eq!(
        parts.prototypes,
        vec!["static PyObject *impl_m__function_1_f( PyObject **_python_args );".to_owned()]
    );
    assert_eq!(
        parts.bodies,
        vec![
            "static PyObject *impl_m__function_1_f( PyObject **_python_args )\n\
             {\n    \
             PyObjectLocalVariable _python_var_a( INCREASE_REFCOUNT( _python_args[ 0 ] ) );\n    \
             return INCREASE_REFCOUNT( _python_var_a.asObject() );\n    \
             return INCREASE_REFCOUNT( Py_None );\n\
             }\n"
                .to_owned()
        ]
    );
    assert_eq!(
        parts.init,
        "    SET_MODULE_VALUE( _moduledict_m, const_str_plain_f, PyObjectTemporary( \
         MAKE_FUNCTION( impl_m__function_1_f, const_str_plain_f, 1, _moduledict_m ) ).asObject() );\n"
    );
}

#[test]
fn test_nested_function_bodies_keep_definition_order() {
    let tree = finalized(|t| {
        let inner_body = vec![pass(t)];
        let inner = function_def(t, "inner", &[], inner_body);
        let load = name(t, "inner");
        let outer_body = vec![inner, ret(t, Some(load))];
        vec![function_def(t, "outer", &[], outer_body)]
    });
    let parts = generate(&tree);

    assert_eq!(parts.bodies.len(), 2);
    assert!(parts.bodies[0].starts_with("static PyObject *impl_m__function_1_outer("));
    assert!(parts.bodies[1].starts_with("static PyObject *impl_m__function_2_inner("));
    // The inner frame closes first.
    assert_eq!(
        parts.prototypes,
        vec![
            "static PyObject *impl_m__function_2_inner( PyObject **_python_args );".to_owned(),
            "static PyObject *impl_m__function_1_outer( PyObject **_python_args );".to_owned(),
        ]
    );
    assert!(parts.bodies[0].contains("_python_var_inner.assign( MAKE_FUNCTION( impl_m__function_2_inner"));
}

#[test]
fn test_class_body_uses_namespace() {
    let tree = finalized(|t| {
        let one = int(t, 1);
        let y = assign(t, "y", one);
        let load = name(t, "y");
        let z = assign(t, "z", load);
        vec![class_def(t, "C", vec![], vec![y, z])]
    });
    let parts = generate(&tree);

    let body = &parts.bodies[0];
    assert!(body.starts_with("static PyObject *impl_m__class_1_C( void )\n"));
    assert!(body.contains("PyObject *_locals = PyDict_New();"));
    assert!(body.contains("SET_CLASS_VALUE( _locals, const_str_plain_y, const_int_1 );"));
    assert!(body.contains(
        "SET_CLASS_VALUE( _locals, const_str_plain_z, \
         LOOKUP_CLASS_VALUE( _locals, const_str_plain_y, _moduledict_m ) );"
    ));
    assert!(parts.init.contains(
        "MAKE_CLASS( EVAL_ORDERED_3( const_str_plain_C, const_tuple_empty, impl_m__class_1_C() ) )"
    ));
}

#[test]
fn test_class_binding_outside_class_is_rejected() {
    let mut load = None;
    let mut tree = finalized(|t| {
        let id = name(t, "x");
        load = Some(id);
        vec![expr_stmt(t, id)]
    });
    let load = load.unwrap();
    tree.meta_mut(load).binding = Some(Binding::ClassLocal);

    let mut global = GlobalContext::new();
    let mut ctx = CodeGenContext::new(&tree, &mut global, module_name(), "m");
    assert_eq!(
        emit_module_body(&mut ctx),
        Err(CodeGenerationError::UnresolvedBinding {
            node: load,
            tag: NodeTag::Name,
        })
    );
}

#[test]
fn test_try_handlers_nest_and_reraise() {
    let tree = finalized(|t| {
        let body = vec![pass(t)];
        let error = name(t, "ValueError");
        let first_body = vec![pass(t)];
        let first = except_handler(t, Some(error), Some("e"), first_body);
        let second_body = vec![pass(t)];
        let second = except_handler(t, None, None, second_body);
        vec![try_stmt(t, body, vec![first, second])]
    });
    let parts = generate(&tree);

    assert!(parts.init.contains("catch ( _PythonException &_tmp0 )"));
    assert!(parts
        .init
        .contains("if ( _tmp0.matches( LOOKUP_BUILTIN( const_str_plain_ValueError ) ) )"));
    assert!(parts.init.contains(
        "SET_MODULE_VALUE( _moduledict_m, const_str_plain_e, PyObjectTemporary( _tmp0.getObject() ).asObject() );"
    ));
    assert!(parts.init.contains("if ( true )"));
    assert!(parts.init.contains("throw;"));
    let matches = parts.init.find(".matches(").unwrap();
    let catch_all = parts.init.find("if ( true )").unwrap();
    assert!(matches < catch_all);
}

#[test]
fn test_for_loop_stops_on_exhaustion() {
    let tree = finalized(|t| {
        let items = list(t, vec![]);
        let load = name(t, "item");
        let call = call_name(t, "print", vec![load]);
        let body = vec![expr_stmt(t, call)];
        vec![for_stmt(t, "item", items, body)]
    });
    let parts = generate(&tree);

    assert!(parts
        .init
        .contains("PyObjectTemporary _tmp0( MAKE_ITERATOR( PyObjectTemporary( MAKE_LIST() ).asObject() ) );"));
    assert!(parts.init.contains("PyObject *_tmp1 = ITERATOR_NEXT( _tmp0.asObject() );"));
    assert!(parts.init.contains("if ( _tmp1 == NULL )"));
    assert!(parts.init.contains(
        "SET_MODULE_VALUE( _moduledict_m, const_str_plain_item, PyObjectTemporary( _tmp1 ).asObject() );"
    ));
}

#[test]
fn test_compiled_import_registers_declaration() {
    let mut tree = module_tree(|t| vec![import(t, "util", None), import(t, "os.path", None)]).unwrap();
    let imports = ImportTable::new([QualifiedName::from("util")], []);
    finalize_module(&mut tree, &module_name(), &imports).unwrap();

    let mut global = GlobalContext::new();
    let parts = generate_with(&tree, &mut global);

    assert!(parts.init.contains(
        "SET_MODULE_VALUE( _moduledict_m, const_str_plain_util, PyObjectTemporary( \
         IMPORT_EMBEDDED_MODULE( const_str_plain_util, MOD_INIT_NAME( util ) ) ).asObject() );"
    ));
    assert!(parts.init.contains("IMPORT_MODULE_TOP_LEVEL( const_str_"));
    assert!(parts.init.contains("const_str_plain_os,"));
    assert_eq!(
        global.declarations().iter().collect::<Vec<_>>(),
        vec!["MOD_INIT_DECL( util );"]
    );
}

#[test]
fn test_bool_op_keeps_left_operand() {
    let tree = finalized(|t| {
        let zero = int(t, 0);
        let one = int(t, 1);
        let value = bool_op(t, BoolOp::Or, zero, one);
        vec![assign(t, "x", value)]
    });
    let parts = generate(&tree);

    let lines: Vec<&str> = parts.init.lines().collect();
    assert_eq!(lines[0], "    PyObjectTempKeeper _tmp0;");
    assert!(lines[1].contains(
        "( _tmp0.assign( INCREASE_REFCOUNT( const_int_0 ) ), CHECK_IF_TRUE( _tmp0.asObject0() ) \
         ? _tmp0.asObject1() : INCREASE_REFCOUNT( const_int_1 ) )"
    ));
}

#[test]
fn test_set_display_is_built_from_a_tuple() {
    let tree = finalized(|t| {
        let one = int(t, 1);
        let two = int(t, 2);
        let bind_a = assign(t, "a", one);
        let bind_b = assign(t, "b", two);
        let a = name(t, "a");
        let b = name(t, "b");
        let value = set(t, vec![a, b]);
        vec![bind_a, bind_b, assign(t, "x", value)]
    });
    let parts = generate(&tree);

    assert!(
        parts.init.contains(
            "MAKE_SET( PyObjectTemporary( MAKE_TUPLE( EVAL_ORDERED_2( \
             LOOKUP_MODULE_VALUE( _moduledict_m, const_str_plain_a ), \
             LOOKUP_MODULE_VALUE( _moduledict_m, const_str_plain_b ) ) ) ).asObject() )"
        ),
        "{}",
        parts.init
    );
    assert!(!parts.init.contains("MAKE_SET( EVAL_ORDERED"));
}

#[test]
fn test_constants_are_shared_between_modules() {
    let first = finalized(|t| {
        let value = string(t, "hello world");
        vec![assign(t, "x", value)]
    });
    let second = finalized(|t| {
        let value = string(t, "hello world");
        vec![assign(t, "y", value)]
    });
    let mut global = GlobalContext::new();
    let first = generate_with(&first, &mut global);
    let second = generate_with(&second, &mut global);

    let symbol = global
        .constants()
        .get(&tessera_ir::ConstValue::str("hello world"))
        .unwrap()
        .to_owned();
    assert!(first.init.contains(&symbol));
    assert!(second.init.contains(&symbol));
}
