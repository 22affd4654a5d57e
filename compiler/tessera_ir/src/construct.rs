//! Shorthand constructors for building trees by hand.
//!
//! Front ends and tests build trees bottom-up: children first, then the node
//! that owns them. All nodes built here carry [`Span::DUMMY`].

use crate::{
    BinaryOp, BoolOp, CompareOp, ConstValue, ImportedName, Name, NodeId, NodeKind, NodeTree,
    QualifiedName, Span, TreeError, UnaryOp,
};

/// Build a module tree whose body is the statement list returned by `body`.
pub fn module_tree(
    body: impl FnOnce(&mut NodeTree) -> Vec<NodeId>,
) -> Result<NodeTree, TreeError> {
    let mut tree = NodeTree::new();
    let statements = body(&mut tree);
    let root = tree.root();
    tree.set_statement_list(root, 0, statements)?;
    Ok(tree)
}

#[inline]
fn node(tree: &mut NodeTree, kind: NodeKind) -> NodeId {
    tree.alloc(kind, Span::DUMMY)
}

pub fn constant(tree: &mut NodeTree, value: ConstValue) -> NodeId {
    node(tree, NodeKind::Constant(value))
}

pub fn int(tree: &mut NodeTree, value: i64) -> NodeId {
    constant(tree, ConstValue::Int(value))
}

pub fn float(tree: &mut NodeTree, value: f64) -> NodeId {
    constant(tree, ConstValue::float(value))
}

pub fn string(tree: &mut NodeTree, value: &str) -> NodeId {
    constant(tree, ConstValue::str(value))
}

pub fn boolean(tree: &mut NodeTree, value: bool) -> NodeId {
    constant(tree, ConstValue::Bool(value))
}

pub fn none(tree: &mut NodeTree) -> NodeId {
    constant(tree, ConstValue::None)
}

pub fn name(tree: &mut NodeTree, name: &str) -> NodeId {
    node(tree, NodeKind::Name(Name::from(name)))
}

pub fn attribute(tree: &mut NodeTree, object: NodeId, attribute: &str) -> NodeId {
    node(
        tree,
        NodeKind::Attribute {
            object,
            attribute: Name::from(attribute),
        },
    )
}

pub fn subscript(tree: &mut NodeTree, object: NodeId, index: NodeId) -> NodeId {
    node(tree, NodeKind::Subscript { object, index })
}

pub fn binary(tree: &mut NodeTree, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
    node(tree, NodeKind::BinaryOp { op, left, right })
}

pub fn unary(tree: &mut NodeTree, op: UnaryOp, operand: NodeId) -> NodeId {
    node(tree, NodeKind::UnaryOp { op, operand })
}

pub fn compare(tree: &mut NodeTree, op: CompareOp, left: NodeId, right: NodeId) -> NodeId {
    node(tree, NodeKind::Compare { op, left, right })
}

pub fn bool_op(tree: &mut NodeTree, op: BoolOp, left: NodeId, right: NodeId) -> NodeId {
    node(tree, NodeKind::BoolOp { op, left, right })
}

pub fn conditional(
    tree: &mut NodeTree,
    cond: NodeId,
    then_value: NodeId,
    else_value: NodeId,
) -> NodeId {
    node(
        tree,
        NodeKind::Conditional {
            cond,
            then_value,
            else_value,
        },
    )
}

pub fn call(tree: &mut NodeTree, callee: NodeId, args: Vec<NodeId>) -> NodeId {
    node(tree, NodeKind::Call { callee, args })
}

/// `callee(args...)` where the callee is a plain name.
pub fn call_name(tree: &mut NodeTree, callee: &str, args: Vec<NodeId>) -> NodeId {
    let callee = name(tree, callee);
    call(tree, callee, args)
}

pub fn tuple(tree: &mut NodeTree, elements: Vec<NodeId>) -> NodeId {
    node(tree, NodeKind::Tuple { elements })
}

pub fn list(tree: &mut NodeTree, elements: Vec<NodeId>) -> NodeId {
    node(tree, NodeKind::List { elements })
}

pub fn set(tree: &mut NodeTree, elements: Vec<NodeId>) -> NodeId {
    node(tree, NodeKind::Set { elements })
}

pub fn dict(tree: &mut NodeTree, keys: Vec<NodeId>, values: Vec<NodeId>) -> NodeId {
    node(tree, NodeKind::Dict { keys, values })
}

pub fn lambda(tree: &mut NodeTree, params: &[&str], body: NodeId) -> NodeId {
    node(
        tree,
        NodeKind::Lambda {
            params: params.iter().map(|&p| Name::from(p)).collect(),
            body,
        },
    )
}

pub fn assign(tree: &mut NodeTree, target: &str, value: NodeId) -> NodeId {
    node(
        tree,
        NodeKind::Assign {
            target: Name::from(target),
            value,
        },
    )
}

pub fn attribute_assign(
    tree: &mut NodeTree,
    object: NodeId,
    attribute: &str,
    value: NodeId,
) -> NodeId {
    node(
        tree,
        NodeKind::AttributeAssign {
            object,
            attribute: Name::from(attribute),
            value,
        },
    )
}

pub fn subscript_assign(
    tree: &mut NodeTree,
    object: NodeId,
    index: NodeId,
    value: NodeId,
) -> NodeId {
    node(
        tree,
        NodeKind::SubscriptAssign {
            object,
            index,
            value,
        },
    )
}

pub fn expr_stmt(tree: &mut NodeTree, value: NodeId) -> NodeId {
    node(tree, NodeKind::ExprStmt { value })
}

pub fn ret(tree: &mut NodeTree, value: Option<NodeId>) -> NodeId {
    node(tree, NodeKind::Return { value })
}

pub fn if_stmt(
    tree: &mut NodeTree,
    cond: NodeId,
    then_body: Vec<NodeId>,
    else_body: Vec<NodeId>,
) -> NodeId {
    node(
        tree,
        NodeKind::If {
            cond,
            then_body,
            else_body,
        },
    )
}

pub fn while_stmt(tree: &mut NodeTree, cond: NodeId, body: Vec<NodeId>) -> NodeId {
    node(tree, NodeKind::While { cond, body })
}

pub fn for_stmt(tree: &mut NodeTree, target: &str, iter: NodeId, body: Vec<NodeId>) -> NodeId {
    node(
        tree,
        NodeKind::For {
            target: Name::from(target),
            iter,
            body,
        },
    )
}

pub fn pass(tree: &mut NodeTree) -> NodeId {
    node(tree, NodeKind::Pass)
}

pub fn break_stmt(tree: &mut NodeTree) -> NodeId {
    node(tree, NodeKind::Break)
}

pub fn continue_stmt(tree: &mut NodeTree) -> NodeId {
    node(tree, NodeKind::Continue)
}

pub fn raise(tree: &mut NodeTree, exception: Option<NodeId>) -> NodeId {
    node(tree, NodeKind::Raise { exception })
}

pub fn try_stmt(tree: &mut NodeTree, body: Vec<NodeId>, handlers: Vec<NodeId>) -> NodeId {
    node(tree, NodeKind::Try { body, handlers })
}

pub fn except_handler(
    tree: &mut NodeTree,
    exception: Option<NodeId>,
    name: Option<&str>,
    body: Vec<NodeId>,
) -> NodeId {
    node(
        tree,
        NodeKind::ExceptHandler {
            exception,
            name: name.map(Name::from),
            body,
        },
    )
}

pub fn function_def(tree: &mut NodeTree, name: &str, params: &[&str], body: Vec<NodeId>) -> NodeId {
    node(
        tree,
        NodeKind::FunctionDef {
            name: Name::from(name),
            params: params.iter().map(|&p| Name::from(p)).collect(),
            body,
        },
    )
}

pub fn class_def(tree: &mut NodeTree, name: &str, bases: Vec<NodeId>, body: Vec<NodeId>) -> NodeId {
    node(
        tree,
        NodeKind::ClassDef {
            name: Name::from(name),
            bases,
            body,
        },
    )
}

pub fn import(tree: &mut NodeTree, module: &str, alias: Option<&str>) -> NodeId {
    node(
        tree,
        NodeKind::Import {
            module: QualifiedName::from(module),
            alias: alias.map(Name::from),
        },
    )
}

pub fn import_from(tree: &mut NodeTree, module: &str, names: &[&str]) -> NodeId {
    node(
        tree,
        NodeKind::ImportFrom {
            module: QualifiedName::from(module),
            names: names
                .iter()
                .map(|&n| ImportedName {
                    name: Name::from(n),
                    alias: None,
                })
                .collect(),
        },
    )
}

pub fn global(tree: &mut NodeTree, names: &[&str]) -> NodeId {
    node(
        tree,
        NodeKind::Global {
            names: names.iter().map(|&n| Name::from(n)).collect(),
        },
    )
}

pub fn delete(tree: &mut NodeTree, name: &str) -> NodeId {
    node(
        tree,
        NodeKind::Delete {
            name: Name::from(name),
        },
    )
}
