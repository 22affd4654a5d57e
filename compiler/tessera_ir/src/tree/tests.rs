#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use super::*;
use crate::construct::*;
use crate::{BinaryOp, ConstValue, NodeTag};

#[test]
fn test_new_tree_has_empty_module_root() {
    let tree = NodeTree::new();
    assert_eq!(tree.kind(tree.root()), &NodeKind::Module { body: vec![] });
    assert_eq!(tree.preorder(), vec![tree.root()]);
    assert!(!tree.is_finalized());
}

#[test]
fn test_alloc_links_children_to_parent() {
    let mut tree = NodeTree::new();
    let one = int(&mut tree, 1);
    let two = int(&mut tree, 2);
    let sum = binary(&mut tree, BinaryOp::Add, one, two);
    assert_eq!(tree.parent(one), Some(sum));
    assert_eq!(tree.parent(two), Some(sum));
    assert_eq!(tree.parent(sum), None);
    assert!(!tree.is_attached(sum));
}

#[test]
fn test_preorder_visits_parent_before_children() {
    let mut stmt = None;
    let tree = module_tree(|t| {
        let one = int(t, 1);
        let two = int(t, 2);
        let sum = binary(t, BinaryOp::Add, one, two);
        let s = assign(t, "x", sum);
        stmt = Some(s);
        vec![s]
    })
    .unwrap();
    let tags: Vec<NodeTag> = tree
        .preorder()
        .into_iter()
        .map(|id| tree.kind(id).tag())
        .collect();
    assert_eq!(
        tags,
        vec![
            NodeTag::Module,
            NodeTag::Assign,
            NodeTag::BinaryOp,
            NodeTag::Constant,
            NodeTag::Constant,
        ]
    );
    assert!(tree.is_attached(stmt.unwrap()));
    tree.validate().unwrap();
}

#[test]
fn test_weight_counts_constants_once() {
    let tree = module_tree(|t| {
        let one = int(t, 1);
        let two = int(t, 2);
        let sum = binary(t, BinaryOp::Add, one, two);
        vec![expr_stmt(t, sum)]
    })
    .unwrap();
    // Module 2 + ExprStmt 2 + BinaryOp 2 + two constants
    assert_eq!(tree.weight(), 8);
}

#[test]
fn test_replace_with_leaf_detaches_old_children() {
    let mut sum = None;
    let mut one = None;
    let mut tree = module_tree(|t| {
        let a = int(t, 1);
        let b = int(t, 2);
        let s = binary(t, BinaryOp::Add, a, b);
        sum = Some(s);
        one = Some(a);
        vec![expr_stmt(t, s)]
    })
    .unwrap();
    let before = tree.weight();
    let sum = sum.unwrap();
    tree.replace(sum, NodeKind::Constant(ConstValue::Int(3)))
        .unwrap();
    assert!(!tree.is_attached(one.unwrap()));
    assert!(tree.weight() < before);
    tree.validate().unwrap();
}

#[test]
fn test_hoist_takes_descendant_kind() {
    let mut cond = None;
    let mut chosen = None;
    let mut tree = module_tree(|t| {
        let c = boolean(t, true);
        let yes = name(t, "yes");
        let no = name(t, "no");
        let e = conditional(t, c, yes, no);
        cond = Some(e);
        chosen = Some(yes);
        vec![expr_stmt(t, e)]
    })
    .unwrap();
    let (cond, chosen) = (cond.unwrap(), chosen.unwrap());
    tree.hoist(cond, chosen).unwrap();
    assert_eq!(tree.kind(cond), &NodeKind::Name(crate::Name::from("yes")));
    assert!(!tree.is_attached(chosen));
    tree.validate().unwrap();
}

#[test]
fn test_replace_rejects_ancestor_as_child() {
    let mut inner = None;
    let mut outer = None;
    let mut tree = module_tree(|t| {
        let a = int(t, 1);
        let b = int(t, 2);
        let i = binary(t, BinaryOp::Add, a, b);
        let c = int(t, 3);
        let o = binary(t, BinaryOp::Mul, i, c);
        inner = Some(i);
        outer = Some(o);
        vec![expr_stmt(t, o)]
    })
    .unwrap();
    let (inner, outer) = (inner.unwrap(), outer.unwrap());
    let fresh = int(&mut tree, 9);
    let err = tree
        .replace(
            inner,
            NodeKind::BinaryOp {
                op: BinaryOp::Add,
                left: outer,
                right: fresh,
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        TreeError::WouldCycle {
            node: inner,
            child: outer
        }
    );
    tree.validate().unwrap();
}

#[test]
fn test_replace_rejects_node_owned_elsewhere() {
    let mut left_stmt_value = None;
    let mut right_stmt_value = None;
    let mut tree = module_tree(|t| {
        let a = name(t, "a");
        let b = name(t, "b");
        left_stmt_value = Some(a);
        right_stmt_value = Some(b);
        vec![expr_stmt(t, a), expr_stmt(t, b)]
    })
    .unwrap();
    let (a, b) = (left_stmt_value.unwrap(), right_stmt_value.unwrap());
    let err = tree
        .replace(
            a,
            NodeKind::UnaryOp {
                op: crate::UnaryOp::Neg,
                operand: b,
            },
        )
        .unwrap_err();
    assert!(matches!(err, TreeError::SharedNode { child, .. } if child == b));
}

#[test]
fn test_statement_slot_and_splice() {
    let mut if_id = None;
    let mut tree = module_tree(|t| {
        let first = pass(t);
        let cond = boolean(t, true);
        let x = int(t, 1);
        let body = assign(t, "x", x);
        let i = if_stmt(t, cond, vec![body], vec![]);
        if_id = Some(i);
        vec![first, i]
    })
    .unwrap();
    let if_id = if_id.unwrap();
    let slot = tree.statement_slot(if_id).unwrap();
    assert_eq!(
        slot,
        StatementSlot {
            owner: tree.root(),
            slot: 0,
            index: 1
        }
    );

    let then_body = tree.kind(if_id).statement_list(0).unwrap().to_vec();
    let mut body = tree.kind(slot.owner).statement_list(0).unwrap().to_vec();
    body.splice(slot.index..=slot.index, then_body.iter().copied());
    tree.set_statement_list(slot.owner, slot.slot, body).unwrap();

    assert!(!tree.is_attached(if_id));
    assert!(tree.is_attached(then_body[0]));
    assert_eq!(tree.parent(then_body[0]), Some(tree.root()));
    tree.validate().unwrap();
}

#[test]
fn test_set_statement_list_on_expression_fails() {
    let mut tree = NodeTree::new();
    let x = int(&mut tree, 1);
    assert_eq!(
        tree.set_statement_list(x, 0, vec![]),
        Err(TreeError::NoStatementList { node: x, slot: 0 })
    );
}

#[test]
fn test_validate_reports_shared_child() {
    let mut tree = NodeTree::new();
    let shared = int(&mut tree, 1);
    let first = expr_stmt(&mut tree, shared);
    // A second owner steals the parent link.
    let _second = expr_stmt(&mut tree, shared);
    let root = tree.root();
    tree.set_statement_list(root, 0, vec![first]).unwrap();
    assert!(matches!(
        tree.validate(),
        Err(TreeError::ParentMismatch { child, .. }) if child == shared
    ));
}

#[test]
fn test_validate_reports_unpaired_dict() {
    let tree = module_tree(|t| {
        let k1 = int(t, 1);
        let k2 = int(t, 2);
        let v1 = int(t, 10);
        let d = dict(t, vec![k1, k2], vec![v1]);
        vec![assign(t, "x", d)]
    })
    .unwrap();
    assert!(matches!(
        tree.validate(),
        Err(TreeError::UnpairedDict {
            keys: 2,
            values: 1,
            ..
        })
    ));
}

#[test]
fn test_mark_finalized() {
    let mut tree = NodeTree::new();
    tree.mark_finalized();
    assert!(tree.is_finalized());
}
