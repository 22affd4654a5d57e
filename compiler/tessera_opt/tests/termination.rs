//! Property tests for optimizer termination.
//!
//! Random modules built from constants, names, operators, conditionals and
//! branching statements must reach a fixpoint well under the pass ceiling,
//! never grow, and keep exclusive ownership intact.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;

use tessera_ir::construct::*;
use tessera_ir::{BinaryOp, BoolOp, CompareOp, NodeId, NodeTree, UnaryOp};
use tessera_opt::{optimize_tree, ImportQueue, OptimizerConfig};

#[derive(Clone, Debug)]
enum Expr {
    Int(i64),
    Str(String),
    Name(&'static str),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Bool(BoolOp, Box<Expr>, Box<Expr>),
    Cond(Box<Expr>, Box<Expr>, Box<Expr>),
    Tuple(Vec<Expr>),
    Len(Box<Expr>),
}

#[derive(Clone, Debug)]
enum Stmt {
    Assign(&'static str, Expr),
    If(Expr, Vec<Stmt>, Vec<Stmt>),
    While(Expr, Vec<Stmt>),
    Expr(Expr),
}

const NAMES: [&str; 3] = ["a", "b", "c"];

fn binary_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Add),
        Just(BinaryOp::Sub),
        Just(BinaryOp::Mul),
        Just(BinaryOp::Div),
        Just(BinaryOp::FloorDiv),
        Just(BinaryOp::Mod),
        Just(BinaryOp::Pow),
        Just(BinaryOp::LShift),
        Just(BinaryOp::BitXor),
    ]
}

fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (-1000i64..1000).prop_map(Expr::Int),
        Just(Expr::Int(i64::MAX)),
        "[a-c]{0,3}".prop_map(Expr::Str),
        prop::sample::select(NAMES.to_vec()).prop_map(Expr::Name),
    ];
    leaf.prop_recursive(6, 64, 4, |inner| {
        prop_oneof![
            (binary_op(), inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| Expr::Binary(op, Box::new(l), Box::new(r))),
            (
                prop_oneof![Just(UnaryOp::Neg), Just(UnaryOp::Not), Just(UnaryOp::Invert)],
                inner.clone()
            )
                .prop_map(|(op, e)| Expr::Unary(op, Box::new(e))),
            (
                prop_oneof![Just(CompareOp::Lt), Just(CompareOp::Eq), Just(CompareOp::In)],
                inner.clone(),
                inner.clone()
            )
                .prop_map(|(op, l, r)| Expr::Compare(op, Box::new(l), Box::new(r))),
            (
                prop_oneof![Just(BoolOp::And), Just(BoolOp::Or)],
                inner.clone(),
                inner.clone()
            )
                .prop_map(|(op, l, r)| Expr::Bool(op, Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, e)| Expr::Cond(Box::new(c), Box::new(t), Box::new(e))),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Expr::Tuple),
            inner.prop_map(|e| Expr::Len(Box::new(e))),
        ]
    })
}

fn stmt_strategy() -> impl Strategy<Value = Stmt> {
    let simple = prop_oneof![
        (prop::sample::select(NAMES.to_vec()), expr_strategy())
            .prop_map(|(n, e)| Stmt::Assign(n, e)),
        expr_strategy().prop_map(Stmt::Expr),
    ];
    simple.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            (
                expr_strategy(),
                prop::collection::vec(inner.clone(), 0..3),
                prop::collection::vec(inner.clone(), 0..3)
            )
                .prop_map(|(c, t, e)| Stmt::If(c, t, e)),
            (expr_strategy(), prop::collection::vec(inner, 0..3))
                .prop_map(|(c, b)| Stmt::While(c, b)),
        ]
    })
}

fn build_expr(tree: &mut NodeTree, expr: &Expr) -> NodeId {
    match expr {
        Expr::Int(v) => int(tree, *v),
        Expr::Str(s) => string(tree, s),
        Expr::Name(n) => name(tree, n),
        Expr::Binary(op, l, r) => {
            let (l, r) = (build_expr(tree, l), build_expr(tree, r));
            binary(tree, *op, l, r)
        }
        Expr::Unary(op, e) => {
            let e = build_expr(tree, e);
            unary(tree, *op, e)
        }
        Expr::Compare(op, l, r) => {
            let (l, r) = (build_expr(tree, l), build_expr(tree, r));
            compare(tree, *op, l, r)
        }
        Expr::Bool(op, l, r) => {
            let (l, r) = (build_expr(tree, l), build_expr(tree, r));
            bool_op(tree, *op, l, r)
        }
        Expr::Cond(c, t, e) => {
            let (c, t, e) = (build_expr(tree, c), build_expr(tree, t), build_expr(tree, e));
            conditional(tree, c, t, e)
        }
        Expr::Tuple(items) => {
            let items = items.iter().map(|e| build_expr(tree, e)).collect();
            tuple(tree, items)
        }
        Expr::Len(e) => {
            let e = build_expr(tree, e);
            call_name(tree, "len", vec![e])
        }
    }
}

fn build_stmt(tree: &mut NodeTree, stmt: &Stmt) -> NodeId {
    match stmt {
        Stmt::Assign(n, e) => {
            let e = build_expr(tree, e);
            assign(tree, n, e)
        }
        Stmt::Expr(e) => {
            let e = build_expr(tree, e);
            expr_stmt(tree, e)
        }
        Stmt::If(c, then_body, else_body) => {
            let c = build_expr(tree, c);
            let then_body = then_body.iter().map(|s| build_stmt(tree, s)).collect();
            let else_body = else_body.iter().map(|s| build_stmt(tree, s)).collect();
            if_stmt(tree, c, then_body, else_body)
        }
        Stmt::While(c, body) => {
            let c = build_expr(tree, c);
            let body = body.iter().map(|s| build_stmt(tree, s)).collect();
            while_stmt(tree, c, body)
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn optimizer_reaches_fixpoint(stmts in prop::collection::vec(stmt_strategy(), 0..6)) {
        let mut tree = module_tree(|t| stmts.iter().map(|s| build_stmt(t, s)).collect()).unwrap();
        let before = tree.weight();
        let mut imports = ImportQueue::new();
        let report = optimize_tree(&mut tree, &OptimizerConfig::default(), &mut imports)
            .expect("fixpoint within the default ceiling");
        prop_assert!(report.passes <= 8, "took {} passes", report.passes);
        prop_assert!(tree.weight() <= before);
        prop_assert_eq!(report.final_weight, tree.weight());
        prop_assert!(tree.validate().is_ok());

        // A second run finds nothing left to do.
        let again = optimize_tree(&mut tree, &OptimizerConfig::default(), &mut imports).unwrap();
        prop_assert_eq!(again.rewrites, 0);
        prop_assert_eq!(again.passes, 1);
    }
}
