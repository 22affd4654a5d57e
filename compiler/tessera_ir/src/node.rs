//! Node kinds.
//!
//! [`NodeKind`] is the closed set of program constructs. Child nodes are
//! referenced by [`NodeId`]; the arena in [`crate::NodeTree`] owns them.

use std::fmt;

use smallvec::SmallVec;

use crate::{ConstValue, Name, QualifiedName};

/// Index of a node in its tree's arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Arithmetic and bitwise operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
    Invert,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

/// Short-circuiting operators; the result is one of the operands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoolOp {
    And,
    Or,
}

/// One `name [as alias]` entry of a `from module import ...` statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportedName {
    pub name: Name,
    pub alias: Option<Name>,
}

impl ImportedName {
    /// The name bound in the importing scope.
    pub fn bound_name(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

/// A program construct.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    // Module root
    Module {
        body: Vec<NodeId>,
    },

    // Definitions
    FunctionDef {
        name: Name,
        params: Vec<Name>,
        body: Vec<NodeId>,
    },
    ClassDef {
        name: Name,
        bases: Vec<NodeId>,
        body: Vec<NodeId>,
    },

    // Statements
    Assign {
        target: Name,
        value: NodeId,
    },
    AttributeAssign {
        object: NodeId,
        attribute: Name,
        value: NodeId,
    },
    SubscriptAssign {
        object: NodeId,
        index: NodeId,
        value: NodeId,
    },
    ExprStmt {
        value: NodeId,
    },
    Return {
        value: Option<NodeId>,
    },
    If {
        cond: NodeId,
        then_body: Vec<NodeId>,
        else_body: Vec<NodeId>,
    },
    While {
        cond: NodeId,
        body: Vec<NodeId>,
    },
    For {
        target: Name,
        iter: NodeId,
        body: Vec<NodeId>,
    },
    Break,
    Continue,
    Pass,
    Raise {
        exception: Option<NodeId>,
    },
    Try {
        body: Vec<NodeId>,
        handlers: Vec<NodeId>,
    },
    /// One `except [exception [as name]]:` clause; only valid inside `Try`.
    ExceptHandler {
        exception: Option<NodeId>,
        name: Option<Name>,
        body: Vec<NodeId>,
    },
    Import {
        module: QualifiedName,
        alias: Option<Name>,
    },
    ImportFrom {
        module: QualifiedName,
        names: Vec<ImportedName>,
    },
    Global {
        names: Vec<Name>,
    },
    Delete {
        name: Name,
    },

    // Expressions
    Constant(ConstValue),
    Name(Name),
    Attribute {
        object: NodeId,
        attribute: Name,
    },
    Subscript {
        object: NodeId,
        index: NodeId,
    },
    BinaryOp {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    UnaryOp {
        op: UnaryOp,
        operand: NodeId,
    },
    Compare {
        op: CompareOp,
        left: NodeId,
        right: NodeId,
    },
    BoolOp {
        op: BoolOp,
        left: NodeId,
        right: NodeId,
    },
    Conditional {
        cond: NodeId,
        then_value: NodeId,
        else_value: NodeId,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    Tuple {
        elements: Vec<NodeId>,
    },
    List {
        elements: Vec<NodeId>,
    },
    Set {
        elements: Vec<NodeId>,
    },
    Dict {
        keys: Vec<NodeId>,
        values: Vec<NodeId>,
    },
    Lambda {
        params: Vec<Name>,
        body: NodeId,
    },
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Module { .. } => NodeTag::Module,
            NodeKind::FunctionDef { .. } => NodeTag::FunctionDef,
            NodeKind::ClassDef { .. } => NodeTag::ClassDef,
            NodeKind::Assign { .. } => NodeTag::Assign,
            NodeKind::AttributeAssign { .. } => NodeTag::AttributeAssign,
            NodeKind::SubscriptAssign { .. } => NodeTag::SubscriptAssign,
            NodeKind::ExprStmt { .. } => NodeTag::ExprStmt,
            NodeKind::Return { .. } => NodeTag::Return,
            NodeKind::If { .. } => NodeTag::If,
            NodeKind::While { .. } => NodeTag::While,
            NodeKind::For { .. } => NodeTag::For,
            NodeKind::Break => NodeTag::Break,
            NodeKind::Continue => NodeTag::Continue,
            NodeKind::Pass => NodeTag::Pass,
            NodeKind::Raise { .. } => NodeTag::Raise,
            NodeKind::Try { .. } => NodeTag::Try,
            NodeKind::ExceptHandler { .. } => NodeTag::ExceptHandler,
            NodeKind::Import { .. } => NodeTag::Import,
            NodeKind::ImportFrom { .. } => NodeTag::ImportFrom,
            NodeKind::Global { .. } => NodeTag::Global,
            NodeKind::Delete { .. } => NodeTag::Delete,
            NodeKind::Constant(_) => NodeTag::Constant,
            NodeKind::Name(_) => NodeTag::Name,
            NodeKind::Attribute { .. } => NodeTag::Attribute,
            NodeKind::Subscript { .. } => NodeTag::Subscript,
            NodeKind::BinaryOp { .. } => NodeTag::BinaryOp,
            NodeKind::UnaryOp { .. } => NodeTag::UnaryOp,
            NodeKind::Compare { .. } => NodeTag::Compare,
            NodeKind::BoolOp { .. } => NodeTag::BoolOp,
            NodeKind::Conditional { .. } => NodeTag::Conditional,
            NodeKind::Call { .. } => NodeTag::Call,
            NodeKind::Tuple { .. } => NodeTag::Tuple,
            NodeKind::List { .. } => NodeTag::List,
            NodeKind::Set { .. } => NodeTag::Set,
            NodeKind::Dict { .. } => NodeTag::Dict,
            NodeKind::Lambda { .. } => NodeTag::Lambda,
        }
    }

    #[inline]
    pub fn category(&self) -> NodeCategory {
        self.tag().category()
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self, NodeKind::Constant(_))
    }

    pub fn as_constant(&self) -> Option<&ConstValue> {
        match self {
            NodeKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Direct children in pre-order (the order a walk visits them).
    ///
    /// For statements with several operands this is also the order the
    /// target runtime evaluates them in: the assigned value comes before the
    /// object and index of an attribute or subscript store.
    pub fn children(&self) -> SmallVec<[NodeId; 4]> {
        let mut out = SmallVec::new();
        match self {
            NodeKind::Module { body } | NodeKind::FunctionDef { body, .. } => {
                out.extend(body.iter().copied());
            }
            NodeKind::ClassDef { bases, body, .. } => {
                out.extend(bases.iter().copied());
                out.extend(body.iter().copied());
            }
            NodeKind::Assign { value, .. } | NodeKind::ExprStmt { value } => out.push(*value),
            NodeKind::AttributeAssign { object, value, .. } => {
                out.push(*value);
                out.push(*object);
            }
            NodeKind::SubscriptAssign {
                object,
                index,
                value,
            } => {
                out.push(*value);
                out.push(*object);
                out.push(*index);
            }
            NodeKind::Return { value } => out.extend(*value),
            NodeKind::Raise { exception } => out.extend(*exception),
            NodeKind::If {
                cond,
                then_body,
                else_body,
            } => {
                out.push(*cond);
                out.extend(then_body.iter().copied());
                out.extend(else_body.iter().copied());
            }
            NodeKind::While { cond, body } => {
                out.push(*cond);
                out.extend(body.iter().copied());
            }
            NodeKind::For { iter, body, .. } => {
                out.push(*iter);
                out.extend(body.iter().copied());
            }
            NodeKind::Try { body, handlers } => {
                out.extend(body.iter().copied());
                out.extend(handlers.iter().copied());
            }
            NodeKind::ExceptHandler {
                exception, body, ..
            } => {
                out.extend(*exception);
                out.extend(body.iter().copied());
            }
            NodeKind::Attribute { object, .. } => out.push(*object),
            NodeKind::Subscript { object, index } => {
                out.push(*object);
                out.push(*index);
            }
            NodeKind::BinaryOp { left, right, .. }
            | NodeKind::Compare { left, right, .. }
            | NodeKind::BoolOp { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::UnaryOp { operand, .. } => out.push(*operand),
            NodeKind::Conditional {
                cond,
                then_value,
                else_value,
            } => {
                out.push(*cond);
                out.push(*then_value);
                out.push(*else_value);
            }
            NodeKind::Call { callee, args } => {
                out.push(*callee);
                out.extend(args.iter().copied());
            }
            NodeKind::Tuple { elements }
            | NodeKind::List { elements }
            | NodeKind::Set { elements } => out.extend(elements.iter().copied()),
            NodeKind::Dict { keys, values } => {
                for (key, value) in keys.iter().zip(values) {
                    out.push(*key);
                    out.push(*value);
                }
                // Unpaired entries are still owned; `NodeTree::validate` rejects them.
                let paired = keys.len().min(values.len());
                out.extend(keys[paired..].iter().copied());
                out.extend(values[paired..].iter().copied());
            }
            NodeKind::Lambda { body, .. } => out.push(*body),
            NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Pass
            | NodeKind::Import { .. }
            | NodeKind::ImportFrom { .. }
            | NodeKind::Global { .. }
            | NodeKind::Delete { .. }
            | NodeKind::Constant(_)
            | NodeKind::Name(_) => {}
        }
        out
    }

    /// Number of statement lists this node owns.
    ///
    /// Slots are numbered in field order: `If` has `then_body` (0) and
    /// `else_body` (1); `ClassDef`'s only slot is its body.
    pub fn statement_list_count(&self) -> usize {
        match self {
            NodeKind::If { .. } => 2,
            NodeKind::Module { .. }
            | NodeKind::FunctionDef { .. }
            | NodeKind::ClassDef { .. }
            | NodeKind::While { .. }
            | NodeKind::For { .. }
            | NodeKind::Try { .. }
            | NodeKind::ExceptHandler { .. } => 1,
            _ => 0,
        }
    }

    /// The statement list in `slot`, if this node has one there.
    ///
    /// `Try` exposes its protected body; its handlers are `ExceptHandler`
    /// nodes, not statements.
    pub fn statement_list(&self, slot: usize) -> Option<&[NodeId]> {
        match (self, slot) {
            (NodeKind::If { then_body, .. }, 0) => Some(then_body),
            (NodeKind::If { else_body, .. }, 1) => Some(else_body),
            (
                NodeKind::Module { body }
                | NodeKind::FunctionDef { body, .. }
                | NodeKind::ClassDef { body, .. }
                | NodeKind::While { body, .. }
                | NodeKind::For { body, .. }
                | NodeKind::Try { body, .. }
                | NodeKind::ExceptHandler { body, .. },
                0,
            ) => Some(body),
            _ => None,
        }
    }

    pub(crate) fn statement_list_mut(&mut self, slot: usize) -> Option<&mut Vec<NodeId>> {
        match (self, slot) {
            (NodeKind::If { then_body, .. }, 0) => Some(then_body),
            (NodeKind::If { else_body, .. }, 1) => Some(else_body),
            (
                NodeKind::Module { body }
                | NodeKind::FunctionDef { body, .. }
                | NodeKind::ClassDef { body, .. }
                | NodeKind::While { body, .. }
                | NodeKind::For { body, .. }
                | NodeKind::Try { body, .. }
                | NodeKind::ExceptHandler { body, .. },
                0,
            ) => Some(body),
            _ => None,
        }
    }
}

/// Broad grouping of node kinds, used for dispatch sanity checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Module,
    Definition,
    Statement,
    /// `ExceptHandler`: a clause of `Try`, neither statement nor expression.
    Clause,
    Expression,
}

/// Field-less discriminant of [`NodeKind`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeTag {
    Module,
    FunctionDef,
    ClassDef,
    Assign,
    AttributeAssign,
    SubscriptAssign,
    ExprStmt,
    Return,
    If,
    While,
    For,
    Break,
    Continue,
    Pass,
    Raise,
    Try,
    ExceptHandler,
    Import,
    ImportFrom,
    Global,
    Delete,
    Constant,
    Name,
    Attribute,
    Subscript,
    BinaryOp,
    UnaryOp,
    Compare,
    BoolOp,
    Conditional,
    Call,
    Tuple,
    List,
    Set,
    Dict,
    Lambda,
}

impl NodeTag {
    /// Every node kind, in declaration order.
    pub const ALL: [NodeTag; 36] = [
        NodeTag::Module,
        NodeTag::FunctionDef,
        NodeTag::ClassDef,
        NodeTag::Assign,
        NodeTag::AttributeAssign,
        NodeTag::SubscriptAssign,
        NodeTag::ExprStmt,
        NodeTag::Return,
        NodeTag::If,
        NodeTag::While,
        NodeTag::For,
        NodeTag::Break,
        NodeTag::Continue,
        NodeTag::Pass,
        NodeTag::Raise,
        NodeTag::Try,
        NodeTag::ExceptHandler,
        NodeTag::Import,
        NodeTag::ImportFrom,
        NodeTag::Global,
        NodeTag::Delete,
        NodeTag::Constant,
        NodeTag::Name,
        NodeTag::Attribute,
        NodeTag::Subscript,
        NodeTag::BinaryOp,
        NodeTag::UnaryOp,
        NodeTag::Compare,
        NodeTag::BoolOp,
        NodeTag::Conditional,
        NodeTag::Call,
        NodeTag::Tuple,
        NodeTag::List,
        NodeTag::Set,
        NodeTag::Dict,
        NodeTag::Lambda,
    ];

    pub fn category(self) -> NodeCategory {
        match self {
            NodeTag::Module => NodeCategory::Module,
            NodeTag::FunctionDef | NodeTag::ClassDef => NodeCategory::Definition,
            NodeTag::Assign
            | NodeTag::AttributeAssign
            | NodeTag::SubscriptAssign
            | NodeTag::ExprStmt
            | NodeTag::Return
            | NodeTag::If
            | NodeTag::While
            | NodeTag::For
            | NodeTag::Break
            | NodeTag::Continue
            | NodeTag::Pass
            | NodeTag::Raise
            | NodeTag::Try
            | NodeTag::Import
            | NodeTag::ImportFrom
            | NodeTag::Global
            | NodeTag::Delete => NodeCategory::Statement,
            NodeTag::ExceptHandler => NodeCategory::Clause,
            NodeTag::Constant
            | NodeTag::Name
            | NodeTag::Attribute
            | NodeTag::Subscript
            | NodeTag::BinaryOp
            | NodeTag::UnaryOp
            | NodeTag::Compare
            | NodeTag::BoolOp
            | NodeTag::Conditional
            | NodeTag::Call
            | NodeTag::Tuple
            | NodeTag::List
            | NodeTag::Set
            | NodeTag::Dict
            | NodeTag::Lambda => NodeCategory::Expression,
        }
    }

    /// Whether this kind opens a new variable scope.
    pub fn is_scope_owner(self) -> bool {
        matches!(
            self,
            NodeTag::Module | NodeTag::FunctionDef | NodeTag::ClassDef | NodeTag::Lambda
        )
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
