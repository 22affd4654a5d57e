//! Tree inspection.
//!
//! Renderers are plugins of the driver; no compiler pass depends on them.

use std::fmt::Write as _;

use tessera_ir::{ensure_sufficient_stack, NodeId, NodeKind, NodeTree};

/// Something that can present a node tree.
pub trait TreeRenderer {
    fn render(&self, tree: &NodeTree) -> String;
}

/// Indented outline, one node per line.
#[derive(Copy, Clone, Debug, Default)]
pub struct TextRenderer {
    /// Append the emission metadata the finalizer attached, if any.
    pub show_meta: bool,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_meta(mut self, show_meta: bool) -> Self {
        self.show_meta = show_meta;
        self
    }

    fn render_node(&self, tree: &NodeTree, id: NodeId, depth: usize, out: &mut String) {
        ensure_sufficient_stack(|| {
            let _ = write!(out, "{:indent$}{}", "", describe(tree.kind(id)), indent = depth * 2);
            if self.show_meta {
                let meta = tree.meta(id);
                if let Some(binding) = meta.binding {
                    let _ = write!(out, "  [{binding:?}]");
                }
                if let Some(specialization) = meta.specialization {
                    let _ = write!(out, "  [{}]", specialization.helper());
                }
            }
            out.push('\n');
            for child in tree.kind(id).children() {
                self.render_node(tree, child, depth + 1, out);
            }
        });
    }
}

impl TreeRenderer for TextRenderer {
    fn render(&self, tree: &NodeTree) -> String {
        let mut out = String::new();
        self.render_node(tree, tree.root(), 0, &mut out);
        out
    }
}

/// One-line description of a node without its children.
fn describe(kind: &NodeKind) -> String {
    let tag = kind.tag();
    match kind {
        NodeKind::FunctionDef { name, params, .. } => format!("{tag} {name}({})", join(params)),
        NodeKind::Lambda { params, .. } => format!("{tag} ({})", join(params)),
        NodeKind::ClassDef { name, .. }
        | NodeKind::Assign { target: name, .. }
        | NodeKind::For { target: name, .. }
        | NodeKind::Delete { name }
        | NodeKind::Name(name) => format!("{tag} {name}"),
        NodeKind::AttributeAssign { attribute, .. } | NodeKind::Attribute { attribute, .. } => {
            format!("{tag} .{attribute}")
        }
        NodeKind::ExceptHandler { name: Some(name), .. } => format!("{tag} as {name}"),
        NodeKind::Import { module, alias } => match alias {
            Some(alias) => format!("{tag} {module} as {alias}"),
            None => format!("{tag} {module}"),
        },
        NodeKind::ImportFrom { module, names } => {
            let names: Vec<String> = names
                .iter()
                .map(|imported| match &imported.alias {
                    Some(alias) => format!("{} as {alias}", imported.name),
                    None => imported.name.to_string(),
                })
                .collect();
            format!("{tag} {module}: {}", names.join(", "))
        }
        NodeKind::Global { names } => format!("{tag} {}", join(names)),
        NodeKind::Constant(value) => format!("{tag} {value:?}"),
        NodeKind::BinaryOp { op, .. } => format!("{tag} {}", op.symbol()),
        NodeKind::UnaryOp { op, .. } => format!("{tag} {op:?}"),
        NodeKind::Compare { op, .. } => format!("{tag} {op:?}"),
        NodeKind::BoolOp { op, .. } => format!("{tag} {op:?}"),
        NodeKind::Module { .. }
        | NodeKind::SubscriptAssign { .. }
        | NodeKind::ExprStmt { .. }
        | NodeKind::Return { .. }
        | NodeKind::If { .. }
        | NodeKind::While { .. }
        | NodeKind::Break
        | NodeKind::Continue
        | NodeKind::Pass
        | NodeKind::Raise { .. }
        | NodeKind::Try { .. }
        | NodeKind::ExceptHandler { name: None, .. }
        | NodeKind::Subscript { .. }
        | NodeKind::Conditional { .. }
        | NodeKind::Call { .. }
        | NodeKind::Tuple { .. }
        | NodeKind::List { .. }
        | NodeKind::Set { .. }
        | NodeKind::Dict { .. } => tag.to_string(),
    }
}

fn join(names: &[tessera_ir::Name]) -> String {
    names
        .iter()
        .map(tessera_ir::Name::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

const BANNER_WIDTH: usize = 80;

/// The tree between banner lines, for `--dump-tree`.
pub fn dump_tree(tree: &NodeTree) -> String {
    let banner = "*".repeat(BANNER_WIDTH);
    let mut out = String::from("Analysis -> Tree Result\n");
    for _ in 0..3 {
        out.push_str(&banner);
        out.push('\n');
    }
    out.push_str(&TextRenderer::new().render(tree));
    for _ in 0..3 {
        out.push_str(&banner);
        out.push('\n');
    }
    out
}
