//! Code generation state.
//!
//! [`GlobalContext`] lives for a whole run and is shared by every module.
//! [`CodeGenContext`] lives for one module: it borrows the finalized tree and
//! the global context, and keeps a stack of frames, one per function or
//! class body being generated.

use tessera_ir::{ConstValue, Name, NodeTree, QualifiedName, ScopeLayout};

use crate::{mangle_identifier, mangle_module, ConstantPool, DeclarationRegistry, Identifier};

/// Per-run state shared by every module's code generation.
#[derive(Clone, Debug, Default)]
pub struct GlobalContext {
    constants: ConstantPool,
    declarations: DeclarationRegistry,
}

impl GlobalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn declarations(&self) -> &DeclarationRegistry {
        &self.declarations
    }

    pub fn declarations_mut(&mut self) -> &mut DeclarationRegistry {
        &mut self.declarations
    }

    /// Identifier for a constant, pooling it if needed.
    pub fn constant(&mut self, value: &ConstValue) -> Identifier {
        self.constants.identifier(value)
    }

    /// Pool symbol of a string constant, as used for names passed to the
    /// runtime (attribute names, dictionary keys, module names).
    pub fn name_constant(&mut self, name: &str) -> String {
        self.constants.intern(&ConstValue::str(name))
    }
}

/// Indented line output.
#[derive(Clone, Debug, Default)]
pub struct CodeWriter {
    indent: usize,
    output: String,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer whose lines start `indent` levels deep.
    pub fn indented(indent: usize) -> Self {
        CodeWriter {
            indent,
            output: String::new(),
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write a line with the current indentation.
    pub fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FrameKind {
    /// The module init function.
    Module,
    Function,
    Class,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    layout: ScopeLayout,
    writer: CodeWriter,
    /// Index in `bodies` reserved when the frame was opened.
    body_slot: Option<usize>,
}

/// Generated pieces of one module, before they are laid out in a unit.
#[derive(Debug)]
pub(crate) struct ModuleParts {
    pub(crate) init: String,
    pub(crate) prototypes: Vec<String>,
    pub(crate) bodies: Vec<String>,
}

/// State for generating one module.
pub struct CodeGenContext<'t, 'g> {
    tree: &'t NodeTree,
    global: &'g mut GlobalContext,
    module: QualifiedName,
    runtime_name: String,
    mangled: String,
    frames: Vec<Frame>,
    prototypes: Vec<String>,
    /// Function bodies in the order their definitions were reached.
    bodies: Vec<String>,
    function_counter: u32,
    temp_counter: u32,
}

impl<'t, 'g> CodeGenContext<'t, 'g> {
    /// `runtime_name` is the name the module has at run time; it differs
    /// from `module` only for the entry module of a program (`__main__`).
    pub fn new(
        tree: &'t NodeTree,
        global: &'g mut GlobalContext,
        module: QualifiedName,
        runtime_name: &str,
    ) -> Self {
        let layout = tree.meta(tree.root()).scope.clone().unwrap_or_default();
        CodeGenContext {
            tree,
            global,
            module,
            runtime_name: runtime_name.to_owned(),
            mangled: mangle_module(runtime_name),
            frames: vec![Frame {
                kind: FrameKind::Module,
                layout,
                writer: CodeWriter::indented(1),
                body_slot: None,
            }],
            prototypes: Vec::new(),
            bodies: Vec::new(),
            function_counter: 0,
            temp_counter: 0,
        }
    }

    #[inline]
    pub fn tree(&self) -> &'t NodeTree {
        self.tree
    }

    pub fn global(&mut self) -> &mut GlobalContext {
        &mut *self.global
    }

    pub fn module_name(&self) -> &QualifiedName {
        &self.module
    }

    pub fn runtime_name(&self) -> &str {
        &self.runtime_name
    }

    /// Symbol fragment of the module's runtime name.
    pub fn mangled_module(&self) -> &str {
        &self.mangled
    }

    pub fn module_object(&self) -> String {
        format!("_module_{}", self.mangled)
    }

    pub fn module_dict(&self) -> String {
        format!("_moduledict_{}", self.mangled)
    }

    pub fn constant(&mut self, value: &ConstValue) -> Identifier {
        self.global.constant(value)
    }

    pub fn name_constant(&mut self, name: &str) -> String {
        self.global.name_constant(name)
    }

    /// Write a line into the body of the innermost frame.
    pub fn writeln(&mut self, line: &str) {
        self.current_mut().writer.writeln(line);
    }

    pub fn indent(&mut self) {
        self.current_mut().writer.indent();
    }

    pub fn dedent(&mut self) {
        self.current_mut().writer.dedent();
    }

    /// Generate a unique temporary variable name.
    pub fn fresh_temp(&mut self) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("_tmp{n}")
    }

    pub(crate) fn frame_kind(&self) -> FrameKind {
        self.current().kind
    }

    /// Variable name of a slot in the innermost frame's layout.
    pub(crate) fn local_name(&self, slot: u32) -> Option<&Name> {
        let slot = usize::try_from(slot).ok()?;
        self.current().layout.locals.get(slot)
    }

    /// Symbol of the next generated function of this module.
    pub(crate) fn next_function_symbol(&mut self, kind: &str, name: &str) -> String {
        self.function_counter += 1;
        format!(
            "impl_{}__{kind}_{}_{}",
            self.mangled,
            self.function_counter,
            mangle_identifier(name)
        )
    }

    /// Open a frame for a function or class body. Its body keeps the place
    /// of its definition among the module's bodies even when nested
    /// definitions finish first.
    pub(crate) fn push_frame(&mut self, kind: FrameKind, layout: ScopeLayout) {
        let slot = self.bodies.len();
        self.bodies.push(String::new());
        self.frames.push(Frame {
            kind,
            layout,
            writer: CodeWriter::indented(1),
            body_slot: Some(slot),
        });
    }

    /// Close the innermost frame, recording its prototype and body under
    /// `signature`.
    pub(crate) fn pop_frame(&mut self, signature: &str) {
        if self.frames.len() <= 1 {
            return;
        }
        let Some(mut frame) = self.frames.pop() else {
            return;
        };
        self.prototypes.push(format!("{signature};"));
        let body = format!("{signature}\n{{\n{}}}\n", frame.writer.take_output());
        if let Some(slot) = frame.body_slot {
            self.bodies[slot] = body;
        }
    }

    pub(crate) fn finish(mut self) -> ModuleParts {
        let init = self
            .frames
            .first_mut()
            .map(|frame| frame.writer.take_output())
            .unwrap_or_default();
        ModuleParts {
            init,
            prototypes: self.prototypes,
            bodies: self.bodies,
        }
    }

    fn current(&self) -> &Frame {
        // The module frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}

/// C++ variable holding a function local.
pub(crate) fn local_variable(name: &Name) -> String {
    format!("_python_var_{}", mangle_identifier(name.as_str()))
}
