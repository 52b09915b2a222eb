//! Module that defines the scope chain: nested frames holding variables and
//! functions.
//!
//! Frames stack root-outward; variable lookup walks from the root towards
//! the innermost frame and keeps the *last* match, so newer bindings shadow
//! older ones automatically. Functions are process-global and live only in
//! the root frame.

use crate::ast::NodeId;
use crate::packages;
use crate::variable::{Type, Value, Variable};
use crate::{Identifier, StaticVec};

/// What kind of construct pushed a frame; decides which termination flags
/// the frame catches.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ScopeKind {
    Root,
    Block,
    Function,
    /// A function called from inside an expression.
    Expression,
}

/// A scope-level termination flag. `Break`/`Continue` are caught by `Block`
/// frames, `Return` by `Function`/`Expression` frames.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum Terminate {
    #[default]
    None,
    Break,
    Continue,
    Return,
}

impl Terminate {
    #[inline(always)]
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// A declared function parameter, optionally with a default-value
/// expression evaluated at call time.
#[derive(Debug, Clone)]
pub struct FnArg {
    pub name: Identifier,
    pub ty: Type,
    pub default: Option<NodeId>,
}

/// A callable: scripted functions carry a body node, builtins dispatch by
/// name through the packages registry and carry none.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Identifier,
    pub body: Option<NodeId>,
    pub ast_index: usize,
    pub args: StaticVec<FnArg>,
    pub return_type: Type,
}

impl Function {
    /// A registry-dispatched builtin: declared signature, no body.
    #[must_use]
    pub fn builtin(name: &str, return_type: Type) -> Self {
        Self {
            name: name.into(),
            body: None,
            ast_index: 0,
            args: StaticVec::new(),
            return_type,
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        self.body.is_none()
    }
}

/// One frame of the scope chain.
#[derive(Debug, Clone)]
pub struct Scope {
    /// The block node this frame is executing.
    pub body: NodeId,
    /// Which AST of the process the body node lives in.
    pub ast_index: usize,
    /// Index of the next statement to run within the body.
    pub running_line: usize,
    pub kind: ScopeKind,
    pub terminated: Terminate,
    pub return_type: Type,
    variables: Vec<Variable>,
    functions: Vec<Function>,
}

impl Scope {
    /// Create a frame. Every frame sees its own `__depth` constant; the
    /// root additionally owns `_`, the boolean and math constants, and the
    /// declared signatures of every builtin.
    #[must_use]
    pub fn new(body: NodeId, ast_index: usize, kind: ScopeKind, depth: usize) -> Self {
        let mut scope = Self {
            body,
            ast_index,
            running_line: 0,
            kind,
            terminated: Terminate::None,
            return_type: Type::VOID,
            variables: Vec::new(),
            functions: Vec::new(),
        };
        if kind == ScopeKind::Root {
            // the implicit result slot: user-visibly constant, mutated by
            // the runtime on every return
            scope.add_variable(Variable::new("_", Type::INT, Value::Int(0), true));
            scope.add_variable(Variable::new("TRUE", Type::BOOL, Value::Bool(true), true));
            scope.add_variable(Variable::new("FALSE", Type::BOOL, Value::Bool(false), true));
            scope.add_variable(Variable::new(
                "MATH_PI",
                Type::DOUBLE,
                Value::Double(std::f64::consts::PI),
                true,
            ));
            scope.add_variable(Variable::new(
                "MATH_E",
                Type::DOUBLE,
                Value::Double(std::f64::consts::E),
                true,
            ));
            for (name, return_type) in packages::signatures() {
                scope.functions.push(Function::builtin(name, return_type));
            }
        }
        scope.add_variable(Variable::new(
            "__depth",
            Type::INT,
            Value::Int(depth as i32),
            true,
        ));
        scope
    }

    #[inline(always)]
    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    /// Look a name up in *this frame only*.
    #[must_use]
    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name.as_str() == name)
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub(crate) fn variable_slot(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name.as_str() == name)
    }

    pub(crate) fn variable_at(&self, slot: usize) -> &Variable {
        &self.variables[slot]
    }

    pub(crate) fn variable_at_mut(&mut self, slot: usize) -> &mut Variable {
        &mut self.variables[slot]
    }

    pub(crate) fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub(crate) fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name.as_str() == name)
    }
}

/// The stack of active frames. The root frame lives for the process
/// lifetime and can never be popped.
#[derive(Debug, Clone)]
pub struct ScopeChain {
    frames: Vec<Scope>,
}

impl ScopeChain {
    /// A fresh chain holding only the root frame for `root_body`.
    #[must_use]
    pub fn new(root_body: NodeId) -> Self {
        Self { frames: vec![Scope::new(root_body, 0, ScopeKind::Root, 0)] }
    }

    #[inline(always)]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn root(&self) -> &Scope {
        &self.frames[0]
    }

    #[inline(always)]
    #[must_use]
    pub fn last(&self) -> &Scope {
        self.frames.last().expect("chain always has a root")
    }

    #[inline(always)]
    pub fn last_mut(&mut self) -> &mut Scope {
        self.frames.last_mut().expect("chain always has a root")
    }

    #[inline(always)]
    #[must_use]
    pub fn frame(&self, index: usize) -> &Scope {
        &self.frames[index]
    }

    #[inline(always)]
    pub fn frame_mut(&mut self, index: usize) -> &mut Scope {
        &mut self.frames[index]
    }

    /// Push a frame executing `body`. The new frame's `__depth` is the
    /// chain length before the push.
    pub fn push(&mut self, body: NodeId, ast_index: usize, kind: ScopeKind) -> &mut Scope {
        let depth = self.frames.len();
        self.frames.push(Scope::new(body, ast_index, kind, depth));
        self.last_mut()
    }

    /// Pop the innermost frame. The root frame is never removed.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Drop frames until the chain is `len` deep (but never below the root).
    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len.max(1));
    }

    /// The innermost frame that has not been terminated yet.
    #[must_use]
    pub fn last_non_terminated_index(&self) -> usize {
        self.frames
            .iter()
            .rposition(|f| f.terminated.is_none())
            .unwrap_or(0)
    }

    /// Find a variable by walking root-outward; the innermost binding wins.
    /// Returns the (frame, slot) pair of the match.
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<(usize, usize)> {
        let mut found = None;
        for (depth, frame) in self.frames.iter().enumerate() {
            if let Some(slot) = frame.variable_slot(name) {
                found = Some((depth, slot));
            }
        }
        found
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.locate(name)
            .map(|(depth, slot)| self.frames[depth].variable_at(slot))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.locate(name)
            .map(|(depth, slot)| self.frames[depth].variable_at_mut(slot))
    }

    /// Register a function into the root frame (functions are global).
    pub fn add_function(&mut self, function: Function) {
        self.frames[0].add_function(function);
    }

    /// Look a function up in the root frame only.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.frames[0].get_function(name)
    }

    /// Overwrite the implicit `_` result slot, bypassing its const flag.
    pub fn set_result(&mut self, ty: Type, value: Value) {
        let root = &mut self.frames[0];
        if let Some(slot) = root.variable_slot("_") {
            let cell = root.variable_at_mut(slot);
            cell.ty = ty;
            cell.value = value;
        }
    }

    /// A clone of the current `_` value as an anonymous temporary.
    #[must_use]
    pub fn result(&self) -> Variable {
        self.root()
            .get_variable("_")
            .map(|v| Variable::temp(v.ty, v.value.clone()))
            .unwrap_or_else(|| Variable::temp(Type::INT, Value::Int(0)))
    }
}
