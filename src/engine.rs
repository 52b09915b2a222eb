//! Module implementing the tree-walking interpreter.
//!
//! A [`Process`] owns the compiled code, the scope chain and the runtime
//! odds and ends (RNG, clock, print hook). The interpreter advances one
//! statement per [`step`](Process::step): it locates the innermost active
//! frame, pops it when its body is exhausted or a termination flag is set,
//! and otherwise executes the current statement. The outer
//! [`run`](Process::run) loop drives steps until the program frame
//! finishes, an error stops the process, or `END` clears the running flag.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ast::{Ast, Node, NodeId, NodeKind};
use crate::error::{ErrorKind, RuntimeError};
use crate::fn_builtin;
use crate::scope::{ScopeChain, Terminate};
use crate::token::{Op, Position, TokenKind, TypeKeyword};
use crate::variable::{index_name, DataType, Type, Value, Variable};
use crate::StaticVec;

/// Outcome of a single interpreter step.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum StepResult {
    /// A statement ran; carries any termination that bubbled out of it.
    Ran(Terminate),
    /// The innermost frame finished (or was terminated) and was popped,
    /// preserving its termination kind.
    Finished(Terminate),
}

/// A resolved reference expression: the frame and slot of a named variable
/// plus the element path for array indexing. Kept as indices rather than a
/// borrow so the right-hand side can be evaluated in between.
#[derive(Debug, Clone)]
pub(crate) struct Lvalue {
    pub depth: usize,
    pub slot: usize,
    pub path: StaticVec<usize>,
}

/// A running Dosato process.
pub struct Process {
    code: Vec<Ast>,
    scopes: ScopeChain,
    pub(crate) running: bool,
    pub(crate) exit_code: i32,
    error: Option<RuntimeError>,
    pub(crate) rng: StdRng,
    started: Instant,
    print: Box<dyn FnMut(&str)>,
}

impl Process {
    /// Create a process over a compiled [`Ast`]. The root scope is seeded
    /// with the default constants and every builtin signature.
    #[must_use]
    pub fn new(ast: Ast) -> Self {
        let root = ast.root();
        Self {
            code: vec![ast],
            scopes: ScopeChain::new(root),
            running: false,
            exit_code: 0,
            error: None,
            rng: StdRng::from_entropy(),
            started: Instant::now(),
            print: Box::new(|s| print!("{}", s)),
        }
    }

    /// Override the print callback used by `SAY`/`SAYLN` (and `CLEAR`).
    /// Defaults to stdout.
    ///
    /// # Example
    ///
    /// ```
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use dosato::{Ast, Process};
    ///
    /// let out = Rc::new(RefCell::new(String::new()));
    /// let sink = out.clone();
    ///
    /// let mut process = Process::new(Ast::compile(r#"DO SAYLN("hi");"#).unwrap());
    /// process.on_print(move |s| sink.borrow_mut().push_str(s));
    /// process.run();
    ///
    /// assert_eq!(*out.borrow(), "hi\n");
    /// ```
    pub fn on_print(&mut self, callback: impl FnMut(&str) + 'static) -> &mut Self {
        self.print = Box::new(callback);
        self
    }

    /// Run the process to completion and return its exit code: 0 on
    /// success, the code passed to `END`, or the error code.
    pub fn run(&mut self) -> i32 {
        self.running = true;
        self.exit_code = 0;
        self.error = None;
        while self.running {
            match self.step() {
                Ok(StepResult::Finished(_)) if self.scopes.depth() == 1 => {
                    self.running = false;
                }
                Ok(_) => {}
                Err(e) => {
                    self.exit_code = e.code();
                    break;
                }
            }
        }
        self.exit_code
    }

    /// The error that stopped the last run, if any.
    #[must_use]
    pub fn error(&self) -> Option<&RuntimeError> {
        self.error.as_ref()
    }

    /// A located, human-readable report for the stored error.
    #[must_use]
    pub fn error_report(&self) -> Option<String> {
        let e = self.error?;
        let ast = &self.code[e.ast_index.min(self.code.len() - 1)];
        let offset = ast.token_offset(e.token_index);
        let position = Position::of_offset(ast.source(), offset);
        Some(format!("{} ({})", e, position))
    }

    /// Look a variable up through the whole scope chain.
    #[must_use]
    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.scopes.get(name)
    }

    #[must_use]
    pub fn scopes(&self) -> &ScopeChain {
        &self.scopes
    }

    pub(crate) fn scopes_mut(&mut self) -> &mut ScopeChain {
        &mut self.scopes
    }

    pub(crate) fn ast(&self, index: usize) -> &Ast {
        &self.code[index]
    }

    /// Milliseconds since the process was created.
    pub(crate) fn clock_millis(&self) -> i64 {
        self.started.elapsed().as_millis() as i64
    }

    /// Stop the process with an exit code (the `END` builtin).
    pub(crate) fn stop(&mut self, exit_code: i32) {
        self.exit_code = exit_code;
        self.running = false;
    }

    /// Send text through the print hook.
    pub(crate) fn emit(&mut self, text: &str) {
        (self.print)(text);
    }

    /// Record an error on the process and stop it: the kind, the active
    /// AST and the offending token.
    pub(crate) fn raise(&mut self, kind: ErrorKind, token_index: usize) -> RuntimeError {
        let ast_index = self.scopes.last().ast_index;
        let error = RuntimeError::new(kind, ast_index, token_index);
        self.error = Some(error);
        self.running = false;
        error
    }

    /// Clear the error state and re-enable the process (the `CATCH` path).
    pub(crate) fn clear_error(&mut self) {
        self.error = None;
        self.running = true;
    }

    /// Advance the interpreter by one statement.
    pub(crate) fn step(&mut self) -> Result<StepResult, RuntimeError> {
        if !self.running {
            return Err(self.raise(ErrorKind::ProcessNotRunning, 0));
        }
        let frame = self.scopes.last();
        let (body, ast_index, line, term) =
            (frame.body, frame.ast_index, frame.running_line, frame.terminated);
        let body_len = self.code[ast_index].node(body).children.len();

        if !term.is_none() || line >= body_len {
            if self.scopes.depth() > 1 {
                self.scopes.pop();
            }
            return Ok(StepResult::Finished(term));
        }

        let statement = self.code[ast_index].node(body).children[line];
        let flow = self.exec_statement(ast_index, statement)?;
        self.scopes.last_mut().running_line += 1;

        if !flow.is_none() {
            if self.scopes.depth() == 1 {
                // a Break/Continue bubbled all the way out of the top level
                let kind = match flow {
                    Terminate::Break => ErrorKind::BreakOutsideOfLoop,
                    Terminate::Continue => ErrorKind::ContinueOutsideOfLoop,
                    _ => ErrorKind::ReturnOutsideOfFunction,
                };
                let at = self.code[ast_index].node(statement).start;
                return Err(self.raise(kind, at));
            }
            // unwind: the enclosing frame terminates with the same kind
            let frame = self.scopes.last_mut();
            if frame.terminated.is_none() {
                frame.terminated = flow;
            }
        }
        Ok(StepResult::Ran(flow))
    }

    /// Execute one statement node.
    fn exec_statement(&mut self, ast_index: usize, id: NodeId) -> Result<Terminate, RuntimeError> {
        let kind = self.code[ast_index].node(id).kind;
        match kind {
            NodeKind::FunctionCall => self.exec_call_chain(ast_index, id),
            NodeKind::MakeVar => self.make_variable(ast_index, id).map(|_| Terminate::None),
            NodeKind::SetVar => self.set_variable(ast_index, id).map(|_| Terminate::None),
            NodeKind::FunctionDeclaration => {
                self.make_function(ast_index, id).map(|_| Terminate::None)
            }
            NodeKind::ArrayDeclaration => {
                self.make_array(ast_index, id).map(|_| Terminate::None)
            }
            _ => {
                let at = self.code[ast_index].node(id).start;
                Err(self.raise(ErrorKind::Internal, at))
            }
        }
    }

    /// Resolve a `TypeIdentifier` node (a run of `ARRAY` keywords plus a
    /// scalar keyword) into a [`Type`].
    fn resolve_type(&mut self, ast_index: usize, id: NodeId) -> Result<Type, RuntimeError> {
        let node = self.code[ast_index].node(id).clone();
        let mut depth = 0usize;
        let mut data = None;
        for index in node.start..=node.end {
            match self.code[ast_index].token(index).map(|t| t.kind) {
                Some(TokenKind::VarType(TypeKeyword::Array)) => depth += 1,
                Some(TokenKind::VarType(k)) => {
                    data = Some(DataType::from_keyword(k));
                    break;
                }
                _ => break,
            }
        }
        match data {
            Some(data) => Ok(Type::array_of(data, depth)),
            None => Err(self.raise(ErrorKind::ExpectedType, node.start)),
        }
    }

    /// `MAKE TYPE name = expression;`
    fn make_variable(&mut self, ast_index: usize, id: NodeId) -> Result<(), RuntimeError> {
        let node = self.code[ast_index].node(id).clone();
        let ty = self.resolve_type(ast_index, node.children[0])?;
        let name_node = self.code[ast_index].node(node.children[1]).clone();
        let name: crate::Identifier =
            self.code[ast_index].node_text(node.children[1]).into();

        if self.scopes.last().get_variable(&name).is_some() {
            return Err(self.raise(ErrorKind::VariableAlreadyExists, name_node.start));
        }

        let expr = node.children[2];
        let mut variable = self.eval_expr(ast_index, expr)?;
        if let Err(kind) = variable.cast(ty) {
            let at = self.code[ast_index].node(expr).start;
            return Err(self.raise(kind, at));
        }
        variable.name = name;
        variable.constant = false;
        self.scopes.last_mut().add_variable(variable);
        Ok(())
    }

    /// `MAKE ARRAY ... TYPE name = expression;`
    fn make_array(&mut self, ast_index: usize, id: NodeId) -> Result<(), RuntimeError> {
        let node = self.code[ast_index].node(id).clone();
        let ty = self.resolve_type(ast_index, node.children[0])?;
        if !ty.is_array() {
            let at = self.code[ast_index].node(node.children[0]).start;
            return Err(self.raise(ErrorKind::ExpectedArray, at));
        }
        let name_node = self.code[ast_index].node(node.children[1]).clone();
        let name: crate::Identifier =
            self.code[ast_index].node_text(node.children[1]).into();
        if self.scopes.last().get_variable(&name).is_some() {
            return Err(self.raise(ErrorKind::VariableAlreadyExists, name_node.start));
        }

        let expr = node.children[2];
        let mut variable = self.eval_expr(ast_index, expr)?;
        if variable.ty != ty {
            if let Err(kind) = variable.cast(ty) {
                let at = self.code[ast_index].node(expr).start;
                return Err(self.raise(kind, at));
            }
        }
        variable.name = name;
        variable.constant = false;
        self.scopes.last_mut().add_variable(variable);
        Ok(())
    }

    /// `SET target op expression;`
    fn set_variable(&mut self, ast_index: usize, id: NodeId) -> Result<(), RuntimeError> {
        let node = self.code[ast_index].node(id).clone();
        let op_node = self.code[ast_index].node(node.children[1]).clone();
        let op = match self.code[ast_index].token(op_node.start).and_then(|t| t.operator()) {
            Some(op) if op.is_assignment() => op,
            _ => return Err(self.raise(ErrorKind::ExpectedAssignOperator, op_node.start)),
        };

        let target = node.children[0];
        let lvalue = self.resolve_reference(ast_index, target)?;
        if self.scopes.frame(lvalue.depth).variable_at(lvalue.slot).constant {
            let at = self.code[ast_index].node(target).start;
            return Err(self.raise(ErrorKind::CannotModifyConstant, at));
        }

        let (value, value_at) = match node.children.get(2) {
            Some(&expr) => {
                let at = self.code[ast_index].node(expr).start;
                (self.eval_expr(ast_index, expr)?, at)
            }
            // ++, -- and ~~ carry no right-hand side
            None => (Variable::temp(Type::INT, Value::Int(0)), op_node.start),
        };

        let applied = match self.lvalue_mut(&lvalue) {
            Some(cell) => fn_builtin::apply_assignment(cell, &value, op),
            None => Err(ErrorKind::ArrayOutOfBounds),
        };
        match applied {
            Ok(()) => Ok(()),
            Err(kind @ ErrorKind::ArrayOutOfBounds) => {
                let at = self.code[ast_index].node(target).start;
                Err(self.raise(kind, at))
            }
            Err(kind) => Err(self.raise(kind, value_at)),
        }
    }

    /// `MAKE FUNC TYPE name(params) { body };`
    fn make_function(&mut self, ast_index: usize, id: NodeId) -> Result<(), RuntimeError> {
        let node = self.code[ast_index].node(id).clone();
        let return_type = self.resolve_type(ast_index, node.children[0])?;
        let name_node = self.code[ast_index].node(node.children[1]).clone();
        let name: crate::Identifier =
            self.code[ast_index].node_text(node.children[1]).into();

        if self.scopes.function(&name).is_some() {
            return Err(self.raise(ErrorKind::FunctionAlreadyExists, name_node.start));
        }

        let params_node = self.code[ast_index].node(node.children[2]).clone();
        let mut args = StaticVec::new();
        for &param in &params_node.children {
            let param_node = self.code[ast_index].node(param).clone();
            let ty = self.resolve_type(ast_index, param_node.children[0])?;
            let param_name: crate::Identifier =
                self.code[ast_index].node_text(param_node.children[1]).into();
            let default = param_node.children.get(3).copied();
            args.push(crate::scope::FnArg { name: param_name, ty, default });
        }

        self.scopes.add_function(crate::scope::Function {
            name,
            body: Some(node.children[3]),
            ast_index,
            args,
            return_type,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // expression evaluation
    // ------------------------------------------------------------------

    /// Evaluate an expression node into a fresh owned [`Variable`].
    pub(crate) fn eval_expr(
        &mut self,
        ast_index: usize,
        id: NodeId,
    ) -> Result<Variable, RuntimeError> {
        let node = self.code[ast_index].node(id).clone();
        match node.kind {
            NodeKind::Literal => self.eval_literal(ast_index, &node),
            NodeKind::Identifier => {
                let name = self.code[ast_index].node_text(id).to_string();
                let found = self
                    .scopes
                    .get(&name)
                    .map(|v| Variable::temp(v.ty, v.value.clone()));
                match found {
                    Some(v) => Ok(v),
                    None => Err(self.raise(ErrorKind::UndefinedVariable, node.start)),
                }
            }
            NodeKind::Expression => {
                let left = self.eval_expr(ast_index, node.children[0])?;
                let op_node = self.code[ast_index].node(node.children[1]).clone();
                let op = self.code[ast_index]
                    .token(op_node.start)
                    .and_then(|t| t.operator());
                let right = self.eval_expr(ast_index, node.children[2])?;
                let op = match op {
                    Some(op) => op,
                    None => return Err(self.raise(ErrorKind::InvalidOperator, node.start)),
                };
                self.eval_binary(op, &left, &right)
                    .map_err(|kind| self.raise(kind, node.start))
            }
            NodeKind::UnaryExpression => {
                let head = self.code[ast_index].node(node.children[0]).clone();
                let mut inner = self.eval_expr(ast_index, node.children[1])?;
                if head.kind == NodeKind::TypeIdentifier {
                    let ty = self.resolve_type(ast_index, node.children[0])?;
                    return match inner.cast(ty) {
                        Ok(()) => Ok(inner),
                        Err(kind) => Err(self.raise(kind, node.start)),
                    };
                }
                let op = self.code[ast_index].token(head.start).and_then(|t| t.operator());
                let result = match op {
                    Some(Op::Not) => fn_builtin::not(&inner),
                    Some(Op::BitNot) => fn_builtin::bit_not(&inner),
                    Some(Op::Subtract) => fn_builtin::negate(&inner),
                    _ => Err(ErrorKind::InvalidOperator),
                };
                result.map_err(|kind| self.raise(kind, node.start))
            }
            NodeKind::ArrayExpression => {
                let mut elements = Vec::with_capacity(node.children.len());
                for (i, &child) in node.children.iter().enumerate() {
                    let mut element = self.eval_expr(ast_index, child)?;
                    element.name = index_name(i);
                    element.constant = false;
                    elements.push(element);
                }
                Ok(Variable::temp(
                    Type::array_of(DataType::Array, 1),
                    Value::Array(elements),
                ))
            }
            NodeKind::FunctionIdentifier => {
                // a call in expression position; its value is whatever the
                // callee left in `_`
                self.exec_call(ast_index, id, crate::scope::ScopeKind::Expression)?;
                Ok(self.scopes.result())
            }
            _ => Err(self.raise(ErrorKind::InvalidExpression, node.start)),
        }
    }

    fn eval_binary(
        &mut self,
        op: Op,
        left: &Variable,
        right: &Variable,
    ) -> Result<Variable, ErrorKind> {
        match op {
            Op::Add => fn_builtin::add(left, right),
            Op::Subtract => fn_builtin::subtract(left, right),
            Op::Multiply => fn_builtin::multiply(left, right),
            Op::Divide => fn_builtin::divide(left, right),
            Op::Modulo => fn_builtin::modulo(left, right),
            Op::BitAnd => fn_builtin::bit_and(left, right),
            Op::BitOr => fn_builtin::bit_or(left, right),
            Op::BitXor => fn_builtin::bit_xor(left, right),
            Op::ShiftLeft => fn_builtin::shift_left(left, right),
            Op::ShiftRight => fn_builtin::shift_right(left, right),
            Op::LogicalAnd => fn_builtin::logical_and(left, right),
            Op::LogicalOr => fn_builtin::logical_or(left, right),
            Op::Equal => fn_builtin::equals(left, right),
            Op::NotEqual => fn_builtin::not_equals(left, right),
            Op::Less => fn_builtin::less_than(left, right),
            Op::Greater => fn_builtin::greater_than(left, right),
            Op::LessEqual => fn_builtin::less_than_or_equal(left, right),
            Op::GreaterEqual => fn_builtin::greater_than_or_equal(left, right),
            Op::Hash => fn_builtin::index(left, right),
            _ => Err(ErrorKind::InvalidOperator),
        }
    }

    fn eval_literal(&mut self, ast_index: usize, node: &Node) -> Result<Variable, RuntimeError> {
        let text = self.code[ast_index]
            .token(node.start)
            .map(|t| t.text(self.code[ast_index].source()).to_string())
            .unwrap_or_default();

        if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            let decoded = unescape(&text[1..text.len() - 1]);
            return Ok(Variable::temp(Type::STRING, Value::Str(decoded)));
        }
        if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
            let decoded = unescape(&text[1..text.len() - 1]);
            let mut chars = decoded.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    Ok(Variable::temp(Type::scalar(DataType::Char), Value::Char(c)))
                }
                _ => Err(self.raise(ErrorKind::InvalidChar, node.start)),
            };
        }

        let dots = text.matches('.').count();
        if dots == 1 {
            if let Some(stripped) = text.strip_suffix('F') {
                return match stripped.parse::<f32>() {
                    Ok(v) => Ok(Variable::temp(
                        Type::scalar(DataType::Float),
                        Value::Float(v),
                    )),
                    Err(_) => Err(self.raise(ErrorKind::InvalidNumber, node.start)),
                };
            }
            return match text.parse::<f64>() {
                Ok(v) => Ok(Variable::temp(Type::DOUBLE, Value::Double(v))),
                Err(_) => Err(self.raise(ErrorKind::InvalidNumber, node.start)),
            };
        }
        if dots == 0 && !text.is_empty() {
            if text.ends_with('F') {
                return Err(self.raise(ErrorKind::InvalidNumber, node.start));
            }
            return match text.parse::<u64>() {
                Ok(v) => Ok(Variable::temp(
                    Type::scalar(DataType::Ulong),
                    Value::Ulong(v),
                )),
                Err(_) => Err(self.raise(ErrorKind::InvalidNumber, node.start)),
            };
        }
        Err(self.raise(ErrorKind::InvalidLiteral, node.start))
    }

    // ------------------------------------------------------------------
    // reference expressions
    // ------------------------------------------------------------------

    /// Resolve a reference expression into an [`Lvalue`]. Only identifiers
    /// and `array # integer` chains are valid targets.
    pub(crate) fn resolve_reference(
        &mut self,
        ast_index: usize,
        id: NodeId,
    ) -> Result<Lvalue, RuntimeError> {
        let node = self.code[ast_index].node(id).clone();
        match node.kind {
            NodeKind::Identifier => {
                let name = self.code[ast_index].node_text(id);
                match self.scopes.locate(name) {
                    Some((depth, slot)) => {
                        Ok(Lvalue { depth, slot, path: StaticVec::new() })
                    }
                    None => Err(self.raise(ErrorKind::UndefinedVariable, node.start)),
                }
            }
            NodeKind::Expression => {
                let op = self.code[ast_index]
                    .node(node.children[1])
                    .start;
                let op = self.code[ast_index].token(op).and_then(|t| t.operator());
                if op != Some(Op::Hash) {
                    return Err(
                        self.raise(ErrorKind::InvalidReferenceExpression, node.start)
                    );
                }
                let mut lvalue = self.resolve_reference(ast_index, node.children[0])?;
                let index_var = self.eval_expr(ast_index, node.children[2])?;

                let len = match self.lvalue_ref(&lvalue) {
                    None => Err(ErrorKind::ArrayOutOfBounds),
                    Some(target) => match target.value.elements() {
                        Some(elements) => Ok(elements.len()),
                        None => Err(ErrorKind::TypeMismatch),
                    },
                };
                let at = len.and_then(|len| {
                    fn_builtin::resolve_index(index_var.value.as_i64(), len)
                });
                match at {
                    Ok(at) => {
                        lvalue.path.push(at);
                        Ok(lvalue)
                    }
                    Err(kind) => Err(self.raise(kind, node.start)),
                }
            }
            _ => Err(self.raise(ErrorKind::InvalidReferenceExpression, node.start)),
        }
    }

    /// The cell an [`Lvalue`] points at, if the path is still in bounds.
    pub(crate) fn lvalue_ref(&self, lvalue: &Lvalue) -> Option<&Variable> {
        let mut cell = self.scopes.frame(lvalue.depth).variable_at(lvalue.slot);
        for &at in &lvalue.path {
            cell = cell.value.elements()?.get(at)?;
        }
        Some(cell)
    }

    /// Mutable access to the cell an [`Lvalue`] points at.
    pub(crate) fn lvalue_mut(&mut self, lvalue: &Lvalue) -> Option<&mut Variable> {
        let mut cell = self
            .scopes
            .frame_mut(lvalue.depth)
            .variable_at_mut(lvalue.slot);
        for &at in &lvalue.path {
            cell = match &mut cell.value {
                Value::Array(elements) => elements.get_mut(at)?,
                _ => return None,
            };
        }
        Some(cell)
    }
}

/// Decode the C-style escape set. Unknown escapes are kept verbatim.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('0') => out.push('\0'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_decodes_c_escapes() {
        assert_eq!(unescape(r"a\nb\t\\"), "a\nb\t\\");
        assert_eq!(unescape(r"\0"), "\0");
        assert_eq!(unescape(r"\q"), "\\q");
    }
}
