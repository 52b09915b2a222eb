//! Module implementing call-chain execution and function dispatch.
//!
//! A `DO` statement is a chain: a first callable (a named call or an inline
//! block) plus trailing extensions. A leading `WHEN`/`WHILE` guards or
//! loops everything before it; the remainder is a `THEN` sequence tailed by
//! at most one `CATCH` (error capture) or `INTO` (result store). Named
//! calls dispatch either to a scripted function (a pushed `Function` frame
//! driven to completion) or to the builtin registry.

use crate::ast::{NodeId, NodeKind};
use crate::engine::{Process, StepResult};
use crate::error::{ErrorKind, RuntimeError};
use crate::fn_builtin;
use crate::packages;
use crate::scope::{Function, ScopeKind, Terminate};
use crate::token::Op;
use crate::variable::{Type, Value, Variable};

impl Process {
    /// Entry point for a `FunctionCall` statement node.
    pub(crate) fn exec_call_chain(
        &mut self,
        ast_index: usize,
        id: NodeId,
    ) -> Result<Terminate, RuntimeError> {
        self.exec_function_call(ast_index, id, 0)
    }

    /// The call-chain algorithm from `start`: split at the first
    /// `WHEN`/`WHILE`, guard or loop the call portion, recurse into `ELSE`
    /// arms.
    fn exec_function_call(
        &mut self,
        ast_index: usize,
        id: NodeId,
        start: usize,
    ) -> Result<Terminate, RuntimeError> {
        let node = self.ast(ast_index).node(id).clone();
        let children = node.children;
        if start >= children.len() {
            return Err(self.raise(ErrorKind::ExpectedIdentifier, node.start));
        }
        let first = self.ast(ast_index).node(children[start]).clone();
        if !matches!(
            first.kind,
            NodeKind::FunctionIdentifier | NodeKind::Block | NodeKind::Else
        ) {
            return Err(self.raise(ErrorKind::ExpectedIdentifier, first.start));
        }

        // find the first WHEN or WHILE; everything before it is the call
        // portion, the extension and everything after are the modifier tail
        let mut condition: Option<(usize, bool)> = None;
        for (i, &child) in children.iter().enumerate().skip(start) {
            let kind = self.ast(ast_index).node(child).kind;
            if kind == NodeKind::While {
                if i != children.len() - 1 {
                    let at = self.ast(ast_index).node(child).start;
                    return Err(self.raise(ErrorKind::WhileNotLast, at));
                }
                condition = Some((i, true));
                break;
            }
            if kind == NodeKind::When {
                if i != children.len() - 1
                    && self.ast(ast_index).node(children[i + 1]).kind != NodeKind::Else
                {
                    let at = self.ast(ast_index).node(child).start;
                    return Err(self.raise(ErrorKind::ExpectedElse, at));
                }
                condition = Some((i, false));
                break;
            }
        }

        match condition {
            None => self.exec_chain(ast_index, id, start, children.len()),
            Some((i, false)) => {
                if self.eval_condition(ast_index, children[i])? {
                    self.exec_chain(ast_index, id, start, i)
                } else if i + 1 < children.len() {
                    // recurse into the ELSE arm; the guarded portion is dead
                    self.exec_function_call(ast_index, id, i + 1)
                } else {
                    Ok(Terminate::None)
                }
            }
            Some((i, true)) => {
                loop {
                    if !self.running {
                        return Ok(Terminate::None);
                    }
                    if !self.eval_condition(ast_index, children[i])? {
                        return Ok(Terminate::None);
                    }
                    match self.exec_chain(ast_index, id, start, i)? {
                        Terminate::Break | Terminate::Return => {
                            return Ok(Terminate::None);
                        }
                        Terminate::None | Terminate::Continue => {}
                    }
                }
            }
        }
    }

    /// Evaluate a `WHEN`/`WHILE` condition payload and cast it to bool.
    fn eval_condition(&mut self, ast_index: usize, ext: NodeId) -> Result<bool, RuntimeError> {
        let ext_node = self.ast(ast_index).node(ext).clone();
        let expr = ext_node.children[0];
        let expr_start = self.ast(ast_index).node(expr).start;
        let mut value = self.eval_expr(ast_index, expr)?;
        if let Err(kind) = value.cast(Type::BOOL) {
            return Err(self.raise(kind, expr_start));
        }
        Ok(value.value == Value::Bool(true))
    }

    /// The `THEN`/`CATCH`/`INTO` portion of a chain in `[start, end)`.
    fn exec_chain(
        &mut self,
        ast_index: usize,
        id: NodeId,
        start: usize,
        end: usize,
    ) -> Result<Terminate, RuntimeError> {
        let node = self.ast(ast_index).node(id).clone();
        let children = node.children;
        if start >= end {
            return Err(self.raise(ErrorKind::IdentifierInvalid, node.start));
        }

        let mut result = self.exec_callable(ast_index, children[start]);

        for i in start + 1..end {
            let ext = self.ast(ast_index).node(children[i]).clone();
            match ext.kind {
                NodeKind::Then => {
                    // run the next call only on success of the previous one
                    if result == Ok(Terminate::None) {
                        result = self.exec_callable(ast_index, ext.children[0]);
                    }
                }
                NodeKind::Catch | NodeKind::Into => {
                    if i != end - 1 {
                        return Err(self.raise(ErrorKind::ExtensionNotFinal, ext.start));
                    }
                }
                _ => return Err(self.raise(ErrorKind::ExpectedExtension, ext.start)),
            }
        }

        let tail = if end > start + 1 {
            Some(self.ast(ast_index).node(children[end - 1]).clone())
        } else {
            None
        };

        if let Err(error) = result {
            if let Some(catch) = tail.as_ref().filter(|n| n.kind == NodeKind::Catch) {
                // the error code lands in `_`, the process revives, and the
                // catch callable becomes the chain's result
                self.scopes_mut()
                    .set_result(Type::INT, Value::Int(error.code()));
                self.clear_error();
                return self.exec_callable(ast_index, catch.children[0]);
            }
            return Err(error);
        }

        if let Some(into) = tail.as_ref().filter(|n| n.kind == NodeKind::Into) {
            let target = into.children[0];
            let target_start = self.ast(ast_index).node(target).start;
            let lvalue = self.resolve_reference(ast_index, target)?;
            if self
                .scopes()
                .frame(lvalue.depth)
                .variable_at(lvalue.slot)
                .constant
            {
                return Err(self.raise(ErrorKind::CannotModifyConstant, target_start));
            }
            let value = self.scopes().result();
            let applied = match self.lvalue_mut(&lvalue) {
                Some(cell) => fn_builtin::apply_assignment(cell, &value, Op::Assign),
                None => Err(ErrorKind::ArrayOutOfBounds),
            };
            if let Err(kind) = applied {
                return Err(self.raise(kind, target_start));
            }
        }

        result
    }

    /// One callable: an inline block, a named call, or the payload of an
    /// `ELSE` arm.
    fn exec_callable(&mut self, ast_index: usize, id: NodeId) -> Result<Terminate, RuntimeError> {
        let node = self.ast(ast_index).node(id).clone();
        match node.kind {
            NodeKind::Block => self.exec_block(ast_index, id),
            NodeKind::FunctionIdentifier => {
                self.exec_call(ast_index, id, ScopeKind::Function)
            }
            NodeKind::Else => self.exec_callable(ast_index, node.children[0]),
            _ => Err(self.raise(ErrorKind::ExpectedIdentifier, node.start)),
        }
    }

    /// Push a `Block` frame for an inline block and drive it to completion.
    fn exec_block(&mut self, ast_index: usize, id: NodeId) -> Result<Terminate, RuntimeError> {
        self.scopes_mut().push(id, ast_index, ScopeKind::Block);
        let entry = self.scopes().depth();
        self.drive(entry)
    }

    /// Drive interpreter steps until the frame pushed at `entry` depth pops,
    /// returning its termination kind. Frames are unwound on error so a
    /// surrounding `CATCH` resumes on a clean chain.
    fn drive(&mut self, entry: usize) -> Result<Terminate, RuntimeError> {
        loop {
            if !self.running {
                return Ok(Terminate::None);
            }
            match self.step() {
                Ok(StepResult::Finished(terminate)) if self.scopes().depth() < entry => {
                    return Ok(terminate);
                }
                Ok(_) => {}
                Err(error) => {
                    self.scopes_mut().truncate(entry - 1);
                    return Err(error);
                }
            }
        }
    }

    /// Evaluate a named call's arguments left-to-right and dispatch it:
    /// scripted functions run in a fresh frame of the given kind, builtins
    /// go through the packages registry.
    pub(crate) fn exec_call(
        &mut self,
        ast_index: usize,
        id: NodeId,
        kind: ScopeKind,
    ) -> Result<Terminate, RuntimeError> {
        let node = self.ast(ast_index).node(id).clone();
        if node.kind == NodeKind::Block {
            return self.exec_block(ast_index, id);
        }
        let name = self.ast(ast_index).node_text(node.children[0]).to_string();
        let args_node = self.ast(ast_index).node(node.children[1]).clone();

        let mut args = Vec::with_capacity(args_node.children.len());
        for &argument in &args_node.children {
            args.push(self.eval_expr(ast_index, argument)?);
        }

        let function = match self.scopes().function(&name).cloned() {
            Some(f) => f,
            None => return Err(self.raise(ErrorKind::FunctionNotFound, node.start)),
        };

        if function.is_builtin() {
            return match packages::invoke(self, &name, args) {
                Ok(()) => Ok(Terminate::None),
                Err(kind) => Err(self.raise(kind, node.start)),
            };
        }
        self.call_user_function(&function, args, node.start, kind)
    }

    /// Bind arguments (casting to the declared parameter types, evaluating
    /// defaults for missing trailing ones), push a frame over the function
    /// body and run it. A `Return` termination is consumed here; the return
    /// value travels through `_`.
    fn call_user_function(
        &mut self,
        function: &Function,
        args: Vec<Variable>,
        call_at: usize,
        kind: ScopeKind,
    ) -> Result<Terminate, RuntimeError> {
        if args.len() > function.args.len() {
            return Err(self.raise(ErrorKind::TooManyArguments, call_at));
        }

        let mut bound = Vec::with_capacity(function.args.len());
        let mut supplied = args.into_iter();
        for param in &function.args {
            let mut value = match supplied.next() {
                Some(v) => v,
                None => match param.default {
                    Some(default) => self.eval_expr(function.ast_index, default)?,
                    None => {
                        return Err(self.raise(ErrorKind::TooFewArguments, call_at));
                    }
                },
            };
            if let Err(cast_error) = value.cast(param.ty) {
                return Err(self.raise(cast_error, call_at));
            }
            value.name = param.name.clone();
            value.constant = false;
            bound.push(value);
        }

        let body = match function.body {
            Some(body) => body,
            None => return Err(self.raise(ErrorKind::Internal, call_at)),
        };
        let frame = self.scopes_mut().push(body, function.ast_index, kind);
        frame.return_type = function.return_type;
        for variable in bound {
            frame.add_variable(variable);
        }
        let entry = self.scopes().depth();
        self.drive(entry)?;
        Ok(Terminate::None)
    }
}
