//! Process and loop control: `END`, `BREAK`, `CONTINUE`, `RETURN`.

use super::{at_most, exactly, long_arg};
use crate::engine::Process;
use crate::error::ErrorKind;
use crate::scope::{ScopeKind, Terminate};
use crate::variable::{DataType, Variable};

/// `END code?` — stop the process with an exit code.
pub(super) fn end(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    at_most(&args, 1)?;
    let code = match args.first() {
        Some(v) => long_arg(v)? as i32,
        None => 0,
    };
    process.stop(code);
    Ok(())
}

/// `BREAK n?` — terminate the n innermost block frames (default 1), one
/// loop body per count.
pub(super) fn break_loop(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    at_most(&args, 1)?;
    let count = match args.first() {
        Some(v) => long_arg(v)?,
        None => 1,
    };
    if count <= 0 {
        return Err(ErrorKind::NumberCannotBeNegative);
    }
    for _ in 0..count {
        let scopes = process.scopes_mut();
        let index = scopes.last_non_terminated_index();
        let frame = scopes.frame_mut(index);
        if frame.kind != ScopeKind::Block {
            return Err(ErrorKind::BreakOutsideOfLoop);
        }
        frame.terminated = Terminate::Break;
    }
    Ok(())
}

/// `CONTINUE` — terminate the innermost block frame for this iteration.
pub(super) fn continue_loop(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    let scopes = process.scopes_mut();
    let index = scopes.last_non_terminated_index();
    let frame = scopes.frame_mut(index);
    if frame.kind != ScopeKind::Block {
        return Err(ErrorKind::ContinueOutsideOfLoop);
    }
    frame.terminated = Terminate::Continue;
    Ok(())
}

/// `RETURN v?` — unwind block frames up to the enclosing function frame,
/// casting the value to the declared return type and storing it in `_`.
pub(super) fn return_value(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    at_most(&args, 1)?;

    // mark block frames until the function (or expression) frame is reached
    let target = loop {
        let scopes = process.scopes_mut();
        let index = scopes.last_non_terminated_index();
        let frame = scopes.frame_mut(index);
        match frame.kind {
            ScopeKind::Block => frame.terminated = Terminate::Return,
            ScopeKind::Function | ScopeKind::Expression => break index,
            ScopeKind::Root => return Err(ErrorKind::ReturnOutsideOfFunction),
        }
    };

    let return_type = process.scopes().frame(target).return_type;
    if return_type.data == DataType::Void && !return_type.is_array() {
        if !args.is_empty() {
            return Err(ErrorKind::TooManyArguments);
        }
    } else {
        exactly(&args, 1)?;
        let mut value = args.into_iter().next().expect("arity checked");
        value.cast(return_type)?;
        process.scopes_mut().set_result(value.ty, value.value);
    }

    process.scopes_mut().frame_mut(target).terminated = Terminate::Return;
    Ok(())
}
