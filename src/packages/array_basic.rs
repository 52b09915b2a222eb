//! The array family of builtins. Each returns a fresh array in `_` with
//! renumbered element names.

use super::{exactly, long_arg};
use crate::engine::Process;
use crate::error::ErrorKind;
use crate::fn_builtin::{renumber, resolve_index};
use crate::variable::{Value, Variable};

fn array_arg(v: &Variable) -> Result<Vec<Variable>, ErrorKind> {
    if !v.ty.is_array() {
        return Err(ErrorKind::TypeMismatch);
    }
    match &v.value {
        Value::Array(elements) => Ok(elements.clone()),
        _ => Err(ErrorKind::TypeMismatch),
    }
}

/// `ARRAYSHIFT arr` — the array without its first element.
pub(super) fn arrayshift(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let mut elements = array_arg(&args[0])?;
    if elements.is_empty() {
        return Err(ErrorKind::ArrayOutOfBounds);
    }
    elements.remove(0);
    process
        .scopes_mut()
        .set_result(args[0].ty, Value::Array(renumber(elements)));
    Ok(())
}

/// `ARRAYREMOVE arr i` — the array without the element at `i` (negative
/// counts from the end).
pub(super) fn arrayremove(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let mut elements = array_arg(&args[0])?;
    let at = resolve_index(long_arg(&args[1])?, elements.len())?;
    elements.remove(at);
    process
        .scopes_mut()
        .set_result(args[0].ty, Value::Array(renumber(elements)));
    Ok(())
}

/// `ARRAYINSERT arr value i` — the array with `value` inserted before `i`
/// (`i` may equal the length to append).
pub(super) fn arrayinsert(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 3)?;
    let mut elements = array_arg(&args[0])?;
    let mut value = args[1].clone();
    value.cast(args[0].ty.element())?;

    let raw = long_arg(&args[2])?;
    let len = elements.len() as i64;
    let at = if raw < 0 { len + raw } else { raw };
    if at < 0 || at > len {
        return Err(ErrorKind::ArrayOutOfBounds);
    }
    elements.insert(at as usize, value);
    process
        .scopes_mut()
        .set_result(args[0].ty, Value::Array(renumber(elements)));
    Ok(())
}

/// `ARRAYSLICE arr lo hi` — the elements in `[lo, hi)`.
pub(super) fn arrayslice(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 3)?;
    let elements = array_arg(&args[0])?;
    let lo = long_arg(&args[1])?;
    let hi = long_arg(&args[2])?;
    let len = elements.len() as i64;
    let lo = if lo < 0 { len + lo } else { lo };
    let hi = if hi < 0 { len + hi } else { hi };
    if lo < 0 || hi < lo || hi > len {
        return Err(ErrorKind::ArrayOutOfBounds);
    }
    let kept = elements[lo as usize..hi as usize].to_vec();
    process
        .scopes_mut()
        .set_result(args[0].ty, Value::Array(renumber(kept)));
    Ok(())
}
