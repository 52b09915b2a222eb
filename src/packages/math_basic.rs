//! Math builtins. All results land in `_`; domain violations raise
//! [`ErrorKind::MathDomainError`].

use super::{double_arg, exactly, set_double_result};
use crate::engine::Process;
use crate::error::ErrorKind;
use crate::fn_builtin;
use crate::variable::Variable;

fn unary(
    process: &mut Process,
    args: Vec<Variable>,
    f: impl FnOnce(f64) -> Result<f64, ErrorKind>,
) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let x = double_arg(&args[0])?;
    let result = f(x)?;
    set_double_result(process, result);
    Ok(())
}

pub(super) fn sqrt(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| {
        if x < 0.0 {
            Err(ErrorKind::MathDomainError)
        } else {
            Ok(x.sqrt())
        }
    })
}

pub(super) fn pow(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let result = fn_builtin::power(&args[0], &args[1])?;
    process.scopes_mut().set_result(result.ty, result.value);
    Ok(())
}

pub(super) fn round(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| Ok(x.round()))
}

pub(super) fn floor(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| Ok(x.floor()))
}

pub(super) fn ceil(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| Ok(x.ceil()))
}

pub(super) fn abs(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let result = fn_builtin::absolute(&args[0])?;
    process.scopes_mut().set_result(result.ty, result.value);
    Ok(())
}

pub(super) fn min(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let result = fn_builtin::minimum(&args[0], &args[1])?;
    process.scopes_mut().set_result(result.ty, result.value);
    Ok(())
}

pub(super) fn max(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let result = fn_builtin::maximum(&args[0], &args[1])?;
    process.scopes_mut().set_result(result.ty, result.value);
    Ok(())
}

pub(super) fn log(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| {
        if x <= 0.0 {
            Err(ErrorKind::MathDomainError)
        } else {
            Ok(x.ln())
        }
    })
}

pub(super) fn log10(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| {
        if x <= 0.0 {
            Err(ErrorKind::MathDomainError)
        } else {
            Ok(x.log10())
        }
    })
}

pub(super) fn sin(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| Ok(x.sin()))
}

pub(super) fn cos(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| Ok(x.cos()))
}

pub(super) fn tan(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| Ok(x.tan()))
}

pub(super) fn asin(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| {
        if !(-1.0..=1.0).contains(&x) {
            Err(ErrorKind::MathDomainError)
        } else {
            Ok(x.asin())
        }
    })
}

pub(super) fn acos(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| {
        if !(-1.0..=1.0).contains(&x) {
            Err(ErrorKind::MathDomainError)
        } else {
            Ok(x.acos())
        }
    })
}

pub(super) fn atan(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| Ok(x.atan()))
}

pub(super) fn atan2(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let y = double_arg(&args[0])?;
    let x = double_arg(&args[1])?;
    set_double_result(process, y.atan2(x));
    Ok(())
}

pub(super) fn exp(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    unary(process, args, |x| Ok(x.exp()))
}
