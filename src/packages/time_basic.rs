//! Date and time builtins.

use chrono::{Local, Utc};

use super::{exactly, long_arg, set_string_result};
use crate::engine::Process;
use crate::error::ErrorKind;
use crate::variable::{Type, Value, Variable};

/// `TIME` — unix time in seconds, as a `LONG` in `_`.
pub(super) fn time(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    process
        .scopes_mut()
        .set_result(Type::LONG, Value::Long(Utc::now().timestamp()));
    Ok(())
}

/// `DATE` — the local date as `YYYY-MM-DD`.
pub(super) fn date(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    set_string_result(process, Local::now().format("%Y-%m-%d").to_string());
    Ok(())
}

/// `DATETIME` — the local date and time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn datetime(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    set_string_result(
        process,
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    Ok(())
}

/// `TIMESTAMP` — unix time in milliseconds.
pub(super) fn timestamp(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    process
        .scopes_mut()
        .set_result(Type::LONG, Value::Long(Utc::now().timestamp_millis()));
    Ok(())
}

/// `CLOCK` — milliseconds since the process started.
pub(super) fn clock(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    let millis = process.clock_millis();
    process
        .scopes_mut()
        .set_result(Type::LONG, Value::Long(millis));
    Ok(())
}

/// `SLEEP ms` — block the interpreter thread.
pub(super) fn sleep(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let _ = process;
    let millis = long_arg(&args[0])?;
    if millis < 0 {
        return Err(ErrorKind::NumberCannotBeNegative);
    }
    std::thread::sleep(std::time::Duration::from_millis(millis as u64));
    Ok(())
}
