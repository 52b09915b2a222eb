//! File builtins: `READ`, `WRITE`, `APPEND`.

use std::fs;
use std::io::Write as _;

use super::{exactly, set_string_result, string_arg};
use crate::engine::Process;
use crate::error::ErrorKind;
use crate::variable::Variable;

/// `READ path` — the file's contents land in `_` as a `STRING`.
pub(super) fn read(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let path = string_arg(&args[0])?;
    let contents = fs::read_to_string(path).map_err(|_| ErrorKind::FileNotFound)?;
    set_string_result(process, contents);
    Ok(())
}

/// `WRITE path text` — create or truncate the file.
pub(super) fn write(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let _ = process;
    let path = string_arg(&args[0])?;
    let text = args[1]
        .to_display_string()
        .ok_or(ErrorKind::TypeMismatch)?;
    fs::write(path, text).map_err(|_| ErrorKind::PermissionDenied)
}

/// `APPEND path text` — append to the file, creating it if needed.
pub(super) fn append(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let _ = process;
    let path = string_arg(&args[0])?;
    let text = args[1]
        .to_display_string()
        .ok_or(ErrorKind::TypeMismatch)?;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|_| ErrorKind::PermissionDenied)?;
    file.write_all(text.as_bytes())
        .map_err(|_| ErrorKind::PermissionDenied)
}
