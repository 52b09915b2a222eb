//! Console and shell builtins: `SAY`, `SAYLN`, `LISTEN`, `PAUSE`, `CLEAR`,
//! `SYSTEM`.

use std::io::BufRead;
use std::process::Command;

use super::{at_most, exactly, set_string_result, string_arg};
use crate::engine::Process;
use crate::error::ErrorKind;
use crate::variable::{Type, Value, Variable};

fn print_args(process: &mut Process, args: &[Variable]) -> Result<(), ErrorKind> {
    for arg in args {
        let text = arg.to_display_string().ok_or(ErrorKind::TypeMismatch)?;
        process.emit(&text);
    }
    Ok(())
}

/// `SAY args...` — print every argument through the print hook.
pub(super) fn say(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    print_args(process, &args)
}

/// `SAYLN args...` — like `SAY` with a trailing newline.
pub(super) fn sayln(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    print_args(process, &args)?;
    process.emit("\n");
    Ok(())
}

/// `LISTEN prompt?` — read a line from stdin into `_`.
pub(super) fn listen(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    at_most(&args, 1)?;
    if let Some(prompt) = args.first() {
        let text = prompt.to_display_string().ok_or(ErrorKind::TypeMismatch)?;
        process.emit(&text);
    }
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|_| ErrorKind::SayError)?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    set_string_result(process, line);
    Ok(())
}

/// `PAUSE` — wait for a newline on stdin.
pub(super) fn pause(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    let _ = process;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|_| ErrorKind::SayError)?;
    Ok(())
}

/// `CLEAR` — clear the terminal.
pub(super) fn clear(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    process.emit("\x1b[2J\x1b[H");
    Ok(())
}

/// `SYSTEM cmd` — run a shell command. A command that cannot be spawned or
/// exits nonzero raises [`ErrorKind::SystemCommandFailed`]; otherwise the
/// exit code is stored in `_`.
pub(super) fn system(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let command = string_arg(&args[0])?;

    let status = if cfg!(windows) {
        Command::new("cmd").args(["/C", command]).status()
    } else {
        Command::new("sh").args(["-c", command]).status()
    };
    let status = status.map_err(|_| ErrorKind::SystemCommandFailed)?;
    if !status.success() {
        return Err(ErrorKind::SystemCommandFailed);
    }
    process
        .scopes_mut()
        .set_result(Type::INT, Value::Int(status.code().unwrap_or(0)));
    Ok(())
}
