//! The string family of builtins.
//!
//! Arguments are addressed by character, not by byte; negative index
//! arguments are rejected with `NumberCannotBeNegative` and ranges past the
//! end with `ArrayOutOfBounds`.

use super::{exactly, index_arg, set_string_result, string_arg};
use crate::engine::Process;
use crate::error::ErrorKind;
use crate::fn_builtin;
use crate::variable::{index_name, DataType, Type, Value, Variable};

/// `SPLIT s sep` — an array of `STRING` pieces in `_`. An empty separator
/// splits into single characters.
pub(super) fn split(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let text = string_arg(&args[0])?;
    let separator = string_arg(&args[1])?;

    let pieces: Vec<String> = if separator.is_empty() {
        text.chars().map(|c| c.to_string()).collect()
    } else {
        text.split(separator).map(str::to_string).collect()
    };
    let elements = pieces
        .into_iter()
        .enumerate()
        .map(|(i, s)| Variable::new(index_name(i), Type::STRING, Value::Str(s), false))
        .collect();
    process.scopes_mut().set_result(
        Type::array_of(DataType::String, 1),
        Value::Array(elements),
    );
    Ok(())
}

pub(super) fn lowercase(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let text = string_arg(&args[0])?.to_lowercase();
    set_string_result(process, text);
    Ok(())
}

pub(super) fn uppercase(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let text = string_arg(&args[0])?.to_uppercase();
    set_string_result(process, text);
    Ok(())
}

/// `LENGTH x` — character count of a string or element count of an array.
pub(super) fn length(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let len = match (&args[0].value, args[0].ty.is_array()) {
        (Value::Array(elements), true) => elements.len(),
        (Value::Str(s), false) => s.chars().count(),
        _ => return Err(ErrorKind::TypeMismatch),
    };
    process
        .scopes_mut()
        .set_result(Type::INT, Value::Int(len as i32));
    Ok(())
}

/// `SUBSTRING s start end` — characters in `[start, end)`.
pub(super) fn substring(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 3)?;
    let text = string_arg(&args[0])?;
    let start = index_arg(&args[1])?;
    let end = index_arg(&args[2])?;
    let chars: Vec<char> = text.chars().collect();
    if start > end || end > chars.len() {
        return Err(ErrorKind::ArrayOutOfBounds);
    }
    let piece: String = chars[start..end].iter().collect();
    set_string_result(process, piece);
    Ok(())
}

fn char_index_of(text: &str, byte_index: usize) -> i32 {
    text[..byte_index].chars().count() as i32
}

/// `INDEXOF s sub` — first occurrence as a character index, -1 if absent.
pub(super) fn indexof(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let text = string_arg(&args[0])?;
    let needle = string_arg(&args[1])?;
    let at = text
        .find(needle)
        .map_or(-1, |byte| char_index_of(text, byte));
    process.scopes_mut().set_result(Type::INT, Value::Int(at));
    Ok(())
}

/// `LASTINDEXOF s sub` — last occurrence as a character index, -1 if absent.
pub(super) fn lastindexof(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let text = string_arg(&args[0])?;
    let needle = string_arg(&args[1])?;
    let at = text
        .rfind(needle)
        .map_or(-1, |byte| char_index_of(text, byte));
    process.scopes_mut().set_result(Type::INT, Value::Int(at));
    Ok(())
}

pub(super) fn startswith(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let result = string_arg(&args[0])?.starts_with(string_arg(&args[1])?);
    process
        .scopes_mut()
        .set_result(Type::BOOL, Value::Bool(result));
    Ok(())
}

pub(super) fn endswith(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let result = string_arg(&args[0])?.ends_with(string_arg(&args[1])?);
    process
        .scopes_mut()
        .set_result(Type::BOOL, Value::Bool(result));
    Ok(())
}

pub(super) fn trim(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let text = string_arg(&args[0])?.trim().to_string();
    set_string_result(process, text);
    Ok(())
}

/// `REVERSE x` — reverse a string's characters or an array's elements.
pub(super) fn reverse(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let arg = &args[0];
    if arg.ty.is_array() {
        let mut elements = match &arg.value {
            Value::Array(e) => e.clone(),
            _ => return Err(ErrorKind::TypeMismatch),
        };
        elements.reverse();
        process
            .scopes_mut()
            .set_result(arg.ty, Value::Array(fn_builtin::renumber(elements)));
        return Ok(());
    }
    let text: String = string_arg(arg)?.chars().rev().collect();
    set_string_result(process, text);
    Ok(())
}

/// `REPLACE s from to` — replace every occurrence.
pub(super) fn replace(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 3)?;
    let text = string_arg(&args[0])?;
    let from = string_arg(&args[1])?;
    let to = string_arg(&args[2])?;
    let result = if from.is_empty() {
        text.to_string()
    } else {
        text.replace(from, to)
    };
    set_string_result(process, result);
    Ok(())
}

/// `CONTAINS x needle` — substring test for strings, element test for
/// arrays.
pub(super) fn contains(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let found = if args[0].ty.is_array() {
        let elements = args[0].value.elements().ok_or(ErrorKind::TypeMismatch)?;
        let mut found = false;
        for element in elements {
            if let Value::Bool(true) = fn_builtin::equals(element, &args[1])?.value {
                found = true;
                break;
            }
        }
        found
    } else {
        string_arg(&args[0])?.contains(string_arg(&args[1])?)
    };
    process
        .scopes_mut()
        .set_result(Type::BOOL, Value::Bool(found));
    Ok(())
}

/// `REMOVE s sub` — remove the first occurrence.
pub(super) fn remove(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let text = string_arg(&args[0])?;
    let needle = string_arg(&args[1])?;
    let result = if needle.is_empty() {
        text.to_string()
    } else {
        text.replacen(needle, "", 1)
    };
    set_string_result(process, result);
    Ok(())
}

/// `INSERT s sub at` — insert `sub` before the character at `at`.
pub(super) fn insert(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 3)?;
    let text = string_arg(&args[0])?;
    let piece = string_arg(&args[1])?;
    let at = index_arg(&args[2])?;
    let chars: Vec<char> = text.chars().collect();
    if at > chars.len() {
        return Err(ErrorKind::ArrayOutOfBounds);
    }
    let mut result: String = chars[..at].iter().collect();
    result.push_str(piece);
    result.extend(&chars[at..]);
    set_string_result(process, result);
    Ok(())
}

pub(super) fn stringtoint(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let value: i32 = string_arg(&args[0])?
        .trim()
        .parse()
        .map_err(|_| ErrorKind::InvalidNumber)?;
    process.scopes_mut().set_result(Type::INT, Value::Int(value));
    Ok(())
}

pub(super) fn stringtodouble(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let value: f64 = string_arg(&args[0])?
        .trim()
        .parse()
        .map_err(|_| ErrorKind::InvalidNumber)?;
    process
        .scopes_mut()
        .set_result(Type::DOUBLE, Value::Double(value));
    Ok(())
}
