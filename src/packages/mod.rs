//! Module containing the standard library _packages_ and the registry the
//! interpreter dispatches builtin calls through.
//!
//! The core treats builtins as opaque: the root scope registers their
//! declared signatures, and a named call that resolves to a builtin is
//! handed to [`invoke`] with its evaluated arguments. Each package checks
//! its own arity, casts its arguments C-style and leaves its result in `_`.

use std::sync::OnceLock;

use ahash::AHashMap;

use crate::engine::Process;
use crate::error::ErrorKind;
use crate::variable::{DataType, Type, Value, Variable};

mod array_basic;
mod file_basic;
mod io_basic;
mod lang_core;
mod math_basic;
mod rand_basic;
mod string_more;
mod time_basic;

type NativeFn = fn(&mut Process, Vec<Variable>) -> Result<(), ErrorKind>;

const STRING_ARRAY: Type = Type::array_of(DataType::String, 1);
const ANY_ARRAY: Type = Type::array_of(DataType::Array, 1);

/// Every builtin: name, declared return type, implementation.
static TABLE: &[(&str, Type, NativeFn)] = &[
    // core I/O and process control
    ("SAY", Type::VOID, io_basic::say),
    ("SAYLN", Type::VOID, io_basic::sayln),
    ("END", Type::VOID, lang_core::end),
    ("PAUSE", Type::VOID, io_basic::pause),
    ("BREAK", Type::VOID, lang_core::break_loop),
    ("CONTINUE", Type::VOID, lang_core::continue_loop),
    ("RETURN", Type::VOID, lang_core::return_value),
    ("LISTEN", Type::STRING, io_basic::listen),
    ("CLEAR", Type::VOID, io_basic::clear),
    ("SYSTEM", Type::INT, io_basic::system),
    // math
    ("SQRT", Type::DOUBLE, math_basic::sqrt),
    ("POW", Type::DOUBLE, math_basic::pow),
    ("ROUND", Type::DOUBLE, math_basic::round),
    ("FLOOR", Type::DOUBLE, math_basic::floor),
    ("CEIL", Type::DOUBLE, math_basic::ceil),
    ("ABS", Type::DOUBLE, math_basic::abs),
    ("MIN", Type::DOUBLE, math_basic::min),
    ("MAX", Type::DOUBLE, math_basic::max),
    ("LOG", Type::DOUBLE, math_basic::log),
    ("LOG10", Type::DOUBLE, math_basic::log10),
    ("SIN", Type::DOUBLE, math_basic::sin),
    ("COS", Type::DOUBLE, math_basic::cos),
    ("TAN", Type::DOUBLE, math_basic::tan),
    ("ASIN", Type::DOUBLE, math_basic::asin),
    ("ACOS", Type::DOUBLE, math_basic::acos),
    ("ATAN", Type::DOUBLE, math_basic::atan),
    ("ATAN2", Type::DOUBLE, math_basic::atan2),
    ("EXP", Type::DOUBLE, math_basic::exp),
    // random
    ("SRAND", Type::VOID, rand_basic::srand),
    ("RANDINT", Type::INT, rand_basic::randint),
    ("RAND", Type::DOUBLE, rand_basic::rand),
    ("RANDRANGE", Type::INT, rand_basic::randrange),
    // time
    ("TIME", Type::LONG, time_basic::time),
    ("DATE", Type::STRING, time_basic::date),
    ("DATETIME", Type::STRING, time_basic::datetime),
    ("TIMESTAMP", Type::LONG, time_basic::timestamp),
    ("CLOCK", Type::LONG, time_basic::clock),
    ("SLEEP", Type::VOID, time_basic::sleep),
    // files
    ("READ", Type::STRING, file_basic::read),
    ("WRITE", Type::VOID, file_basic::write),
    ("APPEND", Type::VOID, file_basic::append),
    // strings
    ("SPLIT", STRING_ARRAY, string_more::split),
    ("LOWERCASE", Type::STRING, string_more::lowercase),
    ("UPPERCASE", Type::STRING, string_more::uppercase),
    ("LENGTH", Type::INT, string_more::length),
    ("SUBSTRING", Type::STRING, string_more::substring),
    ("INDEXOF", Type::INT, string_more::indexof),
    ("LASTINDEXOF", Type::INT, string_more::lastindexof),
    ("STARTSWITH", Type::BOOL, string_more::startswith),
    ("ENDSWITH", Type::BOOL, string_more::endswith),
    ("TRIM", Type::STRING, string_more::trim),
    ("REVERSE", Type::STRING, string_more::reverse),
    ("REPLACE", Type::STRING, string_more::replace),
    ("CONTAINS", Type::BOOL, string_more::contains),
    ("REMOVE", Type::STRING, string_more::remove),
    ("INSERT", Type::STRING, string_more::insert),
    ("STRINGTOINT", Type::INT, string_more::stringtoint),
    ("STRINGTODOUBLE", Type::DOUBLE, string_more::stringtodouble),
    // arrays
    ("ARRAYSHIFT", ANY_ARRAY, array_basic::arrayshift),
    ("ARRAYREMOVE", ANY_ARRAY, array_basic::arrayremove),
    ("ARRAYINSERT", ANY_ARRAY, array_basic::arrayinsert),
    ("ARRAYSLICE", ANY_ARRAY, array_basic::arrayslice),
];

fn registry() -> &'static AHashMap<&'static str, NativeFn> {
    static REGISTRY: OnceLock<AHashMap<&'static str, NativeFn>> = OnceLock::new();
    REGISTRY.get_or_init(|| TABLE.iter().map(|&(name, _, f)| (name, f)).collect())
}

/// The declared signatures seeded into every root scope.
pub(crate) fn signatures() -> impl Iterator<Item = (&'static str, Type)> {
    TABLE.iter().map(|&(name, ty, _)| (name, ty))
}

/// Dispatch a builtin by name.
pub(crate) fn invoke(
    process: &mut Process,
    name: &str,
    args: Vec<Variable>,
) -> Result<(), ErrorKind> {
    match registry().get(name) {
        Some(f) => f(process, args),
        None => Err(ErrorKind::FunctionNotFound),
    }
}

// ----------------------------------------------------------------------
// shared argument helpers
// ----------------------------------------------------------------------

fn exactly(args: &[Variable], n: usize) -> Result<(), ErrorKind> {
    if args.len() > n {
        Err(ErrorKind::TooManyArguments)
    } else if args.len() < n {
        Err(ErrorKind::TooFewArguments)
    } else {
        Ok(())
    }
}

fn at_most(args: &[Variable], n: usize) -> Result<(), ErrorKind> {
    if args.len() > n {
        Err(ErrorKind::TooManyArguments)
    } else {
        Ok(())
    }
}

fn string_arg(v: &Variable) -> Result<&str, ErrorKind> {
    match &v.value {
        Value::Str(s) if !v.ty.is_array() => Ok(s),
        _ => Err(ErrorKind::TypeMismatch),
    }
}

fn double_arg(v: &Variable) -> Result<f64, ErrorKind> {
    if v.ty.is_array() || !v.ty.data.is_numeric() {
        return Err(ErrorKind::TypeMismatch);
    }
    Ok(v.value.as_f64())
}

fn long_arg(v: &Variable) -> Result<i64, ErrorKind> {
    if v.ty.is_array() || !v.ty.data.is_numeric() {
        return Err(ErrorKind::TypeMismatch);
    }
    Ok(v.value.as_i64())
}

/// A non-negative index argument.
fn index_arg(v: &Variable) -> Result<usize, ErrorKind> {
    let raw = long_arg(v)?;
    usize::try_from(raw).map_err(|_| ErrorKind::NumberCannotBeNegative)
}

fn set_double_result(process: &mut Process, value: f64) {
    process
        .scopes_mut()
        .set_result(Type::DOUBLE, Value::Double(value));
}

fn set_string_result(process: &mut Process, value: String) {
    process
        .scopes_mut()
        .set_result(Type::STRING, Value::Str(value));
}
