//! Module containing the pure operator kernel.
//!
//! Every binary and unary operator is a pure function from operand
//! variables to a fresh result variable (or an [`ErrorKind`] code); the
//! interpreter turns codes into located runtime errors. The numeric rules
//! are C's: integer operands widen to signed 64-bit, a floating operand
//! pulls the whole operation onto the double path, and strings stringify
//! the other side for `+`.

use num_traits::checked_pow;

use crate::error::ErrorKind;
use crate::variable::{index_name, DataType, Type, Value, Variable};

/// Anything except `VOID`, `FUNC` and `STRUCT` can appear in an addition.
#[inline]
fn addable(data: DataType) -> bool {
    data.is_numeric() || data == DataType::String
}

#[inline]
fn floating(v: &Variable) -> bool {
    v.ty.data.is_floating()
}

/// Truthiness: floats are truncated to integer first, then tested.
#[inline]
fn truthy(v: &Variable) -> bool {
    if floating(v) {
        v.value.as_f64() as i64 != 0
    } else {
        v.value.as_i64() != 0
    }
}

/// Both operands strictly numeric (no strings, no arrays)?
#[inline]
fn numeric_operands(left: &Variable, right: &Variable) -> bool {
    !left.ty.is_array()
        && !right.ty.is_array()
        && left.ty.data.is_numeric()
        && right.ty.data.is_numeric()
}

fn long(value: i64) -> Variable {
    Variable::temp(Type::LONG, Value::Long(value))
}

fn double(value: f64) -> Variable {
    Variable::temp(Type::DOUBLE, Value::Double(value))
}

fn boolean(value: bool) -> Variable {
    Variable::temp(Type::BOOL, Value::Bool(value))
}

/// Clone an element list with freshly numbered `#0`, `#1`, ... names.
pub(crate) fn renumber(elements: Vec<Variable>) -> Vec<Variable> {
    elements
        .into_iter()
        .enumerate()
        .map(|(i, mut v)| {
            v.name = index_name(i);
            v.constant = false;
            v
        })
        .collect()
}

/// `+` — array concatenation, string concatenation or numeric addition.
pub fn add(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if !addable(left.ty.data)
        && !addable(right.ty.data)
        && !left.ty.is_array()
        && !right.ty.is_array()
    {
        return Err(ErrorKind::CantUseTypeInAddition);
    }

    if left.ty.is_array() || right.ty.is_array() {
        if left.ty.array == right.ty.array {
            // same depth: concatenate, casting the right side to the left's type
            let mut rhs = right.clone();
            if rhs.ty != left.ty {
                rhs.cast(left.ty)?;
            }
            let mut elements = match left.value.clone() {
                Value::Array(v) => v,
                _ => return Err(ErrorKind::TypeMismatch),
            };
            match rhs.value {
                Value::Array(v) => elements.extend(v),
                _ => return Err(ErrorKind::TypeMismatch),
            }
            return Ok(Variable::temp(left.ty, Value::Array(renumber(elements))));
        }
        // mismatched depths: add the signed lengths
        let side = |v: &Variable| match v.value.elements() {
            Some(e) => e.len() as i64,
            None => v.value.as_i64(),
        };
        return Ok(long(side(left).wrapping_add(side(right))));
    }

    if left.ty.data == DataType::String || right.ty.data == DataType::String {
        let l = left.to_display_string().ok_or(ErrorKind::CantConvertToString)?;
        let r = right.to_display_string().ok_or(ErrorKind::CantConvertToString)?;
        return Ok(Variable::temp(Type::STRING, Value::Str(l + r.as_str())));
    }

    if floating(left) || floating(right) {
        Ok(double(left.value.as_f64() + right.value.as_f64()))
    } else {
        Ok(long(left.value.as_i64().wrapping_add(right.value.as_i64())))
    }
}

/// `-` — numeric subtraction; array minus an integer drops that many
/// elements off the end.
pub fn subtract(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if left.ty.is_array() {
        let mut count = right.clone();
        count.cast(Type::INT)?;
        let n = count.value.as_i64();
        let elements = left.value.elements().ok_or(ErrorKind::TypeMismatch)?;
        if n < 0 || n as usize > elements.len() {
            return Err(ErrorKind::ArrayOutOfBounds);
        }
        let kept = elements[..elements.len() - n as usize].to_vec();
        return Ok(Variable::temp(left.ty, Value::Array(renumber(kept))));
    }
    if !numeric_operands(left, right) {
        return Err(ErrorKind::TypeMismatch);
    }
    if floating(left) || floating(right) {
        Ok(double(left.value.as_f64() - right.value.as_f64()))
    } else {
        Ok(long(left.value.as_i64().wrapping_sub(right.value.as_i64())))
    }
}

/// `*`
pub fn multiply(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if !numeric_operands(left, right) {
        return Err(ErrorKind::TypeMismatch);
    }
    if floating(left) || floating(right) {
        Ok(double(left.value.as_f64() * right.value.as_f64()))
    } else {
        Ok(long(left.value.as_i64().wrapping_mul(right.value.as_i64())))
    }
}

/// `/` — integer division by zero is a [`ErrorKind::MathDomainError`]; the
/// float path follows IEEE.
pub fn divide(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if !numeric_operands(left, right) {
        return Err(ErrorKind::TypeMismatch);
    }
    if floating(left) || floating(right) {
        Ok(double(left.value.as_f64() / right.value.as_f64()))
    } else {
        let divisor = right.value.as_i64();
        if divisor == 0 {
            return Err(ErrorKind::MathDomainError);
        }
        Ok(long(left.value.as_i64().wrapping_div(divisor)))
    }
}

/// `%` — integers only.
pub fn modulo(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if !numeric_operands(left, right) {
        return Err(ErrorKind::TypeMismatch);
    }
    if floating(left) || floating(right) {
        return Err(ErrorKind::CantUseTypeInModulo);
    }
    let divisor = right.value.as_i64();
    if divisor == 0 {
        return Err(ErrorKind::MathDomainError);
    }
    Ok(long(left.value.as_i64().wrapping_rem(divisor)))
}

/// Exponentiation. Integer base and non-negative integer exponent stay on
/// the integer path unless the result overflows.
pub fn power(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if !numeric_operands(left, right) {
        return Err(ErrorKind::TypeMismatch);
    }
    if !floating(left) && !floating(right) {
        let exp = right.value.as_i64();
        if exp >= 0 {
            if let Ok(exp) = usize::try_from(exp) {
                if let Some(v) = checked_pow(left.value.as_i64(), exp) {
                    return Ok(long(v));
                }
            }
        }
    }
    Ok(double(left.value.as_f64().powf(right.value.as_f64())))
}

/// The `left`-th root of `right`.
pub fn root(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if !numeric_operands(left, right) {
        return Err(ErrorKind::TypeMismatch);
    }
    let degree = left.value.as_f64();
    let radicand = right.value.as_f64();
    if degree == 0.0 || radicand < 0.0 {
        return Err(ErrorKind::MathDomainError);
    }
    Ok(double(radicand.powf(1.0 / degree)))
}

fn bitwise(
    left: &Variable,
    right: &Variable,
    f: impl FnOnce(i64, i64) -> i64,
) -> Result<Variable, ErrorKind> {
    if !numeric_operands(left, right) || floating(left) || floating(right) {
        return Err(ErrorKind::CantUseTypeInBitwiseExpression);
    }
    Ok(long(f(left.value.as_i64(), right.value.as_i64())))
}

/// `&`
pub fn bit_and(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    bitwise(left, right, |a, b| a & b)
}

/// `|`
pub fn bit_or(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    bitwise(left, right, |a, b| a | b)
}

/// `^`
pub fn bit_xor(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    bitwise(left, right, |a, b| a ^ b)
}

/// `<<`
pub fn shift_left(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    bitwise(left, right, |a, b| a.wrapping_shl(b as u32))
}

/// `>>`
pub fn shift_right(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    bitwise(left, right, |a, b| a.wrapping_shr(b as u32))
}

/// `&&`
pub fn logical_and(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    Ok(boolean(truthy(left) && truthy(right)))
}

/// `||`
pub fn logical_or(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    Ok(boolean(truthy(left) || truthy(right)))
}

/// String-aware equality: two strings compare by contents, a string never
/// equals a non-string, everything else compares numerically.
fn raw_equals(left: &Variable, right: &Variable) -> Result<bool, ErrorKind> {
    if left.ty.data == DataType::String || right.ty.data == DataType::String {
        if left.ty.data != right.ty.data {
            return Ok(false);
        }
        let l = left.to_display_string().ok_or(ErrorKind::CantConvertToString)?;
        let r = right.to_display_string().ok_or(ErrorKind::CantConvertToString)?;
        return Ok(l == r);
    }
    if floating(left) || floating(right) {
        Ok(left.value.as_f64() == right.value.as_f64())
    } else {
        Ok(left.value.as_i64() == right.value.as_i64())
    }
}

/// `==`
pub fn equals(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    Ok(boolean(raw_equals(left, right)?))
}

/// `!=` — like `==`, a string never compares unequal-true against a
/// non-string either; mixed kinds are simply "not comparable".
pub fn not_equals(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if left.ty.data == DataType::String || right.ty.data == DataType::String {
        if left.ty.data != right.ty.data {
            return Ok(boolean(false));
        }
    }
    Ok(boolean(!raw_equals(left, right)?))
}

fn ordering(
    left: &Variable,
    right: &Variable,
    int_cmp: impl FnOnce(i64, i64) -> bool,
    float_cmp: impl FnOnce(f64, f64) -> bool,
    str_cmp: impl FnOnce(&str, &str) -> bool,
) -> Result<Variable, ErrorKind> {
    if left.ty.data == DataType::String && right.ty.data == DataType::String {
        let (l, r) = match (&left.value, &right.value) {
            (Value::Str(l), Value::Str(r)) => (l, r),
            _ => return Err(ErrorKind::TypeMismatch),
        };
        return Ok(boolean(str_cmp(l, r)));
    }
    if floating(left) || floating(right) {
        Ok(boolean(float_cmp(left.value.as_f64(), right.value.as_f64())))
    } else {
        Ok(boolean(int_cmp(left.value.as_i64(), right.value.as_i64())))
    }
}

/// `<`
pub fn less_than(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    ordering(left, right, |a, b| a < b, |a, b| a < b, |a, b| a < b)
}

/// `>`
pub fn greater_than(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    ordering(left, right, |a, b| a > b, |a, b| a > b, |a, b| a > b)
}

/// `<=`
pub fn less_than_or_equal(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    ordering(left, right, |a, b| a <= b, |a, b| a <= b, |a, b| a <= b)
}

/// `>=`
pub fn greater_than_or_equal(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    ordering(left, right, |a, b| a >= b, |a, b| a >= b, |a, b| a >= b)
}

/// Resolve a possibly-negative index against a length: `-len ≤ i < len`,
/// negatives counting from the end.
pub(crate) fn resolve_index(index: i64, len: usize) -> Result<usize, ErrorKind> {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    if resolved < 0 || resolved >= len {
        return Err(ErrorKind::ArrayOutOfBounds);
    }
    Ok(resolved as usize)
}

/// `#` in rvalue position: clone the indexed array element, or the char at
/// the index of a string.
pub fn index(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if left.ty.is_array() {
        let elements = left.value.elements().ok_or(ErrorKind::TypeMismatch)?;
        let at = resolve_index(right.value.as_i64(), elements.len())?;
        let element = &elements[at];
        return Ok(Variable::temp(element.ty, element.value.clone()));
    }
    if left.ty.data == DataType::String {
        let s = match &left.value {
            Value::Str(s) => s,
            _ => return Err(ErrorKind::TypeMismatch),
        };
        let chars: Vec<char> = s.chars().collect();
        let at = resolve_index(right.value.as_i64(), chars.len())?;
        return Ok(Variable::temp(Type::scalar(DataType::Char), Value::Char(chars[at])));
    }
    Err(ErrorKind::TypeMismatch)
}

/// Unary `!`
pub fn not(right: &Variable) -> Result<Variable, ErrorKind> {
    Ok(boolean(!truthy(right)))
}

/// Unary `~` — integers only.
pub fn bit_not(right: &Variable) -> Result<Variable, ErrorKind> {
    if !right.ty.data.is_numeric() || right.ty.is_array() || floating(right) {
        return Err(ErrorKind::CantUseTypeInBitwiseExpression);
    }
    Ok(long(!right.value.as_i64()))
}

/// Unary `-`
pub fn negate(right: &Variable) -> Result<Variable, ErrorKind> {
    if !right.ty.data.is_numeric() || right.ty.is_array() {
        return Err(ErrorKind::TypeMismatch);
    }
    if floating(right) {
        Ok(double(-right.value.as_f64()))
    } else {
        Ok(long(right.value.as_i64().wrapping_neg()))
    }
}

/// Absolute value, keeping integers integral.
pub fn absolute(right: &Variable) -> Result<Variable, ErrorKind> {
    if !right.ty.data.is_numeric() || right.ty.is_array() {
        return Err(ErrorKind::TypeMismatch);
    }
    if floating(right) {
        Ok(double(right.value.as_f64().abs()))
    } else {
        Ok(long(right.value.as_i64().wrapping_abs()))
    }
}

/// The larger of two numbers.
pub fn maximum(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if !numeric_operands(left, right) {
        return Err(ErrorKind::TypeMismatch);
    }
    if floating(left) || floating(right) {
        Ok(double(left.value.as_f64().max(right.value.as_f64())))
    } else {
        Ok(long(left.value.as_i64().max(right.value.as_i64())))
    }
}

/// The smaller of two numbers.
pub fn minimum(left: &Variable, right: &Variable) -> Result<Variable, ErrorKind> {
    if !numeric_operands(left, right) {
        return Err(ErrorKind::TypeMismatch);
    }
    if floating(left) || floating(right) {
        Ok(double(left.value.as_f64().min(right.value.as_f64())))
    } else {
        Ok(long(left.value.as_i64().min(right.value.as_i64())))
    }
}

/// Apply a compound assignment `left op= right` in place.
///
/// The right side is cast to the left's type first; a failed cast is the
/// `TypeMismatch` the assignment reports. `++`, `--` and `~~` ignore the
/// right side entirely.
pub fn apply_assignment(
    left: &mut Variable,
    right: &Variable,
    op: crate::token::Op,
) -> Result<(), ErrorKind> {
    use crate::token::Op;

    let mut rhs = right.clone();
    if rhs.ty != left.ty {
        rhs.cast(left.ty).map_err(|_| ErrorKind::TypeMismatch)?;
    }

    let result = match op {
        Op::Assign => {
            left.value = rhs.value;
            return Ok(());
        }
        Op::AddAssign => add(left, &rhs)?,
        Op::SubtractAssign => subtract(left, &rhs)?,
        Op::MultiplyAssign => multiply(left, &rhs)?,
        Op::DivideAssign => divide(left, &rhs)?,
        Op::ModuloAssign => modulo(left, &rhs)?,
        Op::AndAssign => bit_and(left, &rhs)?,
        Op::OrAssign => bit_or(left, &rhs)?,
        Op::XorAssign => bit_xor(left, &rhs)?,
        Op::Increment => add(left, &long(1))?,
        Op::Decrement => subtract(left, &long(1))?,
        Op::NotNot => bit_not(left)?,
        _ => return Err(ErrorKind::InvalidOperator),
    };
    let mut result = result;
    result.cast(left.ty).map_err(|_| ErrorKind::TypeMismatch)?;
    left.value = result.value;
    Ok(())
}
