//! Random-number builtins. The generator lives on the process and is
//! reseeded by `SRAND`.

use rand::{Rng, SeedableRng};

use super::{exactly, long_arg};
use crate::engine::Process;
use crate::error::ErrorKind;
use crate::variable::{Type, Value, Variable};

/// `SRAND seed` — reseed the process RNG deterministically.
pub(super) fn srand(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 1)?;
    let seed = long_arg(&args[0])? as u64;
    process.rng = rand::rngs::StdRng::seed_from_u64(seed);
    Ok(())
}

/// `RANDINT` — a uniformly random `INT` over the whole range.
pub(super) fn randint(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    let value = process.rng.gen::<i32>();
    process.scopes_mut().set_result(Type::INT, Value::Int(value));
    Ok(())
}

/// `RAND` — a uniformly random `DOUBLE` in `[0, 1)`.
pub(super) fn rand(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 0)?;
    let value = process.rng.gen::<f64>();
    process
        .scopes_mut()
        .set_result(Type::DOUBLE, Value::Double(value));
    Ok(())
}

/// `RANDRANGE lo hi` — a uniformly random `INT` in `[lo, hi)`.
pub(super) fn randrange(process: &mut Process, args: Vec<Variable>) -> Result<(), ErrorKind> {
    exactly(&args, 2)?;
    let lo = long_arg(&args[0])? as i32;
    let hi = long_arg(&args[1])? as i32;
    if lo >= hi {
        return Err(ErrorKind::MathDomainError);
    }
    let value = process.rng.gen_range(lo..hi);
    process.scopes_mut().set_result(Type::INT, Value::Int(value));
    Ok(())
}
