use dosato::{Ast, ErrorKind, Process, Value};

fn run(script: &str) -> Process {
    let ast = Ast::compile(script).expect("script should parse");
    let mut process = Process::new(ast);
    assert_eq!(process.run(), 0, "script should run cleanly: {}", script);
    process
}

fn run_err(script: &str) -> ErrorKind {
    let ast = Ast::compile(script).expect("script should parse");
    let mut process = Process::new(ast);
    process.run();
    process.error().expect("script should fail").kind
}

#[test]
fn test_shadowing_inner_wins_then_unwinds() {
    let process = run(
        "
        MAKE INT x = 1;
        MAKE INT inner = 0;
        MAKE INT outer = 0;
        DO {
            MAKE INT x = 2;
            SET inner = x;
        };
        SET outer = x;
        ",
    );
    assert_eq!(process.get_variable("inner").unwrap().value, Value::Int(2));
    assert_eq!(process.get_variable("outer").unwrap().value, Value::Int(1));
}

#[test]
fn test_shadowing_declaration_is_legal() {
    // re-declaring in a nested block is fine; in the same scope it is not
    run("MAKE INT x = 1; DO { MAKE INT x = 2; };");
    assert_eq!(
        run_err("MAKE INT x = 1; MAKE INT x = 2;"),
        ErrorKind::VariableAlreadyExists
    );
}

#[test]
fn test_assignment_to_outer_scope() {
    let process = run(
        "
        MAKE INT x = 1;
        DO { SET x = x + 41; };
        ",
    );
    assert_eq!(process.get_variable("x").unwrap().value, Value::Int(42));
}

#[test]
fn test_constants_reject_assignment() {
    assert_eq!(
        run_err("SET TRUE = FALSE;"),
        ErrorKind::CannotModifyConstant
    );
    assert_eq!(
        run_err("SET MATH_PI = 3.0;"),
        ErrorKind::CannotModifyConstant
    );
    // `_` is user-visibly constant too; only the runtime writes it
    assert_eq!(run_err("SET _ = 5;"), ErrorKind::CannotModifyConstant);
}

#[test]
fn test_underscore_updated_by_runtime() {
    let process = run("DO SQRT(16.0);");
    assert_eq!(
        process.get_variable("_").unwrap().value,
        Value::Double(4.0)
    );
}

#[test]
fn test_scope_depth_constant() {
    let process = run(
        "
        MAKE INT top = 0;
        MAKE INT nested = 0;
        SET top = __depth;
        DO { DO { SET nested = __depth; }; };
        ",
    );
    assert_eq!(process.get_variable("top").unwrap().value, Value::Int(0));
    assert_eq!(process.get_variable("nested").unwrap().value, Value::Int(2));
}

#[test]
fn test_compound_assignment_operators() {
    let process = run(
        "
        MAKE INT x = 10;
        SET x += 5;
        SET x -= 3;
        SET x *= 4;
        SET x /= 2;
        SET x %= 7;
        ",
    );
    // ((10+5-3)*4/2) % 7 = 24 % 7 = 3
    assert_eq!(process.get_variable("x").unwrap().value, Value::Int(3));
}

#[test]
fn test_increment_decrement() {
    let process = run("MAKE INT x = 5; SET x ++; SET x ++; SET x --;");
    assert_eq!(process.get_variable("x").unwrap().value, Value::Int(6));
}

#[test]
fn test_bitwise_compound_assignment() {
    let process = run("MAKE INT x = 6; SET x &= 3; SET x |= 8; SET x ^= 1;");
    assert_eq!(process.get_variable("x").unwrap().value, Value::Int(11));
}

#[test]
fn test_not_not_inverts_bits() {
    let process = run("MAKE INT x = 0; SET x ~~;");
    assert_eq!(process.get_variable("x").unwrap().value, Value::Int(-1));
}

#[test]
fn test_set_rejects_non_reference() {
    assert_eq!(
        run_err("SET 1 = 2;"),
        ErrorKind::InvalidReferenceExpression
    );
    assert_eq!(
        run_err("MAKE INT x = 1; SET x + 1 = 2;"),
        ErrorKind::InvalidReferenceExpression
    );
}

#[test]
fn test_set_undefined_variable() {
    assert_eq!(run_err("SET nope = 1;"), ErrorKind::UndefinedVariable);
}
