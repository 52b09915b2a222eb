use std::cell::RefCell;
use std::rc::Rc;

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

fn capture(script: &str) -> (i32, String) {
    let ast = Ast::compile(script).expect("script should parse");
    let mut process = Process::new(ast);
    let out = Rc::new(RefCell::new(String::new()));
    let sink = out.clone();
    process.on_print(move |s| sink.borrow_mut().push_str(s));
    let code = process.run();
    let text = out.borrow().clone();
    (code, text)
}

#[test]
fn test_declaration_and_call() {
    let process = run(
        "
        MAKE FUNC INT add(INT x, INT y) { DO RETURN(x + y); };
        MAKE INT r = 0;
        DO add(2, 40) INTO r;
        ",
    );
    assert_eq!(process.get_variable("r").unwrap().value, Value::Int(42));
}

#[test]
fn test_call_in_expression_position() {
    let process = run(
        "
        MAKE FUNC INT add(INT x, INT y) { DO RETURN(x + y); };
        MAKE INT r = add(1, 2) * add(3, 4);
        ",
    );
    assert_eq!(process.get_variable("r").unwrap().value, Value::Int(21));
}

#[test]
fn test_return_value_casts_to_declared_type() {
    let process = run(
        "
        MAKE FUNC INT trunc(DOUBLE d) { DO RETURN(d); };
        MAKE INT r = trunc(3.9);
        ",
    );
    assert_eq!(process.get_variable("r").unwrap().value, Value::Int(3));
}

#[test]
fn test_arguments_cast_to_parameter_types() {
    let process = run(
        "
        MAKE FUNC DOUBLE half(DOUBLE d) { DO RETURN(d / 2); };
        MAKE DOUBLE r = half(7);
        ",
    );
    assert_eq!(process.get_variable("r").unwrap().value, Value::Double(3.5));
}

#[test]
fn test_recursion() {
    let process = run(
        "
        MAKE FUNC LONG fact(LONG n) {
            DO RETURN(1) WHEN (n <= 1);
            DO RETURN(n * fact(n - 1));
        };
        MAKE LONG r = fact(10);
        ",
    );
    assert_eq!(process.get_variable("r").unwrap().value, Value::Long(3628800));
}

#[test]
fn test_default_arguments() {
    let process = run(
        "
        MAKE FUNC INT inc(INT x, INT by = 1) { DO RETURN(x + by); };
        MAKE INT a = inc(5);
        MAKE INT b = inc(5, 10);
        ",
    );
    assert_eq!(process.get_variable("a").unwrap().value, Value::Int(6));
    assert_eq!(process.get_variable("b").unwrap().value, Value::Int(15));
}

#[test]
fn test_arity_errors() {
    assert_eq!(
        run_err(
            "
            MAKE FUNC INT add(INT x, INT y) { DO RETURN(x + y); };
            MAKE INT r = add(1);
            "
        ),
        ErrorKind::TooFewArguments
    );
    assert_eq!(
        run_err(
            "
            MAKE FUNC INT add(INT x, INT y) { DO RETURN(x + y); };
            MAKE INT r = add(1, 2, 3);
            "
        ),
        ErrorKind::TooManyArguments
    );
}

#[test]
fn test_duplicate_function() {
    assert_eq!(
        run_err(
            "
            MAKE FUNC INT f(INT x) { DO RETURN(x); };
            MAKE FUNC INT f(INT x) { DO RETURN(x); };
            "
        ),
        ErrorKind::FunctionAlreadyExists
    );
}

#[test]
fn test_function_not_found() {
    assert_eq!(run_err("DO nothere(1);"), ErrorKind::FunctionNotFound);
}

#[test]
fn test_return_outside_function() {
    assert_eq!(run_err("DO RETURN(1);"), ErrorKind::ReturnOutsideOfFunction);
}

#[test]
fn test_return_unwinds_nested_blocks() {
    let process = run(
        "
        MAKE FUNC INT pick(INT x) {
            DO {
                DO {
                    DO RETURN(x * 2) WHEN (x > 0);
                };
            };
            DO RETURN(0 - x);
        };
        MAKE INT pos = pick(21);
        MAKE INT neg = pick(-7);
        ",
    );
    assert_eq!(process.get_variable("pos").unwrap().value, Value::Int(42));
    assert_eq!(process.get_variable("neg").unwrap().value, Value::Int(7));
}

#[test]
fn test_void_function_rejects_value() {
    assert_eq!(
        run_err(
            r#"
            MAKE FUNC VOID shout() { DO RETURN(1); };
            DO shout();
            "#
        ),
        ErrorKind::TooManyArguments
    );
}

#[test]
fn test_parameters_are_local() {
    let process = run(
        "
        MAKE INT x = 1;
        MAKE FUNC INT bump(INT x) { DO RETURN(x + 1); };
        MAKE INT r = bump(41);
        ",
    );
    assert_eq!(process.get_variable("r").unwrap().value, Value::Int(42));
    assert_eq!(process.get_variable("x").unwrap().value, Value::Int(1));
}

#[test]
fn test_statements_after_return_do_not_run() {
    let src = r#"
        MAKE FUNC INT f() {
            DO RETURN(1);
            DO SAY("dead");
        };
        MAKE INT r = f();
    "#;
    assert_eq!(capture(src), (0, String::new()));
}

#[test]
fn test_array_parameters() {
    let process = run(
        "
        MAKE FUNC INT second(ARRAY INT items) { DO RETURN(items#1); };
        MAKE ARRAY INT xs = [5, 6, 7];
        MAKE INT r = second(xs);
        ",
    );
    assert_eq!(process.get_variable("r").unwrap().value, Value::Int(6));
}
