use std::cell::RefCell;
use std::rc::Rc;

use dosato::{Ast, ErrorKind, Process, Value};

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

fn run_err(script: &str) -> ErrorKind {
    let ast = Ast::compile(script).expect("script should parse");
    let mut process = Process::new(ast);
    process.run();
    process.error().expect("script should fail").kind
}

#[test]
fn test_when_guards_call() {
    assert_eq!(capture(r#"DO SAY("yes") WHEN (1 < 2);"#), (0, "yes".into()));
    assert_eq!(capture(r#"DO SAY("yes") WHEN (2 < 1);"#), (0, String::new()));
}

#[test]
fn test_when_else() {
    let src = r#"
        MAKE INT x = 0;
        DO SAY("pos") WHEN (x > 0) ELSE SAY("neg");
    "#;
    assert_eq!(capture(src), (0, "neg".into()));
}

#[test]
fn test_when_else_chain() {
    let src = r#"
        MAKE INT x = 5;
        DO SAY("a") WHEN (x == 1) ELSE SAY("b") WHEN (x == 5) ELSE SAY("c");
    "#;
    assert_eq!(capture(src), (0, "b".into()));
}

#[test]
fn test_when_on_block() {
    let src = r#"
        MAKE INT x = 1;
        DO { SET x = 42; } WHEN (x == 1);
        DO { SET x = 0; } WHEN (x == 1);
        DO SAY(x);
    "#;
    assert_eq!(capture(src), (0, "42".into()));
}

#[test]
fn test_then_sequences_on_success() {
    assert_eq!(
        capture(r#"DO SAY("a") THEN SAY("b") THEN SAY("c");"#),
        (0, "abc".into())
    );
}

#[test]
fn test_then_skipped_after_failure_without_catch() {
    let src = r#"DO missing() THEN SAY("never");"#;
    assert_eq!(run_err(src), ErrorKind::FunctionNotFound);
}

#[test]
fn test_catch_masks_failure() {
    let src = r#"DO missing() CATCH SAYLN("caught");"#;
    assert_eq!(capture(src), (0, "caught\n".into()));
}

#[test]
fn test_catch_stores_error_code_in_underscore() {
    let src = "
        MAKE INT e = 0;
        DO missing() CATCH { SET e = _; };
    ";
    let ast = Ast::compile(src).unwrap();
    let mut process = Process::new(ast);
    assert_eq!(process.run(), 0);
    assert_eq!(
        process.get_variable("e").unwrap().value,
        Value::Int(ErrorKind::FunctionNotFound.code())
    );
}

#[test]
fn test_catch_after_then() {
    let src = r#"DO SAY("a") THEN missing() CATCH SAY("c");"#;
    assert_eq!(capture(src), (0, "ac".into()));
}

#[test]
fn test_into_stores_result() {
    let src = "
        MAKE DOUBLE root = 0.0;
        DO SQRT(81.0) INTO root;
    ";
    let ast = Ast::compile(src).unwrap();
    let mut process = Process::new(ast);
    assert_eq!(process.run(), 0);
    assert_eq!(
        process.get_variable("root").unwrap().value,
        Value::Double(9.0)
    );
}

#[test]
fn test_into_casts_to_target_type() {
    let src = "
        MAKE INT n = 0;
        DO SQRT(16.5) INTO n;
    ";
    let ast = Ast::compile(src).unwrap();
    let mut process = Process::new(ast);
    assert_eq!(process.run(), 0);
    assert_eq!(process.get_variable("n").unwrap().value, Value::Int(4));
}

#[test]
fn test_into_rejects_constants() {
    assert_eq!(
        run_err("DO SQRT(4.0) INTO TRUE;"),
        ErrorKind::CannotModifyConstant
    );
}

#[test]
fn test_catch_must_be_final() {
    assert_eq!(
        run_err(r#"DO missing() CATCH SAY("a") THEN SAY("b");"#),
        ErrorKind::ExtensionNotFinal
    );
}

#[test]
fn test_while_must_be_last() {
    assert_eq!(
        run_err(r#"DO SAY("x") WHILE (FALSE) THEN SAY("y");"#),
        ErrorKind::WhileNotLast
    );
}

#[test]
fn test_when_in_middle_requires_else() {
    assert_eq!(
        run_err(r#"DO SAY("a") WHEN (TRUE) THEN SAY("b");"#),
        ErrorKind::ExpectedElse
    );
}

#[test]
fn test_inline_block_call() {
    let src = r#"
        MAKE INT x = 0;
        DO { SET x = 1; } THEN { SET x = x + 10; };
        DO SAY(x);
    "#;
    assert_eq!(capture(src), (0, "11".into()));
}
