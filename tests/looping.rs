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

fn int_of(process: &Process, name: &str) -> i32 {
    match process.get_variable(name).expect("variable should exist").value {
        Value::Int(v) => v,
        ref other => panic!("expected INT, got {:?}", other),
    }
}

#[test]
fn test_while_loop_runs_until_false() {
    let process = run(
        "
        MAKE INT i = 0;
        DO { SET i = i + 1; } WHILE (i < 3);
        ",
    );
    assert_eq!(int_of(&process, "i"), 3);
}

#[test]
fn test_while_false_never_runs() {
    let process = run(
        "
        MAKE INT i = 0;
        DO { SET i = 99; } WHILE (FALSE);
        ",
    );
    assert_eq!(int_of(&process, "i"), 0);
}

#[test]
fn test_break_exits_one_loop() {
    let process = run(
        "
        MAKE INT i = 0;
        DO {
            SET i = i + 1;
            DO BREAK() WHEN (i == 2);
        } WHILE (i < 100);
        ",
    );
    assert_eq!(int_of(&process, "i"), 2);
}

#[test]
fn test_break_from_nested_block() {
    let process = run(
        "
        MAKE INT i = 0;
        DO {
            SET i = i + 1;
            DO { DO BREAK() WHEN (i == 3); };
        } WHILE (i < 100);
        ",
    );
    assert_eq!(int_of(&process, "i"), 3);
}

#[test]
fn test_break_count_exits_nested_loops() {
    let process = run(
        "
        MAKE INT i = 0;
        MAKE INT total = 0;
        DO {
            SET i = i + 1;
            MAKE INT j = 0;
            DO {
                SET j = j + 1;
                SET total = total + 1;
                DO BREAK(2) WHEN (total == 4);
            } WHILE (j < 3);
        } WHILE (i < 10);
        ",
    );
    assert_eq!(int_of(&process, "total"), 4);
    assert_eq!(int_of(&process, "i"), 2);
}

#[test]
fn test_continue_skips_rest_of_iteration() {
    let process = run(
        "
        MAKE INT i = 0;
        MAKE INT total = 0;
        DO {
            SET i = i + 1;
            DO CONTINUE() WHEN (i == 2);
            SET total = total + i;
        } WHILE (i < 4);
        ",
    );
    // 1 + 3 + 4; the i == 2 iteration is skipped
    assert_eq!(int_of(&process, "total"), 8);
}

#[test]
fn test_break_outside_loop() {
    assert_eq!(run_err("DO BREAK();"), ErrorKind::BreakOutsideOfLoop);
}

#[test]
fn test_continue_outside_loop() {
    assert_eq!(run_err("DO CONTINUE();"), ErrorKind::ContinueOutsideOfLoop);
}

#[test]
fn test_break_count_must_be_positive() {
    assert_eq!(
        run_err("DO { DO BREAK(0); } WHILE (TRUE);"),
        ErrorKind::NumberCannotBeNegative
    );
    assert_eq!(
        run_err("DO { DO BREAK(-1); } WHILE (TRUE);"),
        ErrorKind::NumberCannotBeNegative
    );
}

#[test]
fn test_loop_body_scope_is_fresh_per_iteration() {
    // a MAKE inside the body must not collide with the previous iteration
    let process = run(
        "
        MAKE INT i = 0;
        DO {
            SET i = i + 1;
            MAKE INT local = i * 10;
            SET i = local / 10;
        } WHILE (i < 3);
        ",
    );
    assert_eq!(int_of(&process, "i"), 3);
}

#[test]
fn test_nested_loops() {
    let process = run(
        "
        MAKE INT total = 0;
        MAKE INT i = 0;
        DO {
            SET i = i + 1;
            MAKE INT j = 0;
            DO {
                SET j = j + 1;
                SET total = total + 1;
            } WHILE (j < 4);
        } WHILE (i < 3);
        ",
    );
    assert_eq!(int_of(&process, "total"), 12);
}
