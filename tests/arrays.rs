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

fn ints_of(process: &Process, name: &str) -> Vec<i32> {
    let variable = process.get_variable(name).expect("variable should exist");
    let elements = variable.value.elements().expect("expected an array");
    elements
        .iter()
        .map(|e| match e.value {
            Value::Int(v) => v,
            ref other => panic!("expected INT element, got {:?}", other),
        })
        .collect()
}

#[test]
fn test_declaration_casts_elements() {
    let process = run("MAKE ARRAY INT a = [10, 20, 30];");
    assert_eq!(ints_of(&process, "a"), [10, 20, 30]);
    let a = process.get_variable("a").unwrap();
    let names: Vec<&str> = a
        .value
        .elements()
        .unwrap()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, ["#0", "#1", "#2"]);
}

#[test]
fn test_indexing() {
    let process = run(
        "
        MAKE ARRAY INT a = [10, 20, 30];
        MAKE INT first = a#0;
        MAKE INT last = a#-1;
        MAKE INT second = a#-2;
        ",
    );
    assert_eq!(process.get_variable("first").unwrap().value, Value::Int(10));
    assert_eq!(process.get_variable("last").unwrap().value, Value::Int(30));
    assert_eq!(
        process.get_variable("second").unwrap().value,
        Value::Int(20)
    );
}

#[test]
fn test_index_out_of_bounds() {
    assert_eq!(
        run_err("MAKE ARRAY INT a = [1, 2]; MAKE INT x = a#2;"),
        ErrorKind::ArrayOutOfBounds
    );
    assert_eq!(
        run_err("MAKE ARRAY INT a = [1, 2]; MAKE INT x = a#-3;"),
        ErrorKind::ArrayOutOfBounds
    );
}

#[test]
fn test_index_is_assignable() {
    let process = run(
        "
        MAKE ARRAY INT a = [1, 2, 3];
        SET a#1 = 99;
        SET a#-1 += 5;
        ",
    );
    assert_eq!(ints_of(&process, "a"), [1, 99, 8]);
}

#[test]
fn test_concatenation() {
    let process = run(
        "
        MAKE ARRAY INT a = [1, 2];
        MAKE ARRAY INT b = [3];
        MAKE ARRAY INT c = a + b;
        ",
    );
    assert_eq!(ints_of(&process, "c"), [1, 2, 3]);
}

#[test]
fn test_subtract_pops_from_end() {
    let process = run(
        "
        MAKE ARRAY INT a = [1, 2, 3, 4];
        MAKE ARRAY INT b = a - 2;
        ",
    );
    assert_eq!(ints_of(&process, "b"), [1, 2]);
    assert_eq!(
        run_err("MAKE ARRAY INT a = [1]; MAKE ARRAY INT b = a - 5;"),
        ErrorKind::ArrayOutOfBounds
    );
}

#[test]
fn test_nested_arrays() {
    let process = run(
        "
        MAKE ARRAY ARRAY INT grid = [[1, 2], [3, 4]];
        MAKE INT corner = grid#1#0;
        SET grid#0#1 = 9;
        MAKE INT patched = grid#0#1;
        ",
    );
    assert_eq!(
        process.get_variable("corner").unwrap().value,
        Value::Int(3)
    );
    assert_eq!(
        process.get_variable("patched").unwrap().value,
        Value::Int(9)
    );
}

#[test]
fn test_declared_type_must_be_array() {
    assert_eq!(
        run_err("MAKE ARRAY INT a = 5;"),
        ErrorKind::TypeMismatch
    );
}

#[test]
fn test_string_elements() {
    let process = run(
        r#"
        MAKE ARRAY STRING words = ["alpha", "beta"];
        MAKE STRING w = words#1;
        "#,
    );
    assert_eq!(
        process.get_variable("w").unwrap().value,
        Value::Str("beta".into())
    );
}

#[test]
fn test_arrayshift() {
    let process = run(
        "
        MAKE ARRAY INT a = [1, 2, 3];
        DO ARRAYSHIFT(a) INTO a;
        ",
    );
    assert_eq!(ints_of(&process, "a"), [2, 3]);
}

#[test]
fn test_arrayremove() {
    let process = run(
        "
        MAKE ARRAY INT a = [1, 2, 3, 4];
        DO ARRAYREMOVE(a, 1) INTO a;
        DO ARRAYREMOVE(a, -1) INTO a;
        ",
    );
    assert_eq!(ints_of(&process, "a"), [1, 3]);
}

#[test]
fn test_arrayinsert() {
    let process = run(
        "
        MAKE ARRAY INT a = [1, 3];
        DO ARRAYINSERT(a, 2, 1) INTO a;
        DO ARRAYINSERT(a, 4, 3) INTO a;
        ",
    );
    assert_eq!(ints_of(&process, "a"), [1, 2, 3, 4]);
}

#[test]
fn test_arrayslice() {
    let process = run(
        "
        MAKE ARRAY INT a = [1, 2, 3, 4, 5];
        DO ARRAYSLICE(a, 1, 4) INTO a;
        ",
    );
    assert_eq!(ints_of(&process, "a"), [2, 3, 4]);
    assert_eq!(
        run_err("MAKE ARRAY INT a = [1]; DO ARRAYSLICE(a, 0, 5);"),
        ErrorKind::ArrayOutOfBounds
    );
}

#[test]
fn test_length_builtin() {
    let process = run(
        "
        MAKE ARRAY INT a = [1, 2, 3];
        MAKE INT n = 0;
        DO LENGTH(a) INTO n;
        ",
    );
    assert_eq!(process.get_variable("n").unwrap().value, Value::Int(3));
}
