use lox::vm::VM;
use lox::{interpret, InterpretError};

fn run(source: &str) -> Result<String, InterpretError> {
    let mut out = Vec::new();
    interpret(source, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn define_read_and_assign() {
    let source = r#"
var beverage = "cafe au lait";
var breakfast = "beignets";
breakfast = breakfast + " with " + beverage;
print breakfast;"#;
    assert_eq!(run(source).unwrap(), "beignets with cafe au lait\n");
}

#[test]
fn declared_without_initializer_is_nil() {
    assert_eq!(run("var x;\nprint x;").unwrap(), "nil\n");
}

#[test]
fn assignment_needs_a_declaration() {
    let err = run("x = 1;").unwrap_err();
    assert!(matches!(err, InterpretError::RuntimeError(_)));
    assert_eq!(err.to_string(), "Undefined variable 'x'.\n[line 1] in script");
}

#[test]
fn redeclaration_overwrites() {
    assert_eq!(run("var a = 1;\nvar a = \"two\";\nprint a;").unwrap(), "two\n");
}

#[test]
fn assignment_precedence() {
    let source = r#"
var a = 1;
var b = 2;
var c = 3;
var d = 4;
a * b = c + d;
    "#;
    let errs = match run(source).unwrap_err() {
        InterpretError::CompileErrors(e) => e,
        InterpretError::RuntimeError(e) => panic!("{e}"),
    };
    assert_eq!(errs.errors().len(), 1);
    assert_eq!(
        errs.errors()[0].to_string(),
        "[line 6] Error at '=': Invalid assignment target."
    );
}

#[test]
fn globals_survive_between_runs() {
    let mut out = Vec::new();
    let mut vm = VM::new(&mut out);
    vm.interpret("var count = 1;").unwrap();
    vm.interpret("count = count + 1;").unwrap();
    vm.interpret("print count;").unwrap();
    drop(vm);
    assert_eq!(String::from_utf8(out).unwrap(), "2\n");
}
