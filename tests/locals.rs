use lox::{interpret, InterpretError};

#[test]
fn locals_1() {
    let source = r#"
var a = "a";
print a;
{
    var b = "b";
    print b;
    {
        var a = "c";
        print a;
    }
}"#;
    let mut out = Vec::new();
    interpret(source, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    let expected = "a\nb\nc\n";
    assert_eq!(&out, expected);
}

#[test]
fn local_in_own_initializer() {
    let source = r#"
var a = "a";
{
    var a = a;
}"#;
    let mut out = Vec::new();
    let err = interpret(source, &mut out).unwrap_err();
    let errs = match err {
        InterpretError::CompileErrors(e) => e,
        InterpretError::RuntimeError(_) => panic!(),
    };
    assert_eq!(errs.errors().len(), 1);
    assert_eq!(
        errs.errors()[0].to_string(),
        "[line 4] Error at 'a': Cannot read local variable in its own initializer."
    );
}

#[test]
fn local_assignment() {
    let source = r#"
{
    var a = 1;
    var b = a = 2;
    print a;
    print b;
}"#;
    let mut out = Vec::new();
    interpret(source, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    let expected = "2\n2\n";
    assert_eq!(&out, expected);
}

#[test]
fn locals_leave_scope() {
    let source = r#"
var a = "global";
{
    var a = "outer";
    {
        var a = "inner";
        print a;
    }
    print a;
}
print a;"#;
    let mut out = Vec::new();
    interpret(source, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    let expected = "inner\nouter\nglobal\n";
    assert_eq!(&out, expected);
}
