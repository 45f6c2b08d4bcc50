use lox::interpret;

#[test]
fn expression_statements_print_nothing() {
    let source = r#"
print "first";
"ignored";
1 + 2;
nil;
print "second";
    "#;
    let mut out = Vec::new();
    interpret(source, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "first\nsecond\n");
}

#[test]
fn empty_program() {
    let mut out = Vec::new();
    interpret("", &mut out).unwrap();
    interpret("// only a comment", &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn print_renders_every_kind_of_value() {
    let mut out = Vec::new();
    interpret("print nil;\nprint true;\nprint 2.5;\nprint \"s\";", &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "nil\ntrue\n2.5\ns\n");
}

#[test]
fn statements_after_an_error_are_still_checked() {
    let mut out = Vec::new();
    let err = interpret("print ;\nprint 1;\nprint );", &mut out).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("2 compilation errors"), "{message}");
    assert!(out.is_empty());
}
