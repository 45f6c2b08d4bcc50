use lox::interpret;

#[test]
fn comparisons_1() {
    let source = "print nil == true;";
    let mut out = Vec::new();
    interpret(source, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    let expected = "false\n";
    assert_eq!(&out, expected);
}

#[test]
fn comparisons_2() {
    let source = "print !(5 - 4 > 3 * 2 == !nil);";
    let mut out = Vec::new();
    interpret(source, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    let expected = "true\n";
    assert_eq!(&out, expected);
}

#[test]
fn derived_operators() {
    let source = r#"
print 1 != 2;
print 2 >= 2;
print 3 <= 2;
print "a" != "a";"#;
    let mut out = Vec::new();
    interpret(source, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    let expected = "true\ntrue\nfalse\nfalse\n";
    assert_eq!(&out, expected);
}

#[test]
fn equality_across_types() {
    let source = "print 0 == false;\nprint nil == nil;\nprint \"1\" == 1;";
    let mut out = Vec::new();
    interpret(source, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    let expected = "false\ntrue\nfalse\n";
    assert_eq!(&out, expected);
}
