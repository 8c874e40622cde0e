use rox::error::LoxError;
use rox::interpreter::Interpreter;
use rox::parser::parse;
use rox::resolver::Resolver;
use rox::scanner::scan;

fn resolve_source(source: &str) -> Result<(), LoxError> {
    let output = scan(source);
    assert!(!output.has_errors(), "unexpected lexing errors: {:?}", output.errors);

    let statements = parse(&output.tokens).unwrap_or_else(|e| panic!("parse failed: {}", e));

    let mut interpreter = Interpreter::new();
    Resolver::new(&mut interpreter).resolve(&statements)
}

fn assert_resolve_error(source: &str, expected: &str) {
    match resolve_source(source) {
        Ok(()) => panic!("expected resolve error '{}' for:\n{}", expected, source),
        Err(e) => {
            assert!(e.is_syntax(), "resolver errors are syntax errors: {:?}", e);
            assert_eq!(e.to_string(), expected);
        }
    }
}

#[test]
fn well_formed_program_resolves() {
    let source = r#"
        var global = 1;
        fun outer() {
            var a = global;
            fun inner() { return a; }
            return inner;
        }
        class A {
            init(x) { this.x = x; return; }
            get() { return this.x; }
        }
        class B < A {
            get() { return super.get() + 1; }
        }
        { var shadow = global; { var shadow = "inner"; print shadow; } }
    "#;

    assert!(resolve_source(source).is_ok());
}

#[test]
fn redeclaration_in_local_scope() {
    assert_resolve_error(
        "fun bad() {\n  var a = \"first\";\n  var a = \"second\";\n}",
        "[line 3] Error at 'a': Already a variable with this name in this scope.",
    );
}

#[test]
fn global_redeclaration_is_allowed() {
    assert!(resolve_source("var a = 1; var a = 2;").is_ok());
}

#[test]
fn duplicate_parameter_names() {
    assert_resolve_error(
        "fun f(a, a) {}",
        "[line 1] Error at 'a': Already a variable with this name in this scope.",
    );
}

#[test]
fn local_read_in_own_initializer() {
    assert_resolve_error(
        "var a = \"outer\";\n{\n  var a = a;\n}",
        "[line 3] Error at 'a': Can't read local variable in its own initializer.",
    );
}

#[test]
fn return_at_top_level() {
    assert_resolve_error(
        "return \"at top level\";",
        "[line 1] Error at 'return': Can't return from top-level code.",
    );
}

#[test]
fn return_value_from_initializer() {
    assert_resolve_error(
        "class Foo {\n  init() {\n    return \"something else\";\n  }\n}",
        "[line 3] Error at 'return': Can't return a value from an initializer.",
    );
}

#[test]
fn bare_return_from_initializer_is_allowed() {
    assert!(resolve_source("class Foo { init() { return; } }").is_ok());
}

#[test]
fn this_outside_class() {
    assert_resolve_error(
        "print this;",
        "[line 1] Error at 'this': Can't use 'this' outside of a class.",
    );
    assert_resolve_error(
        "fun notMethod() {\n  print this;\n}",
        "[line 2] Error at 'this': Can't use 'this' outside of a class.",
    );
}

#[test]
fn super_outside_class() {
    assert_resolve_error(
        "super.notEvenInAClass();",
        "[line 1] Error at 'super': Can't use 'super' outside of a class.",
    );
}

#[test]
fn super_without_superclass() {
    assert_resolve_error(
        "class Base {\n  foo() {\n    super.doesNotExist();\n  }\n}",
        "[line 3] Error at 'super': Can't use 'super' in a class with no superclass.",
    );
}

#[test]
fn class_inheriting_from_itself() {
    assert_resolve_error(
        "class Foo < Foo {}",
        "[line 1] Error at 'Foo': A class can't inherit from itself.",
    );
}

#[test]
fn class_context_ends_with_class_body() {
    // `this` inside a function nested in a method is still inside the class.
    assert!(resolve_source(
        "class A { m() { fun helper() { return this; } return helper; } }"
    )
    .is_ok());

    assert_resolve_error(
        "class A { m() {} }\nprint this;",
        "[line 2] Error at 'this': Can't use 'this' outside of a class.",
    );
}
