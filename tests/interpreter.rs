use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rox::callable::Callable;
use rox::error::LoxError;
use rox::interpreter::Interpreter;
use rox::parser::parse;
use rox::resolver::resolve;
use rox::scanner::scan;
use rox::token::Token;
use rox::value::Value;
use rox::Session;

fn run_capturing(source: &str) -> (String, Result<(), Vec<LoxError>>) {
    let output: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut session = Session::with_output(output.clone());
    let result = session.run(source);
    let printed = String::from_utf8(output.take()).expect("Output should be valid UTF-8");
    (printed, result)
}

fn test_valid_program(source: &str, expected_output: &str) {
    let (printed, result) = run_capturing(source);
    if let Err(errors) = result {
        panic!("program failed: {:?}\noutput so far:\n{}", errors, printed);
    }
    assert_eq!(printed, expected_output);
}

fn test_runtime_error(source: &str, expected_output: &str, expected_error: &str) {
    let (printed, result) = run_capturing(source);
    let errors = result.expect_err("program should fail at run time");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_runtime(), "not a runtime error: {:?}", errors[0]);
    assert_eq!(errors[0].to_string(), expected_error);
    assert_eq!(printed, expected_output);
}

#[test]
fn test_pipeline_stages_compose() {
    let tokens = scan("var a = 1; { var b = a + 2; print b; }").tokens;
    let program = parse(&tokens).expect("Parse should work on valid program");

    let output: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut interpreter = Interpreter::with_output(output.clone());
    resolve(&mut interpreter, &program).expect("Resolve should work on valid program");
    interpreter
        .interpret(&program)
        .expect("Interpret should work on valid program");

    assert_eq!(String::from_utf8(output.take()).unwrap(), "3\n");
}

#[test]
fn test_fib() {
    let source = r#"
    fun fib(n) {
        if (n <= 1) return n;
        return fib(n - 1) + fib(n - 2);
    }

    for (var i = 0; i < 10; i = i + 1) {
        print fib(i);
    }
    "#;
    test_valid_program(source, "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
}

#[test]
fn test_counter_closure() {
    let source = r#"
    fun makeCounter() {
        var i = 0;
        fun count() {
            i = i + 1;
            return i;
        }
        return count;
    }

    var first = makeCounter();
    var second = makeCounter();
    print first();
    print first();
    print second();
    "#;
    test_valid_program(source, "1\n2\n1\n");
}

#[test]
fn test_closures_bind_at_declaration() {
    let source = r#"
    var a = "global";
    {
        fun showA() {
            print a;
        }

        showA();
        var a = "block";
        showA();
        print a;
    }
    "#;
    test_valid_program(source, "global\nglobal\nblock\n");
}

#[test]
fn test_block_scoping_and_shadowing() {
    let source = r#"
    var a = "global a";
    var b = "global b";
    {
        var a = "outer a";
        {
            var a = "inner a";
            print a;
            print b;
        }
        print a;
    }
    print a;
    "#;
    test_valid_program(source, "inner a\nglobal b\nouter a\nglobal a\n");
}

#[test]
fn test_control_flow() {
    let source = r#"
    var i = 0;
    while (i < 3) { print i; i = i + 1; }
    if (nil) print "no"; else print "else";
    if (0) print "zero is truthy";
    print nil or "fallback";
    print false and unreachable;
    "#;
    test_valid_program(source, "0\n1\n2\nelse\nzero is truthy\nfallback\nfalse\n");
}

#[test]
fn test_ternary_and_comma() {
    let source = r#"
    var x = 5;
    print x > 3 ? 7 : 11;
    print x < 3 ? 7 : 11;
    print (1, 2, 3);
    "#;
    test_valid_program(source, "7\n11\n3\n");
}

#[test]
fn test_ternary_values() {
    let source = r#"
    print 5 < 10 ? 7 : "b";
    var x = 7;
    print x == "c" ? 0 : x + 4;
    "#;
    test_valid_program(source, "7\n11\n");
}

#[test]
fn test_assignment_of_ternary_matches_initializer() {
    let source = r#"
    var flag = true;
    var x = flag ? 1 : 2;
    print x;
    var y;
    y = flag ? 1 : 2;
    print y;
    flag ? x = "then" : y = "else";
    print x;
    print y;
    "#;
    test_valid_program(source, "1\n1\nthen\n1\n");
}

#[test]
fn test_super_keeps_subclass_this() {
    let source = r#"
    class Animal {
        describe() { return "I am " + this.kind(); }
        kind() { return "an animal"; }
    }

    class Dog < Animal {
        kind() { return "a dog"; }
        describe() { return super.describe() + "!"; }
    }

    class Puppy < Dog {
        kind() { return "a puppy"; }
    }

    print Puppy().describe();
    "#;
    test_valid_program(source, "I am a puppy!\n");
}

#[test]
fn test_too_many_arguments() {
    test_runtime_error(
        "fun pair(a, b) { return a + b; }\nprint pair(1, 2, 3);",
        "",
        "Expected 2 arguments but got 3.\n[line 2]",
    );
}

#[test]
fn test_arithmetic_and_formatting() {
    let source = r#"
    print 1 + 2 * 3;
    print 10 / 4;
    print -(1 - 3);
    print 1 / 0;
    print "con" + "cat";
    print "hello " + 5;
    print 4 + " hello";
    print 1 == 1.0;
    print "a" == "a";
    print nil == false;
    print 3 != 4;
    "#;
    test_valid_program(
        source,
        "7\n2.5\n2\ninf\nconcat\nhello 5\n4 hello\ntrue\ntrue\nfalse\ntrue\n",
    );
}

#[test]
fn test_callable_values_print() {
    let source = r#"
    fun f() {}
    class K { m() {} }
    print f;
    print clock;
    print K;
    print K();
    print K().m;
    print f();
    "#;
    test_valid_program(
        source,
        "<fn f>\n<native fn clock>\nK\nK instance\n<fn m>\nnil\n",
    );
}

#[test]
fn test_class_fields_methods_and_init() {
    let source = r#"
    class Point {
        init(x, y) {
            this.x = x;
            this.y = y;
        }

        sum() {
            return this.x + this.y;
        }
    }

    var p = Point(1, 2);
    print p.sum();
    p.x = 10;
    print p.sum();

    var m = p.sum;
    print m();

    print p.init(3, 4) == p;
    print p.x;
    "#;
    test_valid_program(source, "3\n12\n12\ntrue\n3\n");
}

#[test]
fn test_initializer_early_return_yields_instance() {
    let source = r#"
    class A {
        init() {
            this.v = 1;
            return;
            this.v = 2;
        }
    }
    print A().v;
    print A();

    var a = A();
    print a.init() == a;
    "#;
    test_valid_program(source, "1\nA instance\ntrue\n");
}

#[test]
fn test_fields_shadow_methods() {
    let source = r#"
    class A { greet() { return "method"; } }
    var a = A();
    print a.greet();
    fun other() { return "field"; }
    a.greet = other;
    print a.greet();
    "#;
    test_valid_program(source, "method\nfield\n");
}

#[test]
fn test_inheritance_and_super() {
    let source = r#"
    class A {
        method() { print "A method"; }
        who() { return this.name; }
    }

    class B < A {
        init(name) { this.name = name; }
        method() { print "B method"; }
        test() {
            super.method();
            print super.who();
        }
    }

    class C < B {}

    var c = C("sea");
    c.method();
    c.test();
    "#;
    test_valid_program(source, "B method\nA method\nsea\n");
}

#[test]
fn test_return_from_nested_blocks() {
    let source = r#"
    fun first_over(limit) {
        var i = 0;
        while (true) {
            {
                if (i > limit) return i;
            }
            i = i + 1;
        }
    }
    print first_over(4);
    "#;
    test_valid_program(source, "5\n");
}

#[test]
fn test_assert_equal_native() {
    test_valid_program("assert_equal(1 + 1, 2); print \"ok\";", "ok\n");

    test_runtime_error(
        "print \"before\";\nassert_equal(1, 2);\nprint \"after\";",
        "before\n",
        "Assertion failed: expected 2, got 1.\n[line 2]",
    );
}

#[test]
fn test_runtime_error_messages() {
    test_runtime_error("print -\"x\";", "", "Operand must be a number.\n[line 1]");
    test_runtime_error("print 1 < \"2\";", "", "Operands must be two numbers.\n[line 1]");
    test_runtime_error(
        "print true + 1;",
        "",
        "Operands must be two numbers or two strings.\n[line 1]",
    );
    test_runtime_error("print nope;", "", "Undefined variable 'nope'.\n[line 1]");
    test_runtime_error("nope = 1;", "", "Undefined variable 'nope'.\n[line 1]");
    test_runtime_error(
        "\"str\"();",
        "",
        "Can only call functions and classes.\n[line 1]",
    );
    test_runtime_error(
        "fun f(a, b) {}\nf(1);",
        "",
        "Expected 2 arguments but got 1.\n[line 2]",
    );
    test_runtime_error(
        "class A {}\nA(1);",
        "",
        "Expected 0 arguments but got 1.\n[line 2]",
    );
    test_runtime_error("print 4.x;", "", "Only instances have properties.\n[line 1]");
    test_runtime_error(
        "class A {}\nprint A().missing;",
        "",
        "Undefined property 'missing'.\n[line 2]",
    );
    test_runtime_error(
        "var NotAClass = 1;\nclass B < NotAClass {}",
        "",
        "Superclass must be a class.\n[line 2]",
    );
}

#[test]
fn test_runtime_error_keeps_earlier_output() {
    test_runtime_error(
        "print 1;\nprint -nil;\nprint 2;",
        "1\n",
        "Operand must be a number.\n[line 2]",
    );
}

#[test]
fn test_static_errors_prevent_execution() {
    let (printed, result) = run_capturing("print \"never\";\nreturn 1;");
    let errors = result.expect_err("resolver should reject top-level return");

    assert!(printed.is_empty());
    assert!(errors[0].is_syntax());
}

#[derive(Debug)]
struct Double;

impl fmt::Display for Double {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn double>")
    }
}

impl Callable for Double {
    fn arity(&self) -> usize {
        1
    }

    fn call(
        &self,
        _interpreter: &mut Interpreter,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> rox::Result<Value> {
        match arguments.first() {
            Some(Value::Number(n)) => Ok(Value::Number(n * 2.0)),
            _ => Err(LoxError::runtime(paren, "double expects a number.")),
        }
    }
}

#[test]
fn test_host_defined_global() {
    let output: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut session = Session::with_output(output.clone());
    session
        .interpreter_mut()
        .define_global("double", Value::Native(Rc::new(Double)));

    session.run("print double(21);").expect("host native should run");
    let errors = session.run("double(\"x\");").unwrap_err();

    assert_eq!(String::from_utf8(output.take()).unwrap(), "42\n");
    assert_eq!(errors[0].message(), "double expects a number.");
}
