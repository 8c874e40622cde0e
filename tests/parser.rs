use std::collections::HashSet;

use rox::ast::{Expr, ExprId, ExprKind, LiteralValue, Stmt};
use rox::ast_printer::AstPrinter;
use rox::error::LoxError;
use rox::parser::Parser;
use rox::scanner::scan;
use rox::token::{Token, TokenType};

fn tokens_of(source: &str) -> Vec<Token> {
    let output = scan(source);
    assert!(!output.has_errors(), "unexpected lexing errors: {:?}", output.errors);
    output.tokens
}

fn parse_ok(source: &str) -> Vec<Stmt> {
    let tokens = tokens_of(source);
    Parser::new(&tokens)
        .parse()
        .unwrap_or_else(|e| panic!("parse failed: {}", e))
}

fn parse_err(source: &str) -> LoxError {
    let tokens = tokens_of(source);
    match Parser::new(&tokens).parse() {
        Ok(statements) => panic!("expected a syntax error, got {:?}", statements),
        Err(e) => e,
    }
}

fn print_expr(source: &str) -> String {
    let tokens = tokens_of(source);
    let expr: Expr = Parser::new(&tokens)
        .parse_expression()
        .unwrap_or_else(|e| panic!("parse failed: {}", e));
    AstPrinter::print(&expr)
}

#[test]
fn var_with_unary_and_division() {
    let statements = parse_ok("var x = -1 / 0.5;");
    assert_eq!(statements.len(), 1);

    let Stmt::Var {
        name,
        initializer: Some(init),
    } = &statements[0]
    else {
        panic!("expected a var declaration, got {:?}", statements[0]);
    };
    assert_eq!(name.lexeme, "x");

    let ExprKind::Binary {
        left,
        operator,
        right,
    } = &init.kind
    else {
        panic!("expected a binary initializer, got {:?}", init);
    };
    assert_eq!(operator.token_type, TokenType::SLASH);
    assert!(matches!(
        &left.kind,
        ExprKind::Unary { operator, right }
            if operator.token_type == TokenType::MINUS
                && right.kind == ExprKind::Literal(LiteralValue::Number(1.0))
    ));
    assert_eq!(right.kind, ExprKind::Literal(LiteralValue::Number(0.5)));
}

#[test]
fn precedence_and_associativity() {
    assert_eq!(print_expr("1 - 2 - 3"), "(- (- 1.0 2.0) 3.0)");
    assert_eq!(print_expr("1 + 2 * 3 == 7"), "(== (+ 1.0 (* 2.0 3.0)) 7.0)");
    assert_eq!(print_expr("!!true"), "(! (! true))");
    assert_eq!(print_expr("a or b and c"), "(or a (and b c))");
    assert_eq!(print_expr("a = b = 3"), "(= a (= b 3.0))");
}

#[test]
fn ternary_is_right_associative_and_comma_is_lowest() {
    assert_eq!(print_expr("a ? b : c ? d : e"), "(?: a b (?: c d e))");
    assert_eq!(print_expr("1, 2 ? 3 : 4"), "(, 1.0 (?: 2.0 3.0 4.0))");
    assert_eq!(print_expr("a, b = c"), "(, a (= b c))");
    assert_eq!(print_expr("f(1, 2)"), "(call f 1.0 2.0)");
    assert_eq!(print_expr("f(a ? 1 : 2, b = 3)"), "(call f (?: a 1.0 2.0) (= b 3.0))");
}

#[test]
fn assignment_takes_a_whole_ternary() {
    assert_eq!(print_expr("y = flag ? 1 : 2"), "(= y (?: flag 1.0 2.0))");
    assert_eq!(print_expr("a.b = c ? d : e"), "(= (. a b) (?: c d e))");
    assert_eq!(
        print_expr("c ? x = 1 : y = 2"),
        "(?: c (= x 1.0) (= y 2.0))"
    );
    assert_eq!(print_expr("a or b ? c : d"), "(?: (or a b) c d)");

    let e = parse_err("(a ? b : c) = d;");
    assert_eq!(e.message(), "Invalid assignment target.");
}

#[test]
fn calls_and_property_access_chain() {
    assert_eq!(print_expr("a.b(1)(2).c"), "(. (call (call (. a b) 1.0) 2.0) c)");
    assert_eq!(print_expr("a.b = 3"), "(= (. a b) 3.0)");
}

#[test]
fn for_loop_desugars_into_while() {
    let statements = parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");
    assert_eq!(statements.len(), 1);

    let printed = AstPrinter::print_stmt(&statements[0]);
    assert_eq!(
        printed,
        "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
    );
}

#[test]
fn empty_for_clauses_loop_on_true() {
    let statements = parse_ok("for (;;) {}");
    assert_eq!(
        AstPrinter::print_stmt(&statements[0]),
        "(while true (block))"
    );
}

#[test]
fn class_declaration_with_superclass() {
    let statements = parse_ok("class B < A { init(x) { this.x = x; } get() { return super.get(); } }");

    let Stmt::Class {
        name,
        superclass: Some(superclass),
        methods,
    } = &statements[0]
    else {
        panic!("expected a subclass declaration");
    };

    assert_eq!(name.lexeme, "B");
    assert!(matches!(&superclass.kind, ExprKind::Variable(t) if t.lexeme == "A"));
    assert_eq!(methods.len(), 2);
    assert_eq!(methods[0].params.len(), 1);
}

#[test]
fn expression_ids_are_unique() {
    let tokens = tokens_of("a + a * a;");
    let mut parser = Parser::new(&tokens);
    let statements = parser.parse().unwrap();

    let Stmt::Expression(expr) = &statements[0] else {
        panic!("expected expression statement");
    };
    let ExprKind::Binary { left, right, .. } = &expr.kind else {
        panic!("expected binary");
    };
    let ExprKind::Binary {
        left: inner_left,
        right: inner_right,
        ..
    } = &right.kind
    else {
        panic!("expected nested binary");
    };

    let ids: HashSet<ExprId> = [expr.id, left.id, right.id, inner_left.id, inner_right.id]
        .into_iter()
        .collect();
    assert_eq!(ids.len(), 5);

    // A follow-up parser can continue where this one stopped.
    let more = tokens_of("a;");
    let mut next = Parser::with_first_id(&more, parser.next_id());
    let later_statements = next.parse().unwrap();
    let Stmt::Expression(later) = &later_statements[0] else {
        panic!("expected expression statement");
    };
    assert!(later.id.0 >= parser.next_id().0);
}

#[test]
fn invalid_assignment_target() {
    let e = parse_err("a + b = c;");
    assert_eq!(e.to_string(), "[line 1] Error at '=': Invalid assignment target.");
}

#[test]
fn missing_expression_reports_location() {
    let e = parse_err("print (1 + );");
    assert_eq!(e.to_string(), "[line 1] Error at ')': Expect expression.");

    let e = parse_err("print 1");
    assert_eq!(e.to_string(), "[line 1] Error at end: Expect ';' after value.");
}

#[test]
fn too_many_parameters() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));

    let e = parse_err(&source);
    assert_eq!(e.message(), "Can't have more than 255 parameters.");
    assert!(e.is_syntax());
}

#[test]
fn iterator_mode_reports_every_error() {
    let tokens = tokens_of("var 1;\nprint 2;\nprint ;\nvar ok = 3;");
    let results: Vec<_> = Parser::new(&tokens).collect();

    let errors: Vec<String> = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .map(|e| e.to_string())
        .collect();
    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '1': Expect variable name.".to_string(),
            "[line 3] Error at ';': Expect expression.".to_string(),
        ]
    );

    let good = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(good, 2);
}

#[test]
fn parse_expression_rejects_trailing_tokens() {
    let tokens = tokens_of("1 2");
    let e = Parser::new(&tokens).parse_expression().unwrap_err();
    assert_eq!(e.message(), "Expect end of expression.");
}

#[test]
fn token_slice_without_eof_ends_the_input() {
    assert!(Parser::new(&[]).parse().unwrap().is_empty());

    let e = Parser::new(&[]).parse_expression().unwrap_err();
    assert_eq!(e.to_string(), "[line 1] Error at end: Expect expression.");

    let mut tokens = tokens_of("print 1;");
    tokens.pop();
    let statements = Parser::new(&tokens).parse().unwrap();
    assert_eq!(AstPrinter::print_stmt(&statements[0]), "(print 1.0)");

    tokens.pop();
    let e = Parser::new(&tokens).parse().unwrap_err();
    assert_eq!(e.message(), "Expect ';' after value.");
}
