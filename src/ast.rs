//! Abstract syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Expressions and statements are closed sum types; every pass (resolver,
//! interpreter, printer) matches on them exhaustively.
//!
//! Each expression node carries an [`ExprId`] handed out by the parser. The
//! resolver's distance map is keyed by that id rather than by node value, so
//! two structurally identical expressions at different source positions
//! resolve independently.

use std::rc::Rc;

use crate::token::Token;

/// Stable identity of an expression node, unique within one parser run (and
/// across runs when the caller threads [`Parser::next_id`] through).
///
/// [`Parser::next_id`]: crate::parser::Parser::next_id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub usize);

/// A **literal constant** that appears directly in the source code.
///
/// These are the terminal leaves of the expression tree. The parser copies
/// the decoded value out of the token so the AST does not depend on it.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// An expression node: identity plus shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix unary operator expression: `!isReady` or `-42`.
    Unary { operator: Token, right: Box<Expr> },

    /// Infix arithmetic / comparison / equality expression.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// `identifier = value`
    Assign { name: Token, value: Box<Expr> },

    /// Variable access.
    Variable(Token),

    /// Function, method or constructor call.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token, retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// `object.name`
    Get { object: Box<Expr>, name: Token },

    /// `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This(Token),

    /// `super.method`
    Super { keyword: Token, method: Token },

    /// `left, right`: evaluates both, yields `right`.
    Comma { left: Box<Expr>, right: Box<Expr> },

    /// `condition ? then_branch : else_branch`
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

impl Expr {
    pub fn new(id: ExprId, kind: ExprKind) -> Self {
        Self { id, kind }
    }
}

/// A function or method declaration. Shared (`Rc`) between the statement
/// tree and every closure created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*. A program is a sequence of
/// these nodes returned by [`Parser::parse`](crate::parser::Parser::parse).
///
/// `for` loops have no node of their own: the parser desugars them into
/// `Block` + `While`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement, the only output channel.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// Function declaration; becomes a closure value when executed.
    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword token, for error locations.
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    Class {
        name: Token,
        /// Always an `ExprKind::Variable` when present.
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
