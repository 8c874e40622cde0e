//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<String, bool>` tracking declared/defined).
//! 2. Report static errors: redeclaration, reading a local in its own
//!    initializer, `return` outside a function or with a value inside an
//!    initializer, `this` / `super` misuse, self‑inheritance.
//! 3. Tell the interpreter, for *each* variable occurrence, at which depth its
//!    binding lives. Occurrences found in no scope are globals and are looked
//!    up by name at run time.
//!
//! The pass fails fast: the first violation aborts it.

use crate::ast::{Expr, ExprId, ExprKind, FunctionDecl, Stmt};
use crate::class::INITIALIZER;
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;

/// What kind of function body are we in?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// What kind of class body are we in?  Used to validate `this` / `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances by calling back into the interpreter.
pub struct Resolver<'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'interp> Resolver<'interp> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// Walk all top‑level statements.
    pub fn resolve(&mut self, statements: &[Stmt]) -> Result<()> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.resolve_stmts(statements)
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) -> Result<()> {
        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                let result: Result<()> = self.resolve_stmts(statements);
                self.end_scope();
                result?;
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name)?;
                if let Some(expr) = initializer {
                    self.resolve_expr(expr)?;
                }
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // The name is visible inside its own body, allowing recursion.
                self.declare(&declaration.name)?;
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function)?;
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(then_branch)?;
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb)?;
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(body)?;
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(LoxError::resolve(
                        keyword,
                        "Can't return from top-level code.",
                    ));
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        return Err(LoxError::resolve(
                            keyword,
                            "Can't return a value from an initializer.",
                        ));
                    }

                    self.resolve_expr(expr)?;
                }
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods)?,
        }

        Ok(())
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<()> {
        debug!("Resolving class '{}'", name.lexeme);

        let enclosing_class: ClassType = self.current_class;
        self.current_class = ClassType::Class;

        let result: Result<()> = self.resolve_class_body(name, superclass, methods);

        self.current_class = enclosing_class;

        result
    }

    fn resolve_class_body(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<()> {
        self.declare(name)?;
        self.define(name);

        if let Some(superclass) = superclass {
            if let ExprKind::Variable(super_name) = &superclass.kind {
                if super_name.lexeme == name.lexeme {
                    return Err(LoxError::resolve(
                        super_name,
                        "A class can't inherit from itself.",
                    ));
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass)?;

            self.begin_scope();
            self.define_synthetic("super");
        }

        self.begin_scope();
        self.define_synthetic("this");

        let mut result: Result<()> = Ok(());

        for method in methods {
            let kind: FunctionType = if method.name.lexeme == INITIALIZER {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            result = self.resolve_function(method, kind);
            if result.is_err() {
                break;
            }
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Literal(_) => {}

            ExprKind::Grouping(inner) => {
                self.resolve_expr(inner)?;
            }

            ExprKind::Unary { right, .. } => {
                self.resolve_expr(right)?;
            }

            ExprKind::Binary { left, right, .. }
            | ExprKind::Logical { left, right, .. }
            | ExprKind::Comma { left, right } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)?;
            }

            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_expr(then_branch)?;
                self.resolve_expr(else_branch)?;
            }

            ExprKind::Variable(name) => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        return Err(LoxError::resolve(
                            name,
                            "Can't read local variable in its own initializer.",
                        ));
                    }
                }

                self.resolve_local(expr.id, name);
            }

            ExprKind::Assign { name, value } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value)?;
                self.resolve_local(expr.id, name);
            }

            ExprKind::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee)?;
                for arg in arguments {
                    self.resolve_expr(arg)?;
                }
            }

            ExprKind::Get { object, .. } => self.resolve_expr(object)?,

            ExprKind::Set { object, value, .. } => {
                self.resolve_expr(value)?;
                self.resolve_expr(object)?;
            }

            ExprKind::This(keyword) => {
                if self.current_class == ClassType::None {
                    return Err(LoxError::resolve(
                        keyword,
                        "Can't use 'this' outside of a class.",
                    ));
                }

                self.resolve_local(expr.id, keyword);
            }

            ExprKind::Super { keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        return Err(LoxError::resolve(
                            keyword,
                            "Can't use 'super' outside of a class.",
                        ));
                    }
                    ClassType::Class => {
                        return Err(LoxError::resolve(
                            keyword,
                            "Can't use 'super' in a class with no superclass.",
                        ));
                    }
                    ClassType::Subclass => {}
                }

                self.resolve_local(expr.id, keyword);
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Parameters and body share one fresh scope.
    fn resolve_function(&mut self, declaration: &FunctionDecl, kind: FunctionType) -> Result<()> {
        let enclosing: FunctionType = self.current_function;
        self.current_function = kind;

        self.begin_scope();

        let result: Result<()> = self.resolve_params_and_body(declaration);

        self.end_scope();
        self.current_function = enclosing;

        result
    }

    fn resolve_params_and_body(&mut self, declaration: &FunctionDecl) -> Result<()> {
        for param in &declaration.params {
            self.declare(param)?;
            self.define(param);
        }

        self.resolve_stmts(&declaration.body)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) -> Result<()> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                return Err(LoxError::resolve(
                    name,
                    "Already a variable with this name in this scope.",
                ));
            }
            scope.insert(name.lexeme.clone(), false);
        }
        Ok(())
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    /// Bind an implicit name (`this`, `super`) in the innermost scope.
    fn define_synthetic(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence's depth (0 = innermost) if any scope declares
    /// it; otherwise leave it unresolved, i.e. global.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.resolve(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}

/// Run one resolve pass over `statements`, recording into `interpreter`.
pub fn resolve(interpreter: &mut Interpreter, statements: &[Stmt]) -> Result<()> {
    Resolver::new(interpreter).resolve(statements)
}
