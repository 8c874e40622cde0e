//! Tree‑walking evaluator.
//!
//! Statements execute for effect and report a [`Flow`]; expressions evaluate
//! to a [`Value`]. Variable accesses use the distances recorded by the
//! [`Resolver`](crate::resolver::Resolver) to jump straight to the declaring
//! scope; unresolved names are globals looked up by name.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, ExprKind, FunctionDecl, LiteralValue, Stmt};
use crate::callable::{standard_natives, Callable, LoxFunction};
use crate::class::{LoxClass, LoxInstance, INITIALIZER};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::{format_number, Value};

/// Outcome of executing a statement. `Return` short‑circuits the enclosing
/// blocks up to the nearest call boundary, where it is consumed.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<ExprId, usize>,
    output: Rc<RefCell<dyn Write>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter printing to stdout, with `clock` and `assert_equal`
    /// installed as globals.
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    /// Interpreter whose `print` statements write to `output`.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));

        for native in standard_natives() {
            debug!("Defining native function '{}'", native.name);

            globals
                .borrow_mut()
                .define(native.name, Value::Native(Rc::new(native)));
        }

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Host registration point: bind `name` in the global scope.
    pub fn define_global(&mut self, name: &str, value: Value) {
        info!("Defining global '{}'", name);

        self.globals.borrow_mut().define(name, value);
    }

    /// Record that the expression `id` refers to a binding `depth` scopes
    /// out from where it is evaluated. Called by the resolver.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        debug!("Expr {:?} resolved at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Execute a program. The first runtime error aborts the rest; the
    /// interpreter stays usable for the next call.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        info!("Interpreting {} statement(s)", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.output.borrow_mut(), "{}", value)?;
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let environment: EnvRef = Environment::child_of(&self.environment);

                return self.execute_block(statements, environment);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function: LoxFunction = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                return Ok(Flow::Return(value));
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods)?,
        }

        Ok(Flow::Normal)
    }

    /// Run `statements` inside `environment`, restoring the previous scope
    /// afterwards whether or not they succeed.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<Flow> {
        let previous: EnvRef = std::mem::replace(&mut self.environment, environment);

        let result: Result<Flow> = self.execute_sequence(statements);

        self.environment = previous;

        result
    }

    fn execute_sequence(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<()> {
        debug!("Defining class '{}'", name.lexeme);

        let superclass: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let token: &Token = match &expr.kind {
                        ExprKind::Variable(token) => token,
                        _ => name,
                    };

                    return Err(LoxError::runtime(token, "Superclass must be a class."));
                }
            },
            None => None,
        };

        // Bound first so methods can refer to the class by name.
        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        let method_env: EnvRef = match &superclass {
            Some(class) => {
                let env: EnvRef = Environment::child_of(&self.environment);
                env.borrow_mut()
                    .define("super", Value::Class(Rc::clone(class)));
                env
            }
            None => Rc::clone(&self.environment),
        };

        let table: HashMap<String, Rc<LoxFunction>> = methods
            .iter()
            .map(|method| {
                let function: LoxFunction = LoxFunction::new(
                    Rc::clone(method),
                    Rc::clone(&method_env),
                    method.name.lexeme == INITIALIZER,
                );

                (method.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class: LoxClass = LoxClass::new(name.lexeme.clone(), superclass, table);

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))?;

        info!("Class '{}' defined", name.lexeme);

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            ExprKind::Grouping(inner) => self.evaluate(inner),

            ExprKind::Unary { operator, right } => self.evaluate_unary(operator, right),

            ExprKind::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            ExprKind::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let short_circuit: bool = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            ExprKind::Assign { name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(&expr.id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            ExprKind::Variable(name) => self.look_up_variable(name, expr.id),

            ExprKind::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),

            ExprKind::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            ExprKind::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have properties."));
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            ExprKind::This(keyword) => self.look_up_variable(keyword, expr.id),

            ExprKind::Super { keyword, method } => self.evaluate_super(expr.id, keyword, method),

            ExprKind::Comma { left, right } => {
                self.evaluate(left)?;
                self.evaluate(right)
            }

            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },

            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),

            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left: Value = self.evaluate(left)?;
        let right: Value = self.evaluate(right)?;

        debug!(
            "Binary '{}' on {} and {}",
            operator.lexeme,
            left.type_name(),
            right.type_name()
        );

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                (Value::String(a), Value::Number(b)) => Ok(Value::String(a + &format_number(b))),
                (Value::Number(a), Value::String(b)) => {
                    Ok(Value::String(format_number(a) + &b))
                }
                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left.is_equal(&right))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!left.is_equal(&right))),

            _ => {
                let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
                    return Err(LoxError::runtime(operator, "Operands must be two numbers."));
                };

                let (a, b) = (*a, *b);

                match operator.token_type {
                    TokenType::MINUS => Ok(Value::Number(a - b)),
                    TokenType::STAR => Ok(Value::Number(a * b)),
                    TokenType::SLASH => Ok(Value::Number(a / b)),
                    TokenType::GREATER => Ok(Value::Bool(a > b)),
                    TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
                    TokenType::LESS => Ok(Value::Bool(a < b)),
                    TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
                    _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
                }
            }
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Value> {
        let callee: Value = self.evaluate(callee)?;

        let callable: &dyn Callable = match &callee {
            Value::Function(function) => &**function as &dyn Callable,
            Value::Native(native) => &**native,
            Value::Class(class) => class as &dyn Callable,
            _ => {
                return Err(LoxError::runtime(
                    paren,
                    "Can only call functions and classes.",
                ))
            }
        };

        let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }

        if values.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    values.len()
                ),
            ));
        }

        debug!("Calling {} with {} argument(s)", callable, values.len());

        callable.call(self, paren, values)
    }

    /// `super.method`: look the method up on the superclass captured where
    /// the class was declared, then bind it to the current `this`.
    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance: usize = self
            .locals
            .get(&id)
            .copied()
            .ok_or_else(|| LoxError::runtime(keyword, "Can't use 'super' here."))?;

        let Value::Class(superclass) = Environment::get_at(&self.environment, distance, keyword)?
        else {
            return Err(LoxError::runtime(keyword, "'super' is not bound to a class."));
        };

        // `this` lives one scope inside the one binding `super`.
        let this_distance: usize = distance
            .checked_sub(1)
            .ok_or_else(|| LoxError::runtime(keyword, "No 'this' scope below 'super'."))?;

        let Value::Instance(instance) = Environment::get_at(
            &self.environment,
            this_distance,
            &Token::synthetic("this", keyword.line),
        )?
        else {
            return Err(LoxError::runtime(keyword, "'this' is not bound to an instance."));
        };

        let function: Rc<LoxFunction> = superclass.find_method(&method.lexeme).ok_or_else(|| {
            LoxError::runtime(method, format!("Undefined property '{}'.", method.lexeme))
        })?;

        Ok(Value::Function(Rc::new(function.bind(instance))))
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}
