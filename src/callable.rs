//! The callable capability and its function-shaped implementations: user
//! closures and host natives. Classes implement it in [`crate::class`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::ast::FunctionDecl;
use crate::class::LoxInstance;
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Anything invocable with `(...)`.
///
/// `paren` is the call site's closing parenthesis, used to locate errors the
/// callee raises. The interpreter checks `arguments.len() == arity()` before
/// calling.
pub trait Callable: fmt::Debug + fmt::Display {
    fn arity(&self) -> usize;

    fn call(&self, interpreter: &mut Interpreter, paren: &Token, arguments: Vec<Value>)
        -> Result<Value>;
}

// ─────────────────────────────────────────────────────────────────────────────
// User-defined functions
// ─────────────────────────────────────────────────────────────────────────────

/// A closure: declaration plus the environment in effect where it was
/// declared.
#[derive(Clone)]
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.declaration.name.lexeme)
            .field("arity", &self.declaration.params.len())
            .field("closure", &self.closure.as_ptr())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// A copy of this method whose scope additionally binds `this`.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        debug!("Binding method '{}'", self.name());

        let environment: EnvRef = Environment::child_of(&self.closure);
        environment
            .borrow_mut()
            .define("this", Value::Instance(instance));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        // Parented at the captured scope, not the caller's.
        let environment: EnvRef = Environment::child_of(&self.closure);

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(&param.lexeme, argument);
        }

        let flow: Flow = interpreter.execute_block(&self.declaration.body, environment)?;

        if self.is_initializer {
            return Environment::get_at(&self.closure, 0, &Token::synthetic("this", paren.line));
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Native functions
// ─────────────────────────────────────────────────────────────────────────────

/// Signature of a host function body. An `Err` message becomes a runtime
/// error located at the call site.
pub type NativeFn = fn(&[Value]) -> std::result::Result<Value, String>;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl NativeFunction {
    pub const fn new(name: &'static str, arity: usize, func: NativeFn) -> Self {
        Self { name, arity, func }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        _interpreter: &mut Interpreter,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!("Calling native function '{}'", self.name);

        let result: Value =
            (self.func)(&arguments).map_err(|message| LoxError::runtime(paren, message))?;

        info!("Native function '{}' returned: {}", self.name, result);

        Ok(result)
    }
}

/// `clock()`: seconds since the Unix epoch.
fn clock(_args: &[Value]) -> std::result::Result<Value, String> {
    let millis: i64 = Utc::now().timestamp_millis();

    Ok(Value::Number(millis as f64 / 1000.0))
}

/// `assert_equal(actual, expected)`: errors on mismatch.
fn assert_equal(args: &[Value]) -> std::result::Result<Value, String> {
    match args {
        [actual, expected] if actual.is_equal(expected) => Ok(Value::Nil),
        [actual, expected] => Err(format!(
            "Assertion failed: expected {}, got {}.",
            expected, actual
        )),
        _ => Err(format!("Expected 2 arguments but got {}.", args.len())),
    }
}

/// The natives every interpreter starts with.
pub fn standard_natives() -> [NativeFunction; 2] {
    [
        NativeFunction::new("clock", 0, clock),
        NativeFunction::new("assert_equal", 2, assert_equal),
    ]
}
