//! Runtime name → value tables linked into a chain of enclosing scopes.
//!
//! Environments are shared (`Rc<RefCell<_>>`): a closure keeps the scope it
//! was declared in alive after the block that created it has exited, and
//! every holder sees the others' assignments.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;

/// Shared handle to an environment node.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// The global scope: no enclosing environment.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Convenience: allocate a child of `enclosing` behind a shared handle.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self::with_enclosing(Rc::clone(enclosing))))
    }

    /// Bind `name` in this scope, replacing any previous binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up here, then outward; failure at the global scope is an
    /// undefined-variable error.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Overwrite an existing binding, searching outward.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Walk `distance` hops up the chain starting at `env`.
    pub fn ancestor(env: &EnvRef, distance: usize, name: &Token) -> Result<EnvRef> {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next: Option<EnvRef> = current.borrow().enclosing.clone();

            current = next.ok_or_else(|| {
                LoxError::runtime(
                    name,
                    format!(
                        "No enclosing scope at distance {} for '{}'.",
                        distance, name.lexeme
                    ),
                )
            })?;
        }

        Ok(current)
    }

    /// Read `name` from exactly the scope `distance` hops up; no fallback.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        debug!("get_at '{}' distance {}", name.lexeme, distance);

        let scope: EnvRef = Self::ancestor(env, distance, name)?;
        let value: Option<Value> = scope.borrow().values.get(&name.lexeme).cloned();

        value.ok_or_else(|| {
            LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            )
        })
    }

    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        debug!("assign_at '{}' distance {}", name.lexeme, distance);

        let scope: EnvRef = Self::ancestor(env, distance, name)?;
        scope.borrow_mut().define(&name.lexeme, value);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Token {
        Token::synthetic(n, 1)
    }

    #[test]
    fn lookup_falls_back_to_enclosing() {
        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));
        globals.borrow_mut().define("a", Value::Number(1.0));

        let local: EnvRef = Environment::child_of(&globals);

        assert_eq!(local.borrow().get(&name("a")).unwrap(), Value::Number(1.0));
        assert!(local.borrow().get(&name("missing")).is_err());
    }

    #[test]
    fn assign_updates_declaring_scope() {
        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));
        globals.borrow_mut().define("a", Value::Number(1.0));

        let local: EnvRef = Environment::child_of(&globals);
        local
            .borrow_mut()
            .assign(&name("a"), Value::Number(2.0))
            .unwrap();

        assert_eq!(globals.borrow().get(&name("a")).unwrap(), Value::Number(2.0));
        assert!(local
            .borrow_mut()
            .assign(&name("b"), Value::Nil)
            .is_err());
    }

    #[test]
    fn get_at_skips_shadowing_bindings() {
        let outer: EnvRef = Rc::new(RefCell::new(Environment::new()));
        outer.borrow_mut().define("x", Value::String("outer".into()));

        let inner: EnvRef = Environment::child_of(&outer);
        inner.borrow_mut().define("x", Value::String("inner".into()));

        assert_eq!(
            Environment::get_at(&inner, 1, &name("x")).unwrap(),
            Value::String("outer".into())
        );

        Environment::assign_at(&inner, 0, &name("x"), Value::Bool(true)).unwrap();
        assert_eq!(inner.borrow().get(&name("x")).unwrap(), Value::Bool(true));
        assert_eq!(
            outer.borrow().get(&name("x")).unwrap(),
            Value::String("outer".into())
        );
    }

    #[test]
    fn ancestor_past_global_is_an_error() {
        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));

        assert!(Environment::get_at(&globals, 2, &name("x")).is_err());
    }
}
