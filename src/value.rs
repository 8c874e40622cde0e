use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::callable::{Callable, LoxFunction};
use crate::class::{LoxClass, LoxInstance};

/// Every runtime value a Lox program can produce.
///
/// Reference-like values (functions, classes, instances) are shared through
/// `Rc`; copying a `Value` never deep-copies them.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,

    /// User-defined function or bound method.
    Function(Rc<LoxFunction>),

    /// Host-provided callable.
    Native(Rc<dyn Callable>),

    Class(Rc<LoxClass>),

    Instance(Rc<RefCell<LoxInstance>>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else, including `0` and `""`,
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Lox `==`: value equality for primitives, identity for everything
    /// shared. Never fails, whatever the operand types.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Short type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Nil => "nil",
            Value::Function(_) | Value::Native(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

/// Text form of a number: integral values drop the fraction (`4`, `-1`),
/// everything else uses the shortest round-trip form (`0.5`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf: itoa::Buffer = itoa::Buffer::new();
        let digits: &str = buf.format(n as i64);

        if n == 0.0 && n.is_sign_negative() {
            format!("-{}", digits)
        } else {
            digits.to_string()
        }
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::Function(function) => write!(f, "{}", function),

            Value::Native(native) => write!(f, "{}", native),

            Value::Class(class) => write!(f, "{}", class),

            Value::Instance(instance) => write!(f, "{}", instance.borrow()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_without_trailing_zero() {
        assert_eq!(Value::Number(4.0).to_string(), "4");
        assert_eq!(Value::Number(-1.0).to_string(), "-1");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::Number(2.25).to_string(), "2.25");
    }

    #[test]
    fn truthiness_only_rejects_nil_and_false() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn equality_never_crosses_types() {
        assert!(Value::Nil.is_equal(&Value::Nil));
        assert!(!Value::Nil.is_equal(&Value::Bool(false)));
        assert!(!Value::Number(1.0).is_equal(&Value::String("1".into())));
        assert!(Value::String("a".into()).is_equal(&Value::String("a".into())));
    }
}
