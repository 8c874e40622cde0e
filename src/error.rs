//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! Every pipeline stage (scanner, parser, resolver, runtime) converts its
//! failure modes into one of the variants defined here, so the whole crate
//! shares a single `Result<T>` alias. Errors are plain values: nothing in
//! the core prints them or keeps a "had error" flag. The caller decides
//! presentation and exit behaviour.
//!
//! Three families, non-overlapping:
//!
//! * **Lexing** diagnostics ([`LoxError::Lex`]) are collected by the scanner.
//! * **Syntax** errors come from the parser ([`LoxError::Parse`]) or the
//!   resolver ([`LoxError::Resolve`]) and carry the offending token's
//!   location.
//! * **Runtime** errors ([`LoxError::Runtime`]) unwind the current
//!   `interpret` call.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        /// `" at end"` or `" at 'lexeme'"`.
        location: String,
    },

    /// Static‑semantics violation found by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error, located at the operator / identifier token.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent). Enables `?` on I/O ops,
    /// e.g. a failing `print` sink.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }

    /// Parser and resolver errors are both syntax-class diagnostics.
    pub fn is_syntax(&self) -> bool {
        matches!(self, LoxError::Parse { .. } | LoxError::Resolve { .. })
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, LoxError::Runtime { .. })
    }

    /// Source line the error points at, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Lex { line, .. }
            | LoxError::Parse { line, .. }
            | LoxError::Resolve { line, .. }
            | LoxError::Runtime { line, .. } => Some(*line),
            LoxError::Io(_) => None,
        }
    }

    /// The bare message without location decoration.
    pub fn message(&self) -> String {
        match self {
            LoxError::Lex { message, .. }
            | LoxError::Parse { message, .. }
            | LoxError::Resolve { message, .. }
            | LoxError::Runtime { message, .. } => message.clone(),
            LoxError::Io(e) => e.to_string(),
        }
    }
}

fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_reports_lexeme_or_end() {
        let plus = Token::new(TokenType::PLUS, "+", 3);
        let eof = Token::new(TokenType::EOF, "", 7);

        assert_eq!(
            LoxError::parse(&plus, "Expect expression.").to_string(),
            "[line 3] Error at '+': Expect expression."
        );
        assert_eq!(
            LoxError::resolve(&eof, "Expect '}' after block.").to_string(),
            "[line 7] Error at end: Expect '}' after block."
        );
    }

    #[test]
    fn kinds_are_distinguishable() {
        let name = Token::new(TokenType::IDENTIFIER, "x", 2);

        assert!(LoxError::parse(&name, "m").is_syntax());
        assert!(LoxError::resolve(&name, "m").is_syntax());
        assert!(!LoxError::lex(2, "m").is_syntax());
        assert!(LoxError::runtime(&name, "m").is_runtime());
        assert_eq!(LoxError::runtime(&name, "m").to_string(), "m\n[line 2]");
    }
}
