//! Pipeline composition: scan → parse → resolve → interpret against one
//! long‑lived [`Interpreter`].
//!
//! A session is what the CLI driver runs a script or a REPL line through.
//! Globals and the resolver's distance map persist between calls, and the
//! session threads expression ids from one parse to the next so entries
//! recorded for earlier input are never overwritten.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{ExprId, Stmt};
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::{scan, ScanOutput};
use crate::token::Token;

pub struct Session {
    interpreter: Interpreter,
    next_id: ExprId,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::from_interpreter(Interpreter::new())
    }

    /// Session whose `print` output goes to `output`.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        Self::from_interpreter(Interpreter::with_output(output))
    }

    fn from_interpreter(interpreter: Interpreter) -> Self {
        info!("Session created");

        Self {
            interpreter,
            next_id: ExprId(0),
        }
    }

    /// Access to the interpreter, e.g. to register host globals.
    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Run one chunk of source.
    ///
    /// Lexing diagnostics abort before parsing; all of them are returned.
    /// Syntax errors are collected across the whole chunk; the resolver
    /// stops at its first error; a runtime error stops execution. In every
    /// case the returned vector is non-empty on `Err`.
    pub fn run(&mut self, source: &str) -> Result<(), Vec<LoxError>> {
        let ScanOutput { tokens, errors } = scan(source);

        if !errors.is_empty() {
            debug!("Scan produced {} error(s)", errors.len());
            return Err(errors);
        }

        let statements: Vec<Stmt> = self.parse_all(&tokens)?;

        Resolver::new(&mut self.interpreter)
            .resolve(&statements)
            .map_err(|e| vec![e])?;

        self.interpreter
            .interpret(&statements)
            .map_err(|e| vec![e])
    }

    fn parse_all(&mut self, tokens: &[Token]) -> Result<Vec<Stmt>, Vec<LoxError>> {
        let mut parser: Parser<'_> = Parser::with_first_id(tokens, self.next_id);

        let mut statements: Vec<Stmt> = Vec::new();
        let mut errors: Vec<LoxError> = Vec::new();

        for result in parser.by_ref() {
            match result {
                Ok(stmt) => statements.push(stmt),
                Err(e) => errors.push(e),
            }
        }

        self.next_id = parser.next_id();

        if errors.is_empty() {
            info!("Parsed {} statement(s)", statements.len());
            Ok(statements)
        } else {
            debug!("Parse produced {} error(s)", errors.len());
            Err(errors)
        }
    }
}
