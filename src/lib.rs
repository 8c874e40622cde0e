//! A tree‑walking interpreter for the Lox language.
//!
//! The pipeline is [`scanner`] → [`parser`] → [`resolver`] → [`interpreter`];
//! [`session::Session`] strings the stages together.

pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod token;
pub mod value;

pub use callable::Callable;
pub use error::{LoxError, Result};
pub use interpreter::Interpreter;
pub use parser::parse;
pub use resolver::resolve;
pub use scanner::scan;
pub use session::Session;
pub use value::Value;
