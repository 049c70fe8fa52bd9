//! Fend: a tree‑walking interpreter for a small class‑based scripting language.
//!
//! The pipeline is scanner → parser → resolver → interpreter. [`Session`]
//! threads the state that must survive between runs (global frame, scope
//! distances, expression id allocator) so a REPL can feed it line by line.

pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use std::io::Write;

use log::{debug, info};

use crate::ast::{ExprIds, Stmt};
use crate::error::FendError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::value::Value;

/// Diagnostics produced by one [`Session::run`].
#[derive(Debug, Default)]
pub struct Report {
    /// Lexical, syntax and resolution errors, in the order found.
    pub errors: Vec<FendError>,

    /// The runtime error that stopped execution, if any.
    pub runtime_error: Option<FendError>,
}

impl Report {
    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.runtime_error.is_some()
    }
}

/// One interpreter instance plus everything that must persist across runs.
pub struct Session {
    interpreter: Interpreter,
    ids: ExprIds,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session printing to stdout.
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    /// A session whose `print` output goes to `output`.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self::with_interpreter(Interpreter::with_output(output))
    }

    fn with_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            ids: ExprIds::new(),
        }
    }

    /// Scan and parse `source` without running it.
    pub fn parse(&mut self, source: &str) -> Result<Vec<Stmt>, Vec<FendError>> {
        let (tokens, mut errors) = scanner::scan(source);

        match Parser::new(&tokens, &mut self.ids).parse() {
            Ok(statements) if errors.is_empty() => Ok(statements),
            Ok(_) => Err(errors),
            Err(parse_errors) => {
                errors.extend(parse_errors);
                Err(errors)
            }
        }
    }

    /// Run `source` through every stage. Resolution only happens when
    /// scanning and parsing were clean, and execution only when resolution
    /// was clean too.
    pub fn run(&mut self, source: &str) -> Report {
        info!("Running {} byte(s) of source", source.len());

        let statements = match self.parse(source) {
            Ok(statements) => statements,
            Err(errors) => {
                return Report {
                    errors,
                    runtime_error: None,
                }
            }
        };

        debug!("Parsed {} top-level statement(s)", statements.len());

        match Resolver::new().resolve(&statements) {
            Ok(resolutions) => self.interpreter.resolve(resolutions),
            Err(errors) => {
                return Report {
                    errors,
                    runtime_error: None,
                }
            }
        }

        let runtime_error = self.interpreter.interpret(&statements).err();

        Report {
            errors: Vec::new(),
            runtime_error,
        }
    }

    /// Bindings of the global frame, sorted by name.
    pub fn globals(&self) -> Vec<(String, Value)> {
        self.interpreter.globals()
    }
}
