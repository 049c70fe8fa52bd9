//! Centralised error hierarchy for the **Fend interpreter**.
//!
//! Every stage (scanner, parser, resolver, runtime, CLI) converts its failure
//! modes into one of the variants defined here, so the whole crate shares one
//! `Result<T>` alias and interoperates with `anyhow` at the binary edge.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FendError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error. `location` is either `at 'lexeme'` or `at end`.
    #[error("[line {line}] Error {location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("[line {line}] Error {location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error, carrying the offending token's lexeme.
    #[error("[line {line}] Runtime error at '{lexeme}': {message}")]
    Runtime {
        message: String,
        lexeme: String,
        line: usize,
    },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// `at 'x'` for ordinary tokens, `at end` for the EOF marker.
fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        "at end".to_string()
    } else {
        format!("at '{}'", token.lexeme)
    }
}

impl FendError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        FendError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        FendError::Parse {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        FendError::Resolve {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Runtime error: line={}, lexeme={}, msg={}",
            token.line, token.lexeme, message
        );

        FendError::Runtime {
            message,
            lexeme: token.lexeme.clone(),
            line: token.line,
        }
    }

    /// True for the static (pre-execution) error kinds.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            FendError::Lex { .. } | FendError::Parse { .. } | FendError::Resolve { .. }
        )
    }

    /// The bare message, without line or location decoration.
    pub fn message(&self) -> String {
        match self {
            FendError::Lex { message, .. }
            | FendError::Parse { message, .. }
            | FendError::Resolve { message, .. }
            | FendError::Runtime { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, FendError>;
