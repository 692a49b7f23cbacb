//! Error types for reading and writing Strata documents.
//!
//! Reading is fail-fast: the first error aborts the parse. Errors raised
//! while the lexer is running carry the lexer state name, the line number,
//! and the offending line reconstructed from the diagnostic buffer.
//!
//! ## Error Categories
//!
//! - **Lexical**: unexpected byte, bad escape, malformed BOM, oversized literal
//! - **Indentation**: a line's leading whitespace does not match the open
//!   nesting levels
//! - **Grammar**: unexpected token in context, unknown record or type name,
//!   missing mandatory token
//! - **DataShape**: record arity mismatch, type propagation onto an
//!   incompatible container
//! - **Conversion**: scalar text fails to parse as the requested primitive
//!
//! ## Examples
//!
//! ```rust
//! use strata::{from_str, Error};
//!
//! let result = from_str("a: (1, 2");
//! assert!(result.is_err());
//!
//! if let Err(err) = result {
//!     eprintln!("Parse error: {}", err);
//!     // Error messages include line numbers and the offending line
//! }
//! ```

use thiserror::Error;

/// Represents all possible errors that can occur while reading or writing
/// Strata text.
///
/// Each parse-phase variant includes contextual information to aid debugging.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Lexical error from the byte automaton: unexpected byte, bad escape,
    /// malformed BOM, unterminated quote or bracket, oversized literal.
    #[error("parse error at line {line} (state: {state}): {msg}\n  | {context}")]
    Lexical {
        msg: String,
        state: &'static str,
        line: usize,
        context: String,
    },

    /// Inconsistent indentation: leading whitespace neither extends nor
    /// exactly matches the prefixes of the open nesting levels.
    #[error("indentation error at line {line}: {msg}\n  | {context}")]
    Indentation {
        msg: String,
        line: usize,
        context: String,
    },

    /// Structural error in an otherwise well-lexed line.
    #[error("grammar error at line {line}: {msg}\n  | {context}")]
    Grammar {
        msg: String,
        line: usize,
        context: String,
    },

    /// A value does not structurally satisfy its assigned type.
    #[error("data shape error: {msg}")]
    DataShape { msg: String },

    /// Scalar text could not be parsed as the requested primitive type.
    #[error("cannot convert {text:?} to {target}")]
    Conversion { text: String, target: &'static str },

    /// File or stream failure in an input/output collaborator.
    #[error("IO error: {0}")]
    Io(String),

    /// Internal consistency violation; fatal regardless of input.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse error classification, mainly for matching in tests and in callers
/// that map failures to exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Indentation,
    Grammar,
    DataShape,
    Conversion,
    Io,
    Internal,
}

impl Error {
    /// Creates a lexical error with full lexer context.
    pub fn lexical(
        msg: impl Into<String>,
        state: &'static str,
        line: usize,
        context: impl Into<String>,
    ) -> Self {
        Error::Lexical {
            msg: msg.into(),
            state,
            line,
            context: context.into(),
        }
    }

    /// Creates an indentation error. Line and context are filled in by the
    /// parse driver when the raise site does not know them.
    pub fn indentation(msg: impl Into<String>) -> Self {
        Error::Indentation {
            msg: msg.into(),
            line: 0,
            context: String::new(),
        }
    }

    /// Creates a grammar error. Line and context are filled in by the parse
    /// driver when the raise site does not know them.
    pub fn grammar(msg: impl Into<String>) -> Self {
        Error::Grammar {
            msg: msg.into(),
            line: 0,
            context: String::new(),
        }
    }

    /// Creates a data shape error.
    pub fn data_shape(msg: impl Into<String>) -> Self {
        Error::DataShape { msg: msg.into() }
    }

    /// Creates a conversion error for scalar text that failed to parse as
    /// `target`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::Error;
    ///
    /// let err = Error::conversion("1.5", "int32");
    /// assert!(err.to_string().contains("int32"));
    /// ```
    pub fn conversion(text: impl Into<String>, target: &'static str) -> Self {
        Error::Conversion {
            text: text.into(),
            target,
        }
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    /// Creates an internal consistency error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Returns the coarse classification of this error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata::{Error, ErrorKind};
    ///
    /// assert_eq!(Error::conversion("x", "int64").kind(), ErrorKind::Conversion);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Lexical { .. } => ErrorKind::Lexical,
            Error::Indentation { .. } => ErrorKind::Indentation,
            Error::Grammar { .. } => ErrorKind::Grammar,
            Error::DataShape { .. } => ErrorKind::DataShape,
            Error::Conversion { .. } => ErrorKind::Conversion,
            Error::Io(_) => ErrorKind::Io,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Fills in line number and line text for errors raised below the lexer.
    /// Context already present is never overwritten.
    pub(crate) fn with_line_context(self, line: usize, context: &str) -> Self {
        match self {
            Error::Grammar { msg, line: 0, .. } => Error::Grammar {
                msg,
                line,
                context: context.to_string(),
            },
            Error::Indentation { msg, line: 0, .. } => Error::Indentation {
                msg,
                line,
                context: context.to_string(),
            },
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
