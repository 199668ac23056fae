//! Internal failure types for formula evaluation.
//!
//! None of these escape [`crate::engine::evaluate`]: every variant is logged
//! and surfaced to callers as `#ERR: Syntax`.

use thiserror::Error;

/// Errors raised while lexing, parsing or executing a rewritten formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("Unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("Unexpected {found} at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("Unexpected end of formula")]
    UnexpectedEnd,

    #[error("Unary operator used as base of '**' without parentheses")]
    AmbiguousExponent,

    #[error("'{0}' is not defined")]
    UnknownIdentifier(String),

    #[error("'{0}' is not a function")]
    UnknownFunction(String),

    #[error("Cannot read property '{property}' of {target}")]
    UnknownProperty { property: String, target: String },

    #[error("{0}")]
    Range(String),

    #[error("Formula nested more than {0} levels deep")]
    TooDeep(usize),
}

pub type Result<T> = std::result::Result<T, EvalError>;
