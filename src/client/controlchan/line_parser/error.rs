use crate::client::Report;

use derive_more::Display;
use std::result;
use thiserror::Error;

/// The error type returned by the [parse](super::parse) function.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("parse error: {kind}")]
pub struct ParseError {
    kind: ParseErrorKind,
}

/// A list specifying categories of Parse errors. It is meant to be used with the [ParseError]
/// type.
#[derive(Clone, Eq, PartialEq, Debug, Display)]
pub enum ParseErrorKind {
    /// The line is longer than we accept.
    #[display("Line longer than {max} characters")]
    TooLong { max: usize },
    /// The user typed a command we don't know about.
    #[display("Unknown command: {command}")]
    UnknownCommand { command: String },
    /// The user typed a known command with the wrong number of arguments.
    #[display("{command} takes {expected} argument(s), got {found}")]
    IncorrectArgumentCount { command: String, expected: usize, found: usize },
}

impl ParseError {
    /// Returns the corresponding `ParseErrorKind` for this error.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// The report shown to the user for this error.
    pub fn report(&self) -> Report {
        match self.kind {
            ParseErrorKind::UnknownCommand { .. } => Report::InvalidCommand,
            ParseErrorKind::TooLong { .. } | ParseErrorKind::IncorrectArgumentCount { .. } => Report::IncorrectArgumentCount,
        }
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> ParseError {
        ParseError { kind }
    }
}

/// The Result type used in this module.
pub type Result<T> = result::Result<T, ParseError>;
