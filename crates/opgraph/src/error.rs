//! Error types for opgraph.

use std::fmt;
use std::io;

use crate::codec::MAX_USER_FUNCTIONS;

/// Errors surfaced by exports and grouped calls.
///
/// Recording itself never fails; these only come from the edges of the
/// system (files, the host's function registry).
#[derive(Debug)]
pub enum TraceError {
    /// Export file could not be created or written.
    Io(io::Error),
    /// A sparse export could not be parsed back.
    Parse { line: usize, message: String },
    /// Grouped call to a function missing from the registry.
    UnknownFunction(String),
    /// Registry index too large to be encoded in a node's kind code.
    FunctionIndexOutOfRange { name: String, index: u32 },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Parse { line, message } => write!(f, "parse error on line {line}: {message}"),
            Self::UnknownFunction(name) => {
                write!(f, "function `{name}` is not in the registry")
            }
            Self::FunctionIndexOutOfRange { name, index } => {
                write!(f, "function `{name}` has index {index}, limit is {}", MAX_USER_FUNCTIONS - 1)
            }
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TraceError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
