//! Common types and utilities for cfn-template-toolkit
//!
//! This crate contains the shared error type, source locations, and the
//! template path model used across the parser, schema, assist, and CLI
//! components.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

mod path;

pub use path::{PathSegment, TemplatePath};

/// Errors that can occur while parsing a template or resolving its schema
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("syntax error at {location}: {message}")]
    Syntax { message: String, location: Location },

    #[error("unexpected token at {location}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },

    #[error("unexpected end of input at {location}")]
    UnexpectedEof { location: Location },

    #[error("no schema element found for path {path}")]
    SchemaElementNotFound { path: String },

    #[error("failed to load schema: {0}")]
    SchemaLoad(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for toolkit operations
pub type Result<T> = std::result::Result<T, TemplateError>;

/// A position in the template source text.
///
/// `line` and `column` are 1-based (editor convention), `offset` is the
/// 0-based byte offset into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    /// The start of a buffer.
    pub fn start() -> Self {
        Location {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location {
            line: 3,
            column: 14,
            offset: 52,
        };
        assert_eq!(loc.to_string(), "line 3, column 14");
    }

    #[test]
    fn test_error_display_includes_location() {
        let err = TemplateError::UnexpectedEof {
            location: Location {
                line: 1,
                column: 9,
                offset: 8,
            },
        };
        assert_eq!(err.to_string(), "unexpected end of input at line 1, column 9");
    }
}
