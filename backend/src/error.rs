//! Error types for the cutting-list conversion pipeline.
//!
//! - [`SourceError`] - reading or decoding the raw input
//! - [`ParseError`] - input text is not well-formed XML
//! - [`ConvertError`] - top-level conversion errors
//! - [`ServerError`] - HTTP surface errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while obtaining the source text, before any conversion runs.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes could not be decoded into text.
    #[error("Failed to decode source: {0}")]
    Encoding(String),

    /// Nothing was read.
    #[error("Source is empty")]
    Empty,
}

// =============================================================================
// Parse Errors
// =============================================================================

/// The input is not well-formed XML.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    /// 1-based line of the failure, when the parser reports one.
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => {
                write!(f, "XML parse error at {}:{}: {}", line, col, self.message)
            }
            _ => write!(f, "XML parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<roxmltree::Error> for ParseError {
    fn from(err: roxmltree::Error) -> Self {
        let pos = err.pos();
        ParseError::new(err.to_string()).at(pos.row, pos.col)
    }
}

// =============================================================================
// Conversion Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// Structurally unexpected input never lands here; it degrades through the
/// schema cascade instead.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source could not be read or decoded.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Source was read but is not XML.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl ConvertError {
    pub fn is_parse(&self) -> bool {
        matches!(self, ConvertError::Parse(_))
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Conversion error.
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // SourceError -> ConvertError
        let source_err = SourceError::Empty;
        let convert_err: ConvertError = source_err.into();
        assert!(convert_err.to_string().contains("empty"));
        assert!(!convert_err.is_parse());

        // ParseError -> ConvertError
        let parse_err = ParseError::new("unexpected end of stream");
        let convert_err: ConvertError = parse_err.into();
        assert!(convert_err.is_parse());
        assert!(convert_err.to_string().contains("unexpected end"));
    }

    #[test]
    fn test_parse_error_position() {
        let err = ParseError::new("bad tag").at(3, 14);
        let msg = err.to_string();
        assert!(msg.contains("3:14"));
        assert!(msg.contains("bad tag"));
    }

    #[test]
    fn test_from_roxmltree_error() {
        let err = roxmltree::Document::parse("<a><b></a>").unwrap_err();
        let parse_err: ParseError = err.into();
        assert_eq!(parse_err.line, Some(1));
        assert!(parse_err.to_string().starts_with("XML parse error at 1:"));
    }
}
