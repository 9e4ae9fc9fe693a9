//! # Cutlist - furniture cutting-list conversion
//!
//! Cutlist reads the XML exported by furniture design software and turns it
//! into a flat 16-column cutting table, delimited text or spreadsheet markup.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  XML File   │────▶│   Parser    │────▶│   Detect +  │────▶│  Group +    │────▶│   Export    │
//! │ (ISO/UTF8)  │     │  (auto-enc) │     │   Extract   │     │  Format     │     │ (CSV / XLS) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cutlist::{convert_file, ConvertOptions};
//!
//! let conversion = convert_file("lista.xml", &ConvertOptions::default()).unwrap();
//! println!("{} rows", conversion.report.row_count);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (Piece, Module, Row, ExportFormat)
//! - [`parser`] - Source decoding and XML parsing
//! - [`transform`] - Detection, extraction, grouping, formatting and pipeline
//! - [`export`] - Delimited text and spreadsheet markup encoders
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Serialization
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConvertError, ParseError, ServerError, SourceError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Cell,
    ExportFormat,
    FormatKind,
    Module,
    Payload,
    Piece,
    Row,
    Strategy,
    TableLine,
    COLUMN_HEADERS,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_bytes_auto,
    decode_content,
    detect_encoding,
    parse_document,
    read_source,
    SourceText,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    analyze,
    convert_bytes,
    convert_file,
    convert_str,
    detect_str,
    Analysis,
    Conversion,
    ConversionReport,
    ConvertOptions,
    ParseErrorPolicy,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{build_payload, serialize, suggested_file_name, DEFAULT_FILE_NAME};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ConvertResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
