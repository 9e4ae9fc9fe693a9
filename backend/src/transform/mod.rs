//! Transformation module.
//!
//! This module turns a parsed document into table lines:
//! - Detector: Schema detection
//! - References: Material and edge-band lookup for one piece
//! - Extractor: Pieces from either schema
//! - Grouper: Pieces into modules
//! - Formatter: Modules into rows and separators
//! - Pipeline: Main conversion pipeline

pub mod detector;
pub mod references;
pub mod extractor;
pub mod grouper;
pub mod formatter;
pub mod pipeline;

pub use detector::detect;
pub use extractor::{extract, Extraction};
pub use formatter::{format_modules, FormatterOptions};
pub use grouper::group_modules;
pub use pipeline::*;
