//! High-level conversion API.
//!
//! Combines every step over one fully materialized document:
//! parse, detect, extract, group, format and serialize.
//!
//! # Example
//!
//! ```rust,ignore
//! use cutlist::{convert_file, ConvertOptions, FormatKind};
//!
//! let options = ConvertOptions {
//!     format: FormatKind::Xls,
//!     file_name: "obra_42".into(),
//!     ..ConvertOptions::default()
//! };
//! let conversion = convert_file("lista.xml", &options)?;
//! std::fs::write(&conversion.payload.suggested_file_name, &conversion.payload.content)?;
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::detector::detect;
use super::extractor::extract;
use super::formatter::{format_modules, sample_row, FormatterOptions};
use super::grouper::{group_modules, single_module};
use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::error::{ConvertError, ParseError};
use crate::export::{build_payload, DEFAULT_FILE_NAME};
use crate::models::{ExportFormat, FormatKind, Module, Payload, Row, Strategy, TableLine};
use crate::parser::{decode_bytes_auto, parse_document, read_source};

/// Modules listed individually in the log.
const MODULES_LOGGED: usize = 5;

/// What to do when the input is not well-formed XML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorPolicy {
    /// Return the [`ParseError`] to the caller.
    #[default]
    Fail,
    /// Emit a header-only payload instead.
    HeaderOnly,
}

/// Options for the conversion pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Output encoding preset
    pub format: FormatKind,

    /// Output base file name; the extension is appended
    pub file_name: String,

    /// Repeat the module header inside long modules
    pub repeat_long_module_header: bool,

    /// Malformed-input handling
    pub on_parse_error: ParseErrorPolicy,

    /// Override the format's byte-order-mark preset (delimited text only)
    pub byte_order_mark: Option<bool>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: FormatKind::default(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            repeat_long_module_header: false,
            on_parse_error: ParseErrorPolicy::default(),
            byte_order_mark: None,
        }
    }
}

impl ConvertOptions {
    /// Defaults overlaid with `CUTLIST_FORMAT`, `CUTLIST_FILE_NAME`,
    /// `CUTLIST_REPEAT_HEADER` and `CUTLIST_LENIENT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(name) = lookup("CUTLIST_FORMAT") {
            match FormatKind::from_name(&name) {
                Some(kind) => options.format = kind,
                None => log_warning(format!("Ignoring unknown CUTLIST_FORMAT '{}'", name)),
            }
        }
        if let Some(name) = lookup("CUTLIST_FILE_NAME").filter(|s| !s.trim().is_empty()) {
            options.file_name = name;
        }
        if let Some(flag) = lookup("CUTLIST_REPEAT_HEADER") {
            options.repeat_long_module_header = is_truthy(&flag);
        }
        if let Some(flag) = lookup("CUTLIST_LENIENT") {
            if is_truthy(&flag) {
                options.on_parse_error = ParseErrorPolicy::HeaderOnly;
            }
        }

        options
    }

    /// Concrete export format with overrides applied.
    pub fn export_format(&self) -> ExportFormat {
        let mut format = self.format.to_format();
        if let (ExportFormat::DelimitedText { byte_order_mark, .. }, Some(bom)) =
            (&mut format, self.byte_order_mark)
        {
            *byte_order_mark = bom;
        }
        format
    }

    fn formatter_options(&self) -> FormatterOptions {
        FormatterOptions {
            repeat_long_module_header: self.repeat_long_module_header,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Document structure before formatting.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub strategy: Strategy,
    pub modules: Vec<Module>,
    /// Items dropped by the family filter
    pub excluded: usize,
}

impl Analysis {
    pub fn piece_count(&self) -> usize {
        self.modules.iter().map(Module::len).sum()
    }
}

/// Counters describing one conversion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub strategy: Strategy,
    /// Source encoding, when the engine decoded raw bytes itself
    pub encoding: Option<String>,
    pub piece_count: usize,
    pub excluded_count: usize,
    pub module_count: usize,
    pub row_count: usize,
    /// Input was malformed and a header-only payload was produced
    pub degraded: bool,
}

/// Result of a complete conversion
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub payload: Payload,
    pub report: ConversionReport,
}

/// Parse and detect only.
pub fn detect_str(text: &str) -> Result<Strategy, ParseError> {
    let doc = parse_document(text)?;
    Ok(detect(&doc))
}

/// Parse, detect, extract and group.
pub fn analyze(text: &str) -> Result<Analysis, ParseError> {
    let doc = parse_document(text)?;
    let strategy = detect(&doc);
    let extraction = extract(&doc, strategy);

    let modules = match strategy {
        Strategy::Items => group_modules(extraction.pieces),
        Strategy::Categories | Strategy::Fallback => single_module(extraction.pieces),
    };

    Ok(Analysis {
        strategy,
        modules,
        excluded: extraction.excluded,
    })
}

/// Convert XML text.
///
/// Fails only when the text is not XML and the policy is
/// [`ParseErrorPolicy::Fail`].
pub fn convert_str(text: &str, options: &ConvertOptions) -> Result<Conversion, ParseError> {
    let format = options.export_format();

    log_info("🔎 Detecting document schema...");
    let analysis = match analyze(text) {
        Ok(analysis) => analysis,
        Err(err) => {
            return match options.on_parse_error {
                ParseErrorPolicy::Fail => {
                    log_error(err.to_string());
                    Err(err)
                }
                ParseErrorPolicy::HeaderOnly => {
                    log_warning(format!("{} (emitting header only)", err));
                    Ok(header_only(&format, options))
                }
            };
        }
    };
    log_success(format!("Strategy: {}", analysis.strategy));

    if analysis.excluded > 0 {
        log_info(format!("Excluded {} hardware/consumable items", analysis.excluded));
    }
    log_success(format!(
        "{} pieces in {} modules",
        analysis.piece_count(),
        analysis.modules.len()
    ));
    for module in analysis.modules.iter().take(MODULES_LOGGED) {
        let label = if module.header.is_empty() { &module.key } else { &module.header };
        log_info_indent(format!("{} ({} pieces)", label, module.len()), 1);
    }

    let lines = table_lines(&analysis, options.formatter_options());
    let payload = build_payload(&format, &Row::header(), &lines, &options.file_name);
    let row_count = count_rows(&lines);
    log_success(format!("{} rows → {}", row_count, payload.suggested_file_name));

    Ok(Conversion {
        report: ConversionReport {
            strategy: analysis.strategy,
            encoding: None,
            piece_count: analysis.piece_count(),
            excluded_count: analysis.excluded,
            module_count: analysis.modules.len(),
            row_count,
            degraded: false,
        },
        payload,
    })
}

/// Convert raw bytes, detecting their encoding first.
pub fn convert_bytes(bytes: &[u8], options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let source = decode_bytes_auto(bytes)?;
    log_success(format!("Detected encoding: {}", source.encoding));

    let mut conversion = convert_str(&source.text, options)?;
    conversion.report.encoding = Some(source.encoding);
    Ok(conversion)
}

/// Read and convert a file.
///
/// A read failure is a [`ConvertError::Source`]; the engine never runs.
pub fn convert_file<P: AsRef<Path>>(
    path: P,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    log_info(format!("📖 Reading {}", path.as_ref().display()));
    let source = read_source(path)?;
    log_success(format!("Detected encoding: {}", source.encoding));

    let mut conversion = convert_str(&source.text, options)?;
    conversion.report.encoding = Some(source.encoding);
    Ok(conversion)
}

fn header_only(format: &ExportFormat, options: &ConvertOptions) -> Conversion {
    Conversion {
        payload: build_payload(format, &Row::header(), &[], &options.file_name),
        report: ConversionReport {
            strategy: Strategy::Fallback,
            encoding: None,
            piece_count: 0,
            excluded_count: 0,
            module_count: 0,
            row_count: 0,
            degraded: true,
        },
    }
}

/// Formatted lines; documents without a piece schema, and category
/// documents without models, get the sample row. An item list whose pieces
/// were all excluded stays header-only.
fn table_lines(analysis: &Analysis, options: FormatterOptions) -> Vec<TableLine> {
    let lines = format_modules(&analysis.modules, options);
    if lines.is_empty() && analysis.strategy != Strategy::Items {
        return vec![TableLine::Data(sample_row())];
    }
    lines
}

fn count_rows(lines: &[TableLine]) -> usize {
    lines
        .iter()
        .filter(|l| matches!(l, TableLine::Data(_)))
        .count()
}
