//! Table serialization.
//!
//! Renders a header row and body lines under an [`ExportFormat`] and wraps
//! the result in a [`Payload`] with media type and file name.
//!
//! | Format | media type | extension |
//! |---|---|---|
//! | comma-delimited | `text/csv` | `.csv` |
//! | semicolon-delimited | `text/csv` | `.csv` |
//! | spreadsheet markup | `application/vnd.ms-excel` | `.xls` |

pub mod delimited;
pub mod markup;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ExportFormat, Payload, Row, TableLine};

pub use delimited::Delimiter;

/// Base name used when the caller supplies none.
pub const DEFAULT_FILE_NAME: &str = "modelos_converted";

static UNSAFE_FILE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\\/:*?"<>|\x00-\x1F]+"#).expect("valid file-name pattern")
});

/// Render rows under the given format. Deterministic for equal input.
pub fn serialize(format: &ExportFormat, header: &Row, lines: &[TableLine]) -> String {
    match format {
        ExportFormat::DelimitedText {
            separator,
            quote,
            quote_commas,
            byte_order_mark,
        } => {
            let delimiter = Delimiter {
                separator: *separator,
                quote: *quote,
                quote_commas: *quote_commas,
                byte_order_mark: *byte_order_mark,
            };
            delimited::render(&delimiter, header, lines)
        }
        ExportFormat::SpreadsheetMarkup { styles } => markup::render(styles, header, lines),
    }
}

/// File name for the payload: sanitized base name plus the format extension.
///
/// A base that already ends with the extension is not extended twice.
pub fn suggested_file_name(base: &str, format: &ExportFormat) -> String {
    let extension = format.extension();
    let cleaned = UNSAFE_FILE_CHARS.replace_all(base.trim(), "_");
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());

    let suffix = format!(".{}", extension);
    let split = cleaned.len().saturating_sub(suffix.len());
    let stem = match (cleaned.get(..split), cleaned.get(split..)) {
        (Some(stem), Some(tail)) if tail.eq_ignore_ascii_case(&suffix) => stem,
        _ => cleaned,
    };

    let stem = if stem.is_empty() { DEFAULT_FILE_NAME } else { stem };
    format!("{}{}", stem, suffix)
}

/// Serialize and wrap into a payload.
pub fn build_payload(
    format: &ExportFormat,
    header: &Row,
    lines: &[TableLine],
    base_name: &str,
) -> Payload {
    Payload {
        content: serialize(format, header, lines),
        media_type: format.media_type().to_string(),
        suggested_file_name: suggested_file_name(base_name, format),
    }
}
