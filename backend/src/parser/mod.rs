//! Source loading: bytes to text with encoding auto-detection, text to XML.
//!
//! Cutting-list exporters write UTF-8 as well as Latin-1, so raw bytes are
//! decoded before the XML parser ever sees them. No cutting-list logic here.

use roxmltree::{Document, ParsingOptions};
use std::path::Path;

use crate::error::{ParseError, SourceError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decoded source text with the encoding that was used.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub text: String,
    pub encoding: String,
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 (with or without BOM) always wins; chardet is only consulted
/// for byte sequences that are not UTF-8.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if bytes.starts_with(UTF8_BOM) || std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> Result<String, SourceError> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => {
            let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            match std::str::from_utf8(body) {
                Ok(s) => s.to_string(),
                Err(_) => String::from_utf8_lossy(body).to_string(),
            }
        }
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => {
                let (decoded, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(SourceError::Encoding(format!(
                        "invalid byte sequence for {}",
                        enc.name()
                    )));
                }
                decoded.to_string()
            }
            // Fallback: try UTF-8 with lossy conversion
            None => String::from_utf8_lossy(bytes).to_string(),
        },
    };
    Ok(text)
}

/// Decode raw bytes with encoding auto-detection.
pub fn decode_bytes_auto(bytes: &[u8]) -> Result<SourceText, SourceError> {
    if bytes.is_empty() {
        return Err(SourceError::Empty);
    }
    let encoding = detect_encoding(bytes);
    let text = decode_content(bytes, &encoding)?;
    Ok(SourceText { text, encoding })
}

/// Read and decode a source file.
///
/// I/O failures surface as [`SourceError`]; the conversion engine is never
/// invoked for a source that could not be read.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<SourceText, SourceError> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_bytes_auto(&bytes)
}

/// Parse text into an XML document.
///
/// DTDs are tolerated since some exporters emit a doctype line.
pub fn parse_document(text: &str) -> Result<Document<'_>, ParseError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options).map_err(ParseError::from)
}
