//! Delimited text encoder (CSV and its locale variants).

use crate::models::{Row, TableLine};

const BOM: char = '\u{FEFF}';

/// Quoting and framing settings for one delimited variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub separator: char,
    pub quote: char,
    pub quote_commas: bool,
    pub byte_order_mark: bool,
}

impl Delimiter {
    /// Whether a cell must be wrapped in quotes.
    pub fn needs_quotes(&self, cell: &str) -> bool {
        cell.chars().any(|c| {
            c == self.separator
                || c == self.quote
                || c == '\n'
                || c == '\r'
                || (self.quote_commas && c == ',')
        })
    }

    /// Quote a cell if needed, doubling embedded quote characters.
    pub fn escape(&self, cell: &str) -> String {
        if !self.needs_quotes(cell) {
            return cell.to_string();
        }
        let mut out = String::with_capacity(cell.len() + 2);
        out.push(self.quote);
        for c in cell.chars() {
            if c == self.quote {
                out.push(self.quote);
            }
            out.push(c);
        }
        out.push(self.quote);
        out
    }

    fn write_row(&self, out: &mut String, row: &Row) {
        let separator = self.separator.to_string();
        let cells: Vec<String> = row.values().into_iter().map(|v| self.escape(v)).collect();
        out.push_str(&cells.join(&separator));
        out.push('\n');
    }
}

/// Render a header and body as delimited text.
///
/// Separator lines are dropped: they have no meaning in plain text.
pub fn render(delimiter: &Delimiter, header: &Row, lines: &[TableLine]) -> String {
    let mut out = String::new();
    if delimiter.byte_order_mark {
        out.push(BOM);
    }

    delimiter.write_row(&mut out, header);
    for line in lines {
        if let TableLine::Data(row) = line {
            delimiter.write_row(&mut out, row);
        }
    }
    out
}
