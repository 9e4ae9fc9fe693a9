//! Domain models for the cutting-list conversion pipeline.
//!
//! - [`Piece`] - one cuttable part extracted from the source document
//! - [`Module`] - pieces sharing a grouping key (one furniture unit)
//! - [`Row`] / [`Cell`] / [`TableLine`] - the tabular form of the export
//! - [`ExportFormat`] / [`FormatKind`] - target encodings
//! - [`Payload`] - the finished output handed to I/O collaborators

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Strategy
// =============================================================================

/// Which document shape the detector recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `ITEM` elements present.
    Items,
    /// Legacy model-category containers, no items.
    Categories,
    /// Nothing recognised; a sample row is emitted.
    Fallback,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Items => "items",
            Strategy::Categories => "categories",
            Strategy::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Piece
// =============================================================================

/// A dimension as written in the source plus its numeric reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dimension {
    pub raw: String,
    pub value: Option<f64>,
}

impl Dimension {
    /// Accepts both `.` and `,` as decimal separator.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let value = if trimmed.is_empty() {
            None
        } else {
            trimmed.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
        };
        Self {
            raw: raw.to_string(),
            value,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.value.is_some()
    }
}

/// Edge-banding presence per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EdgeFlags {
    pub bottom: bool,
    pub top: bool,
    pub right: bool,
    pub left: bool,
}

impl EdgeFlags {
    /// Sets the flag by 1-based ordinal: 1 bottom, 2 top, 3 right, 4 left.
    pub fn set(&mut self, ordinal: u8, present: bool) {
        match ordinal {
            1 => self.bottom = present,
            2 => self.top = present,
            3 => self.right = present,
            4 => self.left = present,
            _ => {}
        }
    }

    /// Flags in column order.
    pub fn as_array(&self) -> [bool; 4] {
        [self.bottom, self.top, self.right, self.left]
    }
}

/// Where a piece came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum PieceOrigin {
    /// A fully described `ITEM` element.
    Item,
    /// A category × model (× model type) combination of the legacy schema.
    Category {
        category: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        model_type: Option<String>,
    },
}

/// One cuttable part.
///
/// Built once per matched element and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: String,
    pub unique_id: String,
    pub description: String,
    pub observations: String,
    pub family: String,
    pub width: Dimension,
    pub height: Dimension,
    pub depth: Dimension,
    pub quantity: u32,
    pub repetition: u32,
    pub material: String,
    pub color_label: String,
    pub thickness: String,
    pub sheet_width: String,
    pub sheet_height: String,
    pub edges: EdgeFlags,
    pub edge_color_label: String,
    pub origin: PieceOrigin,
}

impl Piece {
    /// `quantity × repetition`.
    pub fn total_quantity(&self) -> u64 {
        u64::from(self.quantity) * u64::from(self.repetition)
    }

    /// Sheet label: `MDF <thickness> <color>` when both material and colour
    /// resolved, otherwise the raw material.
    pub fn sheet_label(&self) -> String {
        if !self.material.is_empty() && !self.color_label.is_empty() {
            ["MDF", self.thickness.as_str(), self.color_label.as_str()]
                .iter()
                .filter(|part| !part.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            self.material.clone()
        }
    }
}

// =============================================================================
// Module
// =============================================================================

/// Pieces sharing a grouping key, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub key: String,
    pub header: String,
    pub pieces: Vec<Piece>,
}

impl Module {
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

// =============================================================================
// Rows
// =============================================================================

/// Fixed column labels of the export, in order.
pub const COLUMN_HEADERS: [&str; 16] = [
    "NUM.",
    "MÓDULO",
    "CLIENTE",
    "AMBIENTE",
    "DESC. DA PEÇA",
    "OBSERVAÇÕES DA PEÇA",
    "COMP",
    "LARG",
    "QUANT",
    "BORDA INF",
    "BORDA SUP",
    "BORDA DIR",
    "BORDA ESQ",
    "COR FITA DE BORDA",
    "CHAPA",
    "ESP.",
];

/// Number of columns in every row.
pub const COLUMN_COUNT: usize = COLUMN_HEADERS.len();

/// A typed cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// Free text; escaped by markup encoders.
    Text(String),
    /// Text known to parse as a number.
    Number(String),
    /// Edge flag, rendered `X` or empty.
    Flag(bool),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Numeric when the text parses as a number, text otherwise.
    pub fn numeric(value: impl Into<String>) -> Self {
        let value = value.into();
        if Dimension::parse(&value).is_numeric() {
            Cell::Number(value)
        } else {
            Cell::Text(value)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cell::Text(s) | Cell::Number(s) => s,
            Cell::Flag(true) => "X",
            Cell::Flag(false) => "",
        }
    }
}

/// One row of exactly [`COLUMN_COUNT`] cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row(pub [Cell; COLUMN_COUNT]);

impl Row {
    pub fn header() -> Self {
        Row(COLUMN_HEADERS.map(Cell::text))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn values(&self) -> Vec<&str> {
        self.0.iter().map(Cell::as_str).collect()
    }
}

/// A line of the table body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "row", rename_all = "snake_case")]
pub enum TableLine {
    Data(Row),
    /// Visual gap between modules; only spreadsheet markup renders it.
    Separator,
}

// =============================================================================
// Export Formats
// =============================================================================

/// Column families used for header styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnGroup {
    Identification,
    Description,
    Dimensions,
    Edges,
    Material,
}

impl ColumnGroup {
    /// Group of the column at `index`.
    pub fn of_column(index: usize) -> Self {
        match index {
            0..=3 => ColumnGroup::Identification,
            4 | 5 => ColumnGroup::Description,
            6..=8 => ColumnGroup::Dimensions,
            9..=13 => ColumnGroup::Edges,
            _ => ColumnGroup::Material,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ColumnGroup::Identification => "col-id",
            ColumnGroup::Description => "col-desc",
            ColumnGroup::Dimensions => "col-dim",
            ColumnGroup::Edges => "col-edge",
            ColumnGroup::Material => "col-mat",
        }
    }
}

/// Background colour per column group.
pub type ColumnStyleMap = BTreeMap<ColumnGroup, String>;

pub fn default_column_styles() -> ColumnStyleMap {
    BTreeMap::from([
        (ColumnGroup::Identification, "#D9E1F2".to_string()),
        (ColumnGroup::Description, "#E2EFDA".to_string()),
        (ColumnGroup::Dimensions, "#FFF2CC".to_string()),
        (ColumnGroup::Edges, "#FCE4D6".to_string()),
        (ColumnGroup::Material, "#EDEDED".to_string()),
    ])
}

/// Target encoding, chosen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportFormat {
    DelimitedText {
        separator: char,
        quote: char,
        /// Quote cells containing a comma even when the separator is not one.
        #[serde(default)]
        quote_commas: bool,
        #[serde(default)]
        byte_order_mark: bool,
    },
    SpreadsheetMarkup {
        #[serde(default = "default_column_styles")]
        styles: ColumnStyleMap,
    },
}

impl ExportFormat {
    /// Comma-separated, no BOM.
    pub fn csv() -> Self {
        ExportFormat::DelimitedText {
            separator: ',',
            quote: '"',
            quote_commas: false,
            byte_order_mark: false,
        }
    }

    /// Semicolon-separated locale variant; comma-sensitive quoting and BOM.
    pub fn semicolon_csv() -> Self {
        ExportFormat::DelimitedText {
            separator: ';',
            quote: '"',
            quote_commas: true,
            byte_order_mark: true,
        }
    }

    pub fn spreadsheet() -> Self {
        ExportFormat::SpreadsheetMarkup {
            styles: default_column_styles(),
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::DelimitedText { .. } => "text/csv",
            ExportFormat::SpreadsheetMarkup { .. } => "application/vnd.ms-excel",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::DelimitedText { .. } => "csv",
            ExportFormat::SpreadsheetMarkup { .. } => "xls",
        }
    }

    /// Whether module separator lines carry meaning in this encoding.
    pub fn renders_separators(&self) -> bool {
        matches!(self, ExportFormat::SpreadsheetMarkup { .. })
    }
}

/// Named format presets exposed to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FormatKind {
    /// Comma-delimited text.
    #[default]
    Csv,
    /// Semicolon-delimited text (spreadsheet locales using decimal commas).
    CsvSemicolon,
    /// Spreadsheet markup readable by Excel.
    Xls,
}

impl FormatKind {
    pub fn to_format(self) -> ExportFormat {
        match self {
            FormatKind::Csv => ExportFormat::csv(),
            FormatKind::CsvSemicolon => ExportFormat::semicolon_csv(),
            FormatKind::Xls => ExportFormat::spreadsheet(),
        }
    }

    /// Parse a format name, accepting a few spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "csv" | "comma" => Some(FormatKind::Csv),
            "csv-semicolon" | "csv_semicolon" | "semicolon" | "ssv" => {
                Some(FormatKind::CsvSemicolon)
            }
            "xls" | "excel" | "spreadsheet" | "html" => Some(FormatKind::Xls),
            _ => None,
        }
    }
}

// =============================================================================
// Payload
// =============================================================================

/// Finished output handed to I/O collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub content: String,
    pub media_type: String,
    pub suggested_file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece() -> Piece {
        Piece {
            id: "1".into(),
            unique_id: "U1".into(),
            description: "Lateral".into(),
            observations: String::new(),
            family: "Chapas".into(),
            width: Dimension::parse("700"),
            height: Dimension::parse("550"),
            depth: Dimension::parse("15"),
            quantity: 2,
            repetition: 3,
            material: "MDF".into(),
            color_label: "Branco".into(),
            thickness: "15".into(),
            sheet_width: String::new(),
            sheet_height: String::new(),
            edges: EdgeFlags::default(),
            edge_color_label: "Branco".into(),
            origin: PieceOrigin::Item,
        }
    }

    #[test]
    fn test_total_quantity() {
        assert_eq!(piece().total_quantity(), 6);
    }

    #[test]
    fn test_sheet_label_synthesized() {
        assert_eq!(piece().sheet_label(), "MDF 15 Branco");
    }

    #[test]
    fn test_sheet_label_raw_material() {
        let mut p = piece();
        p.color_label.clear();
        assert_eq!(p.sheet_label(), "MDF");

        p.material.clear();
        assert_eq!(p.sheet_label(), "");
    }

    #[test]
    fn test_dimension_parse() {
        assert_eq!(Dimension::parse("18,5").value, Some(18.5));
        assert_eq!(Dimension::parse("600").value, Some(600.0));
        assert_eq!(Dimension::parse("").value, None);
        assert_eq!(Dimension::parse("abc").value, None);
        assert_eq!(Dimension::parse("abc").raw, "abc");
    }

    #[test]
    fn test_numeric_cell_degrades_to_text() {
        assert_eq!(Cell::numeric("600"), Cell::Number("600".into()));
        assert_eq!(Cell::numeric("<b>"), Cell::Text("<b>".into()));
        assert_eq!(Cell::numeric(""), Cell::Text(String::new()));
    }

    #[test]
    fn test_flag_rendering() {
        assert_eq!(Cell::Flag(true).as_str(), "X");
        assert_eq!(Cell::Flag(false).as_str(), "");
    }

    #[test]
    fn test_edge_flags_ordinal() {
        let mut edges = EdgeFlags::default();
        edges.set(1, true);
        edges.set(4, true);
        edges.set(9, true);
        assert_eq!(edges.as_array(), [true, false, false, true]);
    }

    #[test]
    fn test_column_groups_cover_all_columns() {
        assert_eq!(ColumnGroup::of_column(0), ColumnGroup::Identification);
        assert_eq!(ColumnGroup::of_column(4), ColumnGroup::Description);
        assert_eq!(ColumnGroup::of_column(8), ColumnGroup::Dimensions);
        assert_eq!(ColumnGroup::of_column(13), ColumnGroup::Edges);
        assert_eq!(ColumnGroup::of_column(15), ColumnGroup::Material);
    }

    #[test]
    fn test_format_media_types() {
        assert_eq!(ExportFormat::csv().media_type(), "text/csv");
        assert_eq!(ExportFormat::semicolon_csv().extension(), "csv");
        assert_eq!(ExportFormat::spreadsheet().media_type(), "application/vnd.ms-excel");
        assert_eq!(ExportFormat::spreadsheet().extension(), "xls");
    }

    #[test]
    fn test_format_kind_names() {
        assert_eq!(FormatKind::from_name("CSV"), Some(FormatKind::Csv));
        assert_eq!(FormatKind::from_name("semicolon"), Some(FormatKind::CsvSemicolon));
        assert_eq!(FormatKind::from_name("excel"), Some(FormatKind::Xls));
        assert_eq!(FormatKind::from_name("pdf"), None);
    }

    #[test]
    fn test_format_kind_serde() {
        let kind: FormatKind = serde_json::from_str("\"csv-semicolon\"").unwrap();
        assert_eq!(kind, FormatKind::CsvSemicolon);
    }
}
