//! Row formatting.
//!
//! Turns modules of pieces into table lines. Item pieces carry real data;
//! category pieces and the fallback sample use fixed placeholder literals
//! because their schemas carry almost nothing beyond names.

use crate::models::{Cell, Module, Piece, PieceOrigin, Row, TableLine};

pub const PLACEHOLDER_CLIENT: &str = "Cliente Exemplo";
pub const PLACEHOLDER_ENVIRONMENT: &str = "Cozinhas";
/// Edge and colour cells of placeholder rows.
const PLACEHOLDER_FINISH: &str = "Branco";

/// Index at which long modules show their header a second time.
const REPEAT_HEADER_INDEX: usize = 10;
/// Modules above this size get the repeated header.
const REPEAT_HEADER_MIN_LEN: usize = 15;

/// Formatting switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatterOptions {
    /// Show the module header again at piece 10 of modules with more than
    /// 15 pieces.
    pub repeat_long_module_header: bool,
}

/// Format a piece given its module and 0-based index within that module.
///
/// `number` is the 1-based sequence number of the row in the export.
pub fn format_piece(
    piece: &Piece,
    module: &Module,
    index: usize,
    number: usize,
    options: FormatterOptions,
) -> Row {
    match &piece.origin {
        PieceOrigin::Item => format_item(piece, module, index, number, options),
        PieceOrigin::Category { category, .. } => format_category(piece, category),
    }
}

fn format_item(
    piece: &Piece,
    module: &Module,
    index: usize,
    number: usize,
    options: FormatterOptions,
) -> Row {
    let label = if shows_header(module, index, options) {
        module.header.clone()
    } else {
        String::new()
    };
    let [bottom, top, right, left] = piece.edges.as_array();

    Row([
        Cell::Number(number.to_string()),
        Cell::text(label),
        Cell::text(PLACEHOLDER_CLIENT),
        Cell::text(PLACEHOLDER_ENVIRONMENT),
        Cell::text(piece.description.as_str()),
        Cell::text(piece.observations.as_str()),
        Cell::numeric(piece.width.raw.as_str()),
        Cell::numeric(piece.height.raw.as_str()),
        Cell::Number(piece.total_quantity().to_string()),
        Cell::Flag(bottom),
        Cell::Flag(top),
        Cell::Flag(right),
        Cell::Flag(left),
        Cell::text(piece.edge_color_label.as_str()),
        Cell::text(piece.sheet_label()),
        Cell::numeric(piece.thickness.as_str()),
    ])
}

fn shows_header(module: &Module, index: usize, options: FormatterOptions) -> bool {
    index == 0
        || (options.repeat_long_module_header
            && index == REPEAT_HEADER_INDEX
            && module.len() > REPEAT_HEADER_MIN_LEN)
}

fn format_category(piece: &Piece, category: &str) -> Row {
    let number = if piece.id.is_empty() { "1" } else { piece.id.as_str() };
    placeholder_row(number, category, &piece.description)
}

/// Sample row emitted when no recognised data exists.
pub fn sample_row() -> Row {
    placeholder_row("1", "Exemplo", "Exemplo Peça")
}

fn placeholder_row(number: &str, environment: &str, description: &str) -> Row {
    Row([
        Cell::text(number),
        Cell::text(PLACEHOLDER_ENVIRONMENT),
        Cell::text(PLACEHOLDER_CLIENT),
        Cell::text(environment),
        Cell::text(description),
        Cell::text("Observações Exemplo"),
        Cell::Number("100".into()),
        Cell::Number("50".into()),
        Cell::Number("2".into()),
        Cell::text(PLACEHOLDER_FINISH),
        Cell::text(PLACEHOLDER_FINISH),
        Cell::text(PLACEHOLDER_FINISH),
        Cell::text(PLACEHOLDER_FINISH),
        Cell::text(PLACEHOLDER_FINISH),
        Cell::text("Chapa Exemplo"),
        Cell::text("Espessura Exemplo"),
    ])
}

/// Format all modules into table lines.
///
/// A separator line sits between consecutive modules, never after the last.
/// An empty module list yields no lines.
pub fn format_modules(modules: &[Module], options: FormatterOptions) -> Vec<TableLine> {
    let mut lines = Vec::new();
    let mut number = 0;

    for (module_idx, module) in modules.iter().enumerate() {
        if module_idx > 0 {
            lines.push(TableLine::Separator);
        }
        for (index, piece) in module.pieces.iter().enumerate() {
            number += 1;
            lines.push(TableLine::Data(format_piece(piece, module, index, number, options)));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dimension, EdgeFlags, COLUMN_COUNT};
    use crate::transform::grouper::{group_modules, single_module};

    fn piece(id: &str, unique_id: &str) -> Piece {
        Piece {
            id: id.into(),
            unique_id: unique_id.into(),
            description: format!("Peça {id}"),
            observations: "Obs".into(),
            family: "Chapas".into(),
            width: Dimension::parse("700"),
            height: Dimension::parse(""),
            depth: Dimension::parse("15"),
            quantity: 2,
            repetition: 2,
            material: "MDF".into(),
            color_label: "Branco".into(),
            thickness: "15".into(),
            sheet_width: String::new(),
            sheet_height: String::new(),
            edges: EdgeFlags {
                bottom: true,
                top: false,
                right: true,
                left: false,
            },
            edge_color_label: "Preto".into(),
            origin: PieceOrigin::Item,
        }
    }

    fn data_rows(lines: &[TableLine]) -> Vec<&Row> {
        lines
            .iter()
            .filter_map(|l| match l {
                TableLine::Data(row) => Some(row),
                TableLine::Separator => None,
            })
            .collect()
    }

    #[test]
    fn test_item_row_cells() {
        let modules = group_modules(vec![piece("1", "M1")]);
        let lines = format_modules(&modules, FormatterOptions::default());
        let row = data_rows(&lines)[0];

        assert_eq!(
            row.values(),
            vec![
                "1",
                "(1) - Peça 1 - L.700mm x A.mm x P.15mm",
                PLACEHOLDER_CLIENT,
                PLACEHOLDER_ENVIRONMENT,
                "Peça 1",
                "Obs",
                "700",
                "",
                "4",
                "X",
                "",
                "X",
                "",
                "Preto",
                "MDF 15 Branco",
                "15",
            ]
        );
        assert_eq!(row.cells().len(), COLUMN_COUNT);
        assert_eq!(row.cells()[7], Cell::Text(String::new()));
    }

    #[test]
    fn test_header_only_on_first_piece() {
        let modules = group_modules(vec![piece("1", "M1"), piece("2", "M2"), piece("3", "M1")]);
        let lines = format_modules(&modules, FormatterOptions::default());

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], TableLine::Separator);

        let rows = data_rows(&lines);
        let labels: Vec<&str> = rows.iter().map(|r| r.cells()[1].as_str()).collect();
        assert!(labels[0].starts_with("(1)"));
        assert_eq!(labels[1], "");
        assert!(labels[2].starts_with("(2)"));

        let numbers: Vec<&str> = rows.iter().map(|r| r.cells()[0].as_str()).collect();
        assert_eq!(numbers, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_repeat_header_for_long_modules() {
        let pieces: Vec<Piece> = (1..=16).map(|i| piece(&i.to_string(), "M1")).collect();
        let modules = group_modules(pieces);

        let plain = format_modules(&modules, FormatterOptions::default());
        let with_header: Vec<usize> = data_rows(&plain)
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.cells()[1].as_str().is_empty())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(with_header, vec![0]);

        let options = FormatterOptions {
            repeat_long_module_header: true,
        };
        let repeated = format_modules(&modules, options);
        let with_header: Vec<usize> = data_rows(&repeated)
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.cells()[1].as_str().is_empty())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(with_header, vec![0, 10]);
    }

    #[test]
    fn test_repeat_header_needs_more_than_fifteen() {
        let pieces: Vec<Piece> = (1..=15).map(|i| piece(&i.to_string(), "M1")).collect();
        let modules = group_modules(pieces);
        let options = FormatterOptions {
            repeat_long_module_header: true,
        };
        let lines = format_modules(&modules, options);
        let rows = data_rows(&lines);
        assert_eq!(rows[10].cells()[1].as_str(), "");
    }

    #[test]
    fn test_category_row() {
        let category_piece = Piece {
            id: String::new(),
            description: "Balcão".into(),
            origin: PieceOrigin::Category {
                category: "Cozinha".into(),
                model_type: None,
            },
            ..piece("", "")
        };
        let lines = format_modules(&single_module(vec![category_piece]), FormatterOptions::default());
        let row = data_rows(&lines)[0];

        assert_eq!(row.cells()[0].as_str(), "1");
        assert_eq!(row.cells()[1].as_str(), "Cozinhas");
        assert_eq!(row.cells()[3].as_str(), "Cozinha");
        assert_eq!(row.cells()[4].as_str(), "Balcão");
        assert_eq!(row.cells()[9].as_str(), "Branco");
        assert_eq!(row.cells()[15].as_str(), "Espessura Exemplo");
    }

    #[test]
    fn test_empty_modules_yield_no_lines() {
        assert!(format_modules(&[], FormatterOptions::default()).is_empty());
        assert_eq!(sample_row().cells()[4].as_str(), "Exemplo Peça");
    }
}
