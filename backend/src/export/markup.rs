//! Spreadsheet markup encoder.
//!
//! Produces an HTML table wrapped in the Office namespaces and an
//! `x:ExcelWorkbook` block, which spreadsheet applications import as a
//! worksheet instead of showing it as a web page.

use std::fmt::Write as _;

use crate::models::{Cell, ColumnGroup, ColumnStyleMap, Row, TableLine, COLUMN_COUNT};

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Modelos";

const PROLOGUE_HEAD: &str = r#"<html xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:x="urn:schemas-microsoft-com:office:excel" xmlns="http://www.w3.org/TR/REC-html40">
<head>
<meta http-equiv="Content-Type" content="text/html; charset=UTF-8">
<meta charset="UTF-8">
"#;

/// Render a header and body as spreadsheet markup.
pub fn render(styles: &ColumnStyleMap, header: &Row, lines: &[TableLine]) -> String {
    let mut out = String::from(PROLOGUE_HEAD);
    write_workbook_block(&mut out);
    write_style_block(&mut out, styles);
    out.push_str("</head>\n<body>\n<table border=\"1\">\n");

    write_header(&mut out, header);
    for line in lines {
        match line {
            TableLine::Data(row) => write_row(&mut out, row),
            TableLine::Separator => {
                let _ = writeln!(out, "<tr><td colspan=\"{}\"></td></tr>", COLUMN_COUNT);
            }
        }
    }

    out.push_str("</table>\n</body>\n</html>\n");
    out
}

fn write_workbook_block(out: &mut String) {
    let _ = write!(
        out,
        "<!--[if gte mso 9]><xml><x:ExcelWorkbook><x:ExcelWorksheets><x:ExcelWorksheet>\
         <x:Name>{}</x:Name><x:WorksheetOptions><x:DisplayGridlines/></x:WorksheetOptions>\
         </x:ExcelWorksheet></x:ExcelWorksheets></x:ExcelWorkbook></xml><![endif]-->\n",
        SHEET_NAME
    );
}

fn write_style_block(out: &mut String, styles: &ColumnStyleMap) {
    out.push_str("<style>\n");
    out.push_str("th { font-weight: bold; }\n");
    out.push_str("td { mso-number-format: \"\\@\"; }\n");
    out.push_str("td.num { mso-number-format: General; text-align: right; }\n");
    out.push_str("td.flag { text-align: center; }\n");
    for (group, color) in styles {
        let _ = writeln!(
            out,
            "th.{} {{ background-color: {}; }}",
            group.css_class(),
            html_escape::encode_text(color)
        );
    }
    out.push_str("</style>\n");
}

fn write_header(out: &mut String, header: &Row) {
    out.push_str("<tr>");
    for (index, cell) in header.cells().iter().enumerate() {
        let _ = write!(
            out,
            "<th class=\"{}\">{}</th>",
            ColumnGroup::of_column(index).css_class(),
            html_escape::encode_quoted_attribute(cell.as_str())
        );
    }
    out.push_str("</tr>\n");
}

fn write_row(out: &mut String, row: &Row) {
    out.push_str("<tr>");
    for cell in row.cells() {
        match cell {
            Cell::Text(value) => {
                let _ = write!(out, "<td>{}</td>", html_escape::encode_quoted_attribute(value));
            }
            Cell::Number(value) => {
                let _ = write!(out, "<td class=\"num\">{}</td>", value);
            }
            Cell::Flag(_) => {
                let _ = write!(out, "<td class=\"flag\">{}</td>", cell.as_str());
            }
        }
    }
    out.push_str("</tr>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_column_styles;

    fn row_with_description(description: &str) -> Row {
        let mut cells = Row::header().0;
        cells[4] = Cell::text(description);
        cells[6] = Cell::Number("600".into());
        cells[9] = Cell::Flag(true);
        Row(cells)
    }

    #[test]
    fn test_prologue_declares_sheet_and_charset() {
        let out = render(&default_column_styles(), &Row::header(), &[]);
        assert!(out.starts_with("<html xmlns:o="));
        assert!(out.contains("charset=UTF-8"));
        assert!(out.contains("<x:Name>Modelos</x:Name>"));
        assert!(out.contains("th.col-edge { background-color: #FCE4D6; }"));
        assert!(out.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_header_cells_carry_group_class() {
        let out = render(&default_column_styles(), &Row::header(), &[]);
        assert!(out.contains("<th class=\"col-id\">NUM.</th>"));
        assert!(out.contains("<th class=\"col-mat\">ESP.</th>"));
        assert_eq!(out.matches("<th ").count(), COLUMN_COUNT);
    }

    #[test]
    fn test_text_cells_escaped() {
        let row = row_with_description("Porta <vidro> & \"puxador\"");
        let out = render(&default_column_styles(), &Row::header(), &[TableLine::Data(row)]);

        assert!(out.contains("Porta &lt;vidro&gt; &amp; "));
        assert!(!out.contains("<vidro>"));
        assert!(!out.contains("\"puxador\""));
    }

    #[test]
    fn test_number_and_flag_cells_raw() {
        let row = row_with_description("Lateral");
        let out = render(&default_column_styles(), &Row::header(), &[TableLine::Data(row)]);

        assert!(out.contains("<td class=\"num\">600</td>"));
        assert!(out.contains("<td class=\"flag\">X</td>"));
    }

    #[test]
    fn test_separator_spans_all_columns() {
        let lines = vec![
            TableLine::Data(row_with_description("a")),
            TableLine::Separator,
            TableLine::Data(row_with_description("b")),
        ];
        let out = render(&default_column_styles(), &Row::header(), &lines);
        assert_eq!(out.matches("<td colspan=\"16\"></td>").count(), 1);
    }
}
