//! Reference resolution.
//!
//! A piece carries its derived attributes as child elements of a
//! `REFERENCES` block, one element per attribute, each with the value in a
//! `REFERENCE` attribute:
//!
//! ```xml
//! <ITEM ...>
//!   <REFERENCES>
//!     <MATERIAL REFERENCE="MDF"/>
//!     <MODEL REFERENCE="Branco TX"/>
//!     <THICKNESS REFERENCE="15"/>
//!     <FITA_BORDA_1 REFERENCE="1"/>
//!     <COR_FITA_DE_BORDA REFERENCE="Branco"/>
//!   </REFERENCES>
//! </ITEM>
//! ```

use roxmltree::Node;

use crate::models::EdgeFlags;

const REFERENCES_TAG: &str = "REFERENCES";
const VALUE_ATTR: &str = "REFERENCE";
/// The only value that switches an edge band on.
const EDGE_ON: &str = "1";

/// What a reference element describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Material,
    Color,
    Thickness,
    SheetWidth,
    SheetHeight,
    /// 1 bottom, 2 top, 3 right, 4 left.
    Edge(u8),
    EdgeColor,
}

impl ReferenceKind {
    /// Classify a reference tag; unknown tags yield `None`.
    pub fn classify(tag: &str) -> Option<Self> {
        let tag = tag.to_ascii_uppercase();
        let kind = match tag.as_str() {
            "MATERIAL" => ReferenceKind::Material,
            "MODEL" | "COLOR" => ReferenceKind::Color,
            "THICKNESS" => ReferenceKind::Thickness,
            "SHEET_WIDTH" => ReferenceKind::SheetWidth,
            "SHEET_HEIGHT" => ReferenceKind::SheetHeight,
            "COR_FITA_DE_BORDA" => ReferenceKind::EdgeColor,
            other => {
                let ordinal = other.strip_prefix("FITA_BORDA_")?.parse::<u8>().ok()?;
                if !(1..=4).contains(&ordinal) {
                    return None;
                }
                ReferenceKind::Edge(ordinal)
            }
        };
        Some(kind)
    }
}

/// Flat attribute set resolved from a piece's references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedReferences {
    pub material: String,
    pub color: String,
    pub thickness: String,
    pub sheet_width: String,
    pub sheet_height: String,
    pub edges: EdgeFlags,
    /// `Some` whenever an edge-colour element exists, even with an empty value.
    pub edge_color: Option<String>,
}

impl ResolvedReferences {
    /// Edge colour: the explicit override if present, else the piece colour.
    pub fn edge_color_label(&self) -> String {
        self.edge_color.clone().unwrap_or_else(|| self.color.clone())
    }
}

/// Resolve the reference elements of one piece element.
///
/// Only the piece's own `REFERENCES` block is read; nested pieces carry
/// their own. A repeated tag overwrites the earlier value.
pub fn resolve(item: Node) -> ResolvedReferences {
    let mut resolved = ResolvedReferences::default();

    let references = item
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == REFERENCES_TAG)
        .flat_map(|block| block.children().filter(|n| n.is_element()));

    for reference in references {
        let Some(kind) = ReferenceKind::classify(reference.tag_name().name()) else {
            continue;
        };
        let value = reference.attribute(VALUE_ATTR).unwrap_or("").to_string();

        match kind {
            ReferenceKind::Material => resolved.material = value,
            ReferenceKind::Color => resolved.color = value,
            ReferenceKind::Thickness => resolved.thickness = value,
            ReferenceKind::SheetWidth => resolved.sheet_width = value,
            ReferenceKind::SheetHeight => resolved.sheet_height = value,
            ReferenceKind::Edge(ordinal) => resolved.edges.set(ordinal, value == EDGE_ON),
            ReferenceKind::EdgeColor => resolved.edge_color = Some(value),
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn resolve_str(xml: &str) -> ResolvedReferences {
        let doc = parse_document(xml).unwrap();
        resolve(doc.root_element())
    }

    #[test]
    fn test_classify() {
        assert_eq!(ReferenceKind::classify("MATERIAL"), Some(ReferenceKind::Material));
        assert_eq!(ReferenceKind::classify("model"), Some(ReferenceKind::Color));
        assert_eq!(ReferenceKind::classify("FITA_BORDA_3"), Some(ReferenceKind::Edge(3)));
        assert_eq!(ReferenceKind::classify("FITA_BORDA_5"), None);
        assert_eq!(ReferenceKind::classify("FITA_BORDA_X"), None);
        assert_eq!(ReferenceKind::classify("PRICE"), None);
    }

    #[test]
    fn test_resolve_full_set() {
        let refs = resolve_str(
            r#"<ITEM>
                <REFERENCES>
                    <MATERIAL REFERENCE="MDF"/>
                    <MODEL REFERENCE="Branco TX"/>
                    <THICKNESS REFERENCE="15"/>
                    <SHEET_WIDTH REFERENCE="2750"/>
                    <SHEET_HEIGHT REFERENCE="1850"/>
                    <FITA_BORDA_1 REFERENCE="1"/>
                    <FITA_BORDA_2 REFERENCE="0"/>
                    <FITA_BORDA_3 REFERENCE=""/>
                    <FITA_BORDA_4 REFERENCE="1"/>
                    <UNKNOWN_REF REFERENCE="ignored"/>
                </REFERENCES>
            </ITEM>"#,
        );

        assert_eq!(refs.material, "MDF");
        assert_eq!(refs.color, "Branco TX");
        assert_eq!(refs.thickness, "15");
        assert_eq!(refs.sheet_width, "2750");
        assert_eq!(refs.sheet_height, "1850");
        assert_eq!(refs.edges.as_array(), [true, false, false, true]);
        assert_eq!(refs.edge_color, None);
        assert_eq!(refs.edge_color_label(), "Branco TX");
    }

    #[test]
    fn test_edge_flag_only_on_literal_one() {
        let refs = resolve_str(
            r#"<ITEM><REFERENCES>
                <FITA_BORDA_1 REFERENCE=" 1"/>
                <FITA_BORDA_2 REFERENCE="true"/>
                <FITA_BORDA_3/>
            </REFERENCES></ITEM>"#,
        );
        assert_eq!(refs.edges.as_array(), [false, false, false, false]);
    }

    #[test]
    fn test_edge_color_override() {
        let refs = resolve_str(
            r#"<ITEM><REFERENCES>
                <MODEL REFERENCE="Carvalho"/>
                <COR_FITA_DE_BORDA REFERENCE="Preto"/>
            </REFERENCES></ITEM>"#,
        );
        assert_eq!(refs.edge_color_label(), "Preto");
    }

    #[test]
    fn test_empty_edge_color_override_is_honored() {
        let refs = resolve_str(
            r#"<ITEM><REFERENCES>
                <MODEL REFERENCE="Carvalho"/>
                <COR_FITA_DE_BORDA REFERENCE=""/>
            </REFERENCES></ITEM>"#,
        );
        assert_eq!(refs.edge_color, Some(String::new()));
        assert_eq!(refs.edge_color_label(), "");
    }

    #[test]
    fn test_nested_item_references_not_inherited() {
        let refs = resolve_str(
            r#"<ITEM>
                <ITEM><REFERENCES><MATERIAL REFERENCE="Vidro"/></REFERENCES></ITEM>
            </ITEM>"#,
        );
        assert_eq!(refs, ResolvedReferences::default());
    }

    #[test]
    fn test_no_references() {
        assert_eq!(resolve_str("<ITEM/>"), ResolvedReferences::default());
    }
}
