//! Piece extraction.
//!
//! Builds one [`Piece`] per element matched by the detected strategy:
//!
//! - **Items**: every `ITEM` element, in document order, minus hardware and
//!   consumables (family filter), with references resolved.
//! - **Categories**: one placeholder piece per category × model
//!   (× model type). No family filter, no quantities, no references.
//! - **Fallback**: no pieces; the pipeline supplies a sample row.

use roxmltree::{Document, Node};
use serde::Serialize;

use super::detector::{has_tag_ignore_case, is_item, CATEGORY_TAG, MODEL_TAG, MODEL_TYPE_TAG};
use super::references;
use crate::models::{Dimension, EdgeFlags, Piece, PieceOrigin, Strategy};

/// Family keyword stems, already folded, that drop a piece from the export.
/// Stems match singular and plural ("ferragem", "ferragens").
pub const EXCLUDED_FAMILY_KEYWORDS: [&str; 4] = ["acessorio", "ferrage", "processo", "puxador"];

const UNKNOWN_CATEGORY: &str = "Unknown Category";
const UNKNOWN_MODEL: &str = "Unknown Model";

/// Pieces produced by one extraction pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    pub pieces: Vec<Piece>,
    /// Items dropped by the family filter.
    pub excluded: usize,
}

/// Extract pieces for the given strategy.
pub fn extract(doc: &Document, strategy: Strategy) -> Extraction {
    match strategy {
        Strategy::Items => extract_items(doc),
        Strategy::Categories => Extraction {
            pieces: extract_categories(doc),
            excluded: 0,
        },
        Strategy::Fallback => Extraction::default(),
    }
}

// =============================================================================
// Item schema
// =============================================================================

/// Build pieces from every `ITEM` element.
pub fn extract_items(doc: &Document) -> Extraction {
    let mut extraction = Extraction::default();

    for node in doc.root().descendants().filter(|n| is_item(*n)) {
        let family = attr(node, "FAMILY");
        if is_excluded_family(family) {
            extraction.excluded += 1;
            continue;
        }
        extraction.pieces.push(build_item(node));
    }

    extraction
}

fn build_item(node: Node) -> Piece {
    let refs = references::resolve(node);
    let edge_color_label = refs.edge_color_label();

    Piece {
        id: attr(node, "ID").to_string(),
        unique_id: attr(node, "UNIQUEID").to_string(),
        description: attr(node, "DESCRIPTION").to_string(),
        observations: attr(node, "OBSERVATIONS").to_string(),
        family: attr(node, "FAMILY").to_string(),
        width: Dimension::parse(attr(node, "WIDTH")),
        height: Dimension::parse(attr(node, "HEIGHT")),
        depth: Dimension::parse(attr(node, "DEPTH")),
        quantity: parse_multiplier(node.attribute("QUANTITY")),
        repetition: parse_multiplier(node.attribute("REPETITION")),
        material: refs.material,
        color_label: refs.color,
        thickness: refs.thickness,
        sheet_width: refs.sheet_width,
        sheet_height: refs.sheet_height,
        edges: refs.edges,
        edge_color_label,
        origin: PieceOrigin::Item,
    }
}

fn attr<'a>(node: Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or("")
}

/// Base-10 non-negative integer; absent or unparsable becomes 1.
pub fn parse_multiplier(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(1)
}

/// Whether a family names hardware or consumables rather than a cut part.
pub fn is_excluded_family(family: &str) -> bool {
    if family.is_empty() {
        return false;
    }
    let folded = fold_accents(&family.to_lowercase());
    EXCLUDED_FAMILY_KEYWORDS
        .iter()
        .any(|keyword| folded.contains(keyword))
}

/// Strip the Latin diacritics that show up in Portuguese family names.
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

// =============================================================================
// Category schema
// =============================================================================

/// Build placeholder pieces from model-category containers.
pub fn extract_categories(doc: &Document) -> Vec<Piece> {
    let mut pieces = Vec::new();

    let categories = doc
        .root()
        .descendants()
        .filter(|n| has_tag_ignore_case(n, CATEGORY_TAG));

    for category in categories {
        let category_desc = attr_ignore_case(category, "DESCRIPTION")
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_CATEGORY);

        let models = category
            .descendants()
            .filter(|n| has_tag_ignore_case(n, MODEL_TAG));

        for model in models {
            let model_desc = attr_ignore_case(model, "DESCRIPTION")
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_MODEL);
            let model_id = attr_ignore_case(model, "ID").unwrap_or("");

            let types: Vec<Node> = model
                .descendants()
                .filter(|n| has_tag_ignore_case(n, MODEL_TYPE_TAG))
                .collect();

            if types.is_empty() {
                pieces.push(category_piece(model_id, category_desc, model_desc, None));
            } else {
                for model_type in types {
                    let type_desc = attr_ignore_case(model_type, "DESCRIPTION")
                        .unwrap_or("")
                        .to_string();
                    pieces.push(category_piece(
                        model_id,
                        category_desc,
                        model_desc,
                        Some(type_desc),
                    ));
                }
            }
        }
    }

    pieces
}

fn category_piece(id: &str, category: &str, model: &str, model_type: Option<String>) -> Piece {
    Piece {
        id: id.to_string(),
        unique_id: String::new(),
        description: model.to_string(),
        observations: String::new(),
        family: String::new(),
        width: Dimension::default(),
        height: Dimension::default(),
        depth: Dimension::default(),
        quantity: 1,
        repetition: 1,
        material: String::new(),
        color_label: String::new(),
        thickness: String::new(),
        sheet_width: String::new(),
        sheet_height: String::new(),
        edges: EdgeFlags::default(),
        edge_color_label: String::new(),
        origin: PieceOrigin::Category {
            category: category.to_string(),
            model_type,
        },
    }
}

/// First attribute whose name matches ignoring ASCII case.
fn attr_ignore_case<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name().eq_ignore_ascii_case(name))
        .map(|a| a.value())
}
