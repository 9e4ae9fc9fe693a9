//! Schema detection.
//!
//! Strategies are tried in fixed priority order, first match wins:
//!
//! ```text
//! ITEM elements anywhere?            → Items
//! model-category containers?         → Categories
//! otherwise                          → Fallback
//! ```

use roxmltree::{Document, Node};

use crate::models::Strategy;

/// Piece element tag, matched case-sensitively.
pub const ITEM_TAG: &str = "ITEM";
/// Legacy category container tag, matched case-insensitively.
pub const CATEGORY_TAG: &str = "MODELCATEGORYINFORMATION";
/// Model element nested in a category.
pub const MODEL_TAG: &str = "MODELINFORMATION";
/// Optional model-type element nested in a model.
pub const MODEL_TYPE_TAG: &str = "MODELTYPEINFORMATION";

/// Pick the extraction strategy for a parsed document.
pub fn detect(doc: &Document) -> Strategy {
    let root = doc.root();
    if root.descendants().any(is_item) {
        Strategy::Items
    } else if root.descendants().any(|n| has_tag_ignore_case(&n, CATEGORY_TAG)) {
        Strategy::Categories
    } else {
        Strategy::Fallback
    }
}

pub(crate) fn is_item(node: Node) -> bool {
    node.is_element() && node.tag_name().name() == ITEM_TAG
}

/// Element whose local name equals `tag` ignoring ASCII case.
pub(crate) fn has_tag_ignore_case(node: &Node, tag: &str) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(tag)
}
