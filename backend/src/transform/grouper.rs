//! Group extracted pieces into furniture modules.
//!
//! Grouping is by first occurrence, not by sort order:
//!
//! ```text
//! Pieces (document order)          →  Modules
//! ┌──────────────────────┐            ┌──────────────────┐
//! │ A  key=M1            │            │ M1: [A, C]       │
//! │ B  key=M2            │     →      ├──────────────────┤
//! │ C  key=M1            │            │ M2: [B]          │
//! └──────────────────────┘            └──────────────────┘
//! ```
//!
//! The key is the piece's `uniqueId`, else its description, else
//! [`UNKNOWN_MODULE_KEY`]. Unique ids and descriptions are prefixed so a
//! description never joins the module of an equal unique id.

use std::collections::HashMap;

use crate::models::{Module, Piece};

/// Key shared by pieces with neither unique id nor description.
pub const UNKNOWN_MODULE_KEY: &str = "__unknown_module__";

const UNIQUE_ID_PREFIX: &str = "uid:";
const DESCRIPTION_PREFIX: &str = "desc:";

/// Grouping key of a piece.
pub fn module_key(piece: &Piece) -> String {
    if !piece.unique_id.is_empty() {
        format!("{}{}", UNIQUE_ID_PREFIX, piece.unique_id)
    } else if !piece.description.is_empty() {
        format!("{}{}", DESCRIPTION_PREFIX, piece.description)
    } else {
        UNKNOWN_MODULE_KEY.to_string()
    }
}

/// Display header built from a module's first piece.
///
/// Empty when the piece has no id or no description.
pub fn module_header(piece: &Piece) -> String {
    if piece.id.is_empty() || piece.description.is_empty() {
        return String::new();
    }
    format!(
        "({}) - {} - L.{}mm x A.{}mm x P.{}mm",
        piece.id, piece.description, piece.width.raw, piece.height.raw, piece.depth.raw
    )
}

/// Partition pieces into modules, keeping first-seen module order and
/// document order inside each module.
pub fn group_modules(pieces: Vec<Piece>) -> Vec<Module> {
    let (modules, _) = pieces.into_iter().fold(
        (Vec::<Module>::new(), HashMap::<String, usize>::new()),
        |(mut modules, mut index), piece| {
            let key = module_key(&piece);
            match index.get(&key) {
                Some(&slot) => modules[slot].pieces.push(piece),
                None => {
                    index.insert(key.clone(), modules.len());
                    modules.push(Module {
                        key,
                        header: module_header(&piece),
                        pieces: vec![piece],
                    });
                }
            }
            (modules, index)
        },
    );
    modules
}

/// Wrap pieces in a single header-less module without regrouping.
pub fn single_module(pieces: Vec<Piece>) -> Vec<Module> {
    if pieces.is_empty() {
        return Vec::new();
    }
    vec![Module {
        key: String::new(),
        header: String::new(),
        pieces,
    }]
}
