//! Key/value flattening of document-analysis block graphs.
//!
//! Blocks are indexed by id once; every edge is followed through the index
//! with an existence check and the walk is at most two levels deep (key to
//! value to value children), so dangling ids and cycles cannot derail it.

mod key_values;
mod record;

pub use key_values::KeyValueMap;
pub use record::record_from_key_values;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::block::{Block, BlockType, RelationshipType};

/// Graph path output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExtraction {
    /// Form fields in discovery order.
    pub key_values: KeyValueMap,
    /// Text of every LINE block, in block order.
    pub lines: Vec<String>,
}

/// Id-indexed view over a block collection.
pub struct GraphKeyValueExtractor<'a> {
    blocks: &'a [Block],
    by_id: HashMap<&'a str, &'a Block>,
}

impl<'a> GraphKeyValueExtractor<'a> {
    /// Index `blocks` by id. A repeated id resolves to its last block.
    pub fn new(blocks: &'a [Block]) -> Self {
        let by_id = blocks
            .iter()
            .filter_map(|b| b.id.as_deref().map(|id| (id, b)))
            .collect();

        Self { blocks, by_id }
    }

    /// Flatten KEY blocks into label → value pairs.
    pub fn key_values(&self) -> KeyValueMap {
        let mut map = KeyValueMap::new();

        for block in self.blocks.iter().filter(|b| b.is_key() && !b.relationships.is_empty()) {
            let key = self.child_text(block);
            if key.is_empty() {
                continue;
            }

            let value = block
                .targets(RelationshipType::Value)
                .and_then(|ids| ids.first())
                .and_then(|id| self.lookup(id))
                .filter(|v| v.block_type == BlockType::KeyValueSet)
                .map(|v| self.child_text(v))
                .unwrap_or_default();

            if let Some(previous) = map.insert(key.clone(), value) {
                debug!("Key {:?} seen again, replacing {:?}", key, previous);
            }
        }

        map
    }

    /// Text of every LINE block, in block order.
    pub fn lines(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| b.block_type == BlockType::Line)
            .filter_map(|b| b.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn extract(&self) -> GraphExtraction {
        GraphExtraction {
            key_values: self.key_values(),
            lines: self.lines(),
        }
    }

    fn lookup(&self, id: &str) -> Option<&'a Block> {
        self.by_id.get(id).copied()
    }

    /// Space-joined text of the first CHILD relationship's targets.
    fn child_text(&self, block: &Block) -> String {
        let Some(ids) = block.targets(RelationshipType::Child) else {
            return String::new();
        };

        let words: Vec<&str> = ids
            .iter()
            .filter_map(|id| self.lookup(id))
            .filter_map(|child| child.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        words.join(" ")
    }
}
