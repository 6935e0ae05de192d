//! Document-analysis block graph, in the shape the analysis service returns it.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level analysis response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalyzeDocumentResponse {
    /// All blocks in the document, in service order.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl AnalyzeDocumentResponse {
    /// Decode a response from its JSON text.
    ///
    /// Accepts either the full envelope (`{"Blocks": [...]}`) or a bare
    /// array of blocks.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_array() {
            let blocks: Vec<Block> = serde_json::from_value(value)?;
            return Ok(Self { blocks });
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// A node in the layout graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    /// Unique id. Blocks without one cannot be referenced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Kind of block.
    #[serde(default)]
    pub block_type: BlockType,

    /// Recognized text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Entity roles (KEY / VALUE for form fields).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<EntityType>,

    /// Outgoing edges, in service order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: Some(id.into()),
            block_type,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entity_types.push(entity);
        self
    }

    pub fn with_relationship<I, S>(mut self, rel_type: RelationshipType, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationships.push(Relationship {
            rel_type,
            ids: ids.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Whether this block is the KEY side of a form field.
    pub fn is_key(&self) -> bool {
        self.block_type == BlockType::KeyValueSet && self.entity_types.contains(&EntityType::Key)
    }

    /// Target ids of the first relationship of the given type.
    pub fn targets(&self, rel_type: RelationshipType) -> Option<&[String]> {
        self.relationships
            .iter()
            .find(|r| r.rel_type == rel_type)
            .map(|r| r.ids.as_slice())
    }
}

/// Block kinds produced by the analysis service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Page,
    Line,
    Word,
    KeyValueSet,
    Table,
    Cell,
    SelectionElement,
    /// Anything this crate does not interpret.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Entity role of a KEY_VALUE_SET block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Key,
    Value,
    #[serde(other)]
    Other,
}

/// A typed edge list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Relationship {
    #[serde(rename = "Type", default)]
    pub rel_type: RelationshipType,

    #[serde(default)]
    pub ids: Vec<String>,
}

/// Edge kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Child,
    Value,
    #[default]
    #[serde(other)]
    Other,
}
