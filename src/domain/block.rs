//! Block graph returned by the document-analysis service.
//!
//! A response is a flat list of [`Block`]s that reference each other by id
//! through [`Relationship`] edges. Blocks are plain data: traversal always goes
//! through an id lookup (see [`crate::extraction::BlockIndex`]), never through
//! owned references between blocks.
//!
//! Deserialization follows the service's JSON shape (`BlockType`, `Id`,
//! `Relationships`, ...) and is lenient per field: a field that is missing or
//! has an unexpected type falls back to its default instead of failing the
//! whole response. List fields are lenient per entry, so one malformed
//! relationship or role does not discard its siblings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Kind of an analyzed region.
///
/// The set is open: tags this crate does not interpret are kept in
/// [`BlockType::Unknown`] and ignored by reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Page,
    Line,
    Word,
    KeyValueSet,
    Table,
    Cell,
    SelectionElement,
    Unknown(String),
}

impl BlockType {
    /// Wire tag of this block type.
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Page => "PAGE",
            BlockType::Line => "LINE",
            BlockType::Word => "WORD",
            BlockType::KeyValueSet => "KEY_VALUE_SET",
            BlockType::Table => "TABLE",
            BlockType::Cell => "CELL",
            BlockType::SelectionElement => "SELECTION_ELEMENT",
            BlockType::Unknown(tag) => tag,
        }
    }
}

impl Default for BlockType {
    fn default() -> Self {
        BlockType::Unknown(String::new())
    }
}

impl From<&str> for BlockType {
    fn from(tag: &str) -> Self {
        match tag {
            "PAGE" => BlockType::Page,
            "LINE" => BlockType::Line,
            "WORD" => BlockType::Word,
            "KEY_VALUE_SET" => BlockType::KeyValueSet,
            "TABLE" => BlockType::Table,
            "CELL" => BlockType::Cell,
            "SELECTION_ELEMENT" => BlockType::SelectionElement,
            other => BlockType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        BlockType::from(tag.as_str())
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        block_type.as_str().to_string()
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a relationship edge between blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    /// Key block to the value block(s) it labels.
    Value,
    /// Container to its constituent blocks (cell to words, line to words).
    Child,
    Other(String),
}

impl RelationshipType {
    /// Wire tag of this relationship type.
    pub fn as_str(&self) -> &str {
        match self {
            RelationshipType::Value => "VALUE",
            RelationshipType::Child => "CHILD",
            RelationshipType::Other(tag) => tag,
        }
    }
}

impl Default for RelationshipType {
    fn default() -> Self {
        RelationshipType::Other(String::new())
    }
}

impl From<&str> for RelationshipType {
    fn from(tag: &str) -> Self {
        match tag {
            "VALUE" => RelationshipType::Value,
            "CHILD" => RelationshipType::Child,
            other => RelationshipType::Other(other.to_string()),
        }
    }
}

impl From<String> for RelationshipType {
    fn from(tag: String) -> Self {
        RelationshipType::from(tag.as_str())
    }
}

impl From<RelationshipType> for String {
    fn from(kind: RelationshipType) -> Self {
        kind.as_str().to_string()
    }
}

/// Role of a `KEY_VALUE_SET` block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Key,
    Value,
    Other(String),
}

impl From<String> for EntityType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "KEY" => EntityType::Key,
            "VALUE" => EntityType::Value,
            _ => EntityType::Other(tag),
        }
    }
}

impl From<EntityType> for String {
    fn from(role: EntityType) -> Self {
        match role {
            EntityType::Key => "KEY".to_string(),
            EntityType::Value => "VALUE".to_string(),
            EntityType::Other(tag) => tag,
        }
    }
}

/// One outgoing edge set of a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "Type", default, deserialize_with = "lenient")]
    pub kind: RelationshipType,
    /// Target block ids, in reading order.
    #[serde(rename = "Ids", default, deserialize_with = "lenient_seq")]
    pub ids: Vec<String>,
}

impl Relationship {
    /// Creates a relationship of the given kind.
    pub fn new<I, S>(kind: RelationshipType, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// One annotated region of an analyzed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub block_type: BlockType,
    /// Text payload, present on text-bearing blocks (WORD, LINE).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq", skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<EntityType>,
    #[serde(default, deserialize_with = "lenient_seq", skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    /// 1-based row of a CELL block.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,
    /// 1-based column of a CELL block.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,
}

impl Block {
    /// Creates a block with the given id and type and no payload.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            ..Default::default()
        }
    }

    /// Sets the text payload.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds an entity role.
    pub fn with_entity_type(mut self, role: EntityType) -> Self {
        self.entity_types.push(role);
        self
    }

    /// Appends a relationship entry.
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Sets the cell position.
    pub fn with_cell_position(mut self, row: u32, column: u32) -> Self {
        self.row_index = Some(row);
        self.column_index = Some(column);
        self
    }

    /// Whether this is a KEY-role `KEY_VALUE_SET` block.
    pub fn is_key(&self) -> bool {
        self.block_type == BlockType::KeyValueSet && self.entity_types.contains(&EntityType::Key)
    }

    /// Ids of every relationship entry of `kind`, entries in order, ids in order.
    pub fn related_ids<'a>(
        &'a self,
        kind: &'a RelationshipType,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.relationships
            .iter()
            .filter(move |rel| &rel.kind == kind)
            .flat_map(|rel| rel.ids.iter().map(String::as_str))
    }
}

/// Deserializes `T`, replacing a malformed value with `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Deserializes a list element by element, dropping only malformed entries.
///
/// A value that is not a list at all becomes an empty list.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => Ok(skip_malformed(items)),
        _ => Ok(Vec::new()),
    }
}

/// Converts each element to `T`, logging and skipping the ones that do not fit.
pub(crate) fn skip_malformed<T: DeserializeOwned>(items: Vec<serde_json::Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(index, error = %e, "skipping malformed list entry");
                None
            }
        })
        .collect()
}
