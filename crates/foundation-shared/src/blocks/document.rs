use std::collections::HashSet;
use std::fmt;

use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::content::{BlockContent, OpaqueBlock};
use super::registry::BlockType;
use super::BlockError;

/// Identifier of a block, unique within its document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub id: BlockId,
    pub content: BlockContent,
}

impl ContentBlock {
    pub fn new(ty: BlockType) -> Self {
        Self {
            id: BlockId::generate(),
            content: ty.default_content(),
        }
    }

    pub fn with_content(id: impl Into<BlockId>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            content,
        }
    }

    pub fn block_type(&self) -> Option<BlockType> {
        self.content.block_type()
    }

    /// Build a block from one stored array element. Returns `None` when the
    /// element is not a JSON object.
    ///
    /// Unknown tags and content that does not fit its tag's schema become
    /// [`BlockContent::Opaque`] so nothing is lost on the next save.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut raw) = value else {
            return None;
        };

        let id = match raw.get("id") {
            Some(Value::String(id)) if !id.is_empty() => BlockId(id.clone()),
            Some(Value::Number(id)) => BlockId(id.to_string()),
            _ => {
                let id = BlockId::generate();
                tracing::warn!(block_id = %id, "stored block has no id; assigned a new one");
                raw.insert("id".to_string(), Value::String(id.0.clone()));
                id
            }
        };

        let tag = raw.get("type").and_then(Value::as_str).unwrap_or_default();
        match BlockType::from_tag(tag) {
            Some(ty) => {
                let content = match raw.get("content") {
                    None | Some(Value::Null) => Value::Object(Map::new()),
                    Some(content) => content.clone(),
                };
                match BlockContent::parse(ty, content) {
                    Ok(content) => return Some(Self { id, content }),
                    Err(e) => tracing::warn!(
                        block_id = %id,
                        block_type = %ty,
                        "block content does not match its schema, keeping it verbatim: {e}"
                    ),
                }
            }
            None => tracing::debug!(block_id = %id, tag, "unsupported block type"),
        }

        Some(Self {
            id,
            content: BlockContent::Opaque(OpaqueBlock { raw }),
        })
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.content {
            BlockContent::Opaque(opaque) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("id", &self.id)?;
                for (key, value) in opaque.raw.iter().filter(|(key, _)| *key != "id") {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            content => {
                let mut block = serializer.serialize_struct("ContentBlock", 3)?;
                block.serialize_field("id", &self.id)?;
                block.serialize_field("type", content.type_tag())?;
                block.serialize_field("content", content)?;
                block.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).ok_or_else(|| D::Error::custom("content block must be an object"))
    }
}

/// Ordered blocks making up the body of a project or blog post.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContentDocument {
    blocks: Vec<ContentBlock>,
}

impl ContentDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap decoded blocks, giving a fresh id to any block whose id was
    /// already taken earlier in the sequence.
    pub fn from_blocks(mut blocks: Vec<ContentBlock>) -> Self {
        let mut seen = HashSet::with_capacity(blocks.len());
        for block in &mut blocks {
            if !seen.insert(block.id.clone()) {
                let fresh = BlockId::generate();
                tracing::warn!(
                    duplicate = %block.id,
                    replacement = %fresh,
                    "duplicate block id in document"
                );
                block.id = fresh;
                seen.insert(block.id.clone());
            }
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &BlockId) -> Option<&ContentBlock> {
        self.blocks.iter().find(|block| &block.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &BlockId) -> Option<&mut ContentBlock> {
        self.blocks.iter_mut().find(|block| &block.id == id)
    }

    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| &block.id == id)
    }

    /// Blocks whose type is not in the registry (hidden from authors).
    pub fn unsupported_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.content.is_opaque()).count()
    }

    /// Append a block of `ty` with default content and return its id.
    pub fn add_block(&mut self, ty: BlockType) -> BlockId {
        let mut block = ContentBlock::new(ty);
        while self.get(&block.id).is_some() {
            block.id = BlockId::generate();
        }
        let id = block.id.clone();
        self.blocks.push(block);
        id
    }

    /// Shallow-merge `patch` into the content of block `id`. Keys absent
    /// from the patch keep their current value.
    pub fn update_block(&mut self, id: &BlockId, patch: &Map<String, Value>) -> Result<(), BlockError> {
        let block = self
            .get_mut(id)
            .ok_or_else(|| BlockError::BlockNotFound(id.clone()))?;
        let ty = block
            .block_type()
            .ok_or_else(|| BlockError::Unsupported(block.content.type_tag().to_string()))?;

        let mut value = block.content.to_value().map_err(|e| BlockError::InvalidPatch {
            block_type: ty,
            reason: e.to_string(),
        })?;
        let fields = value.as_object_mut().ok_or_else(|| BlockError::InvalidPatch {
            block_type: ty,
            reason: "content is not an object".to_string(),
        })?;
        for (key, new_value) in patch {
            let slot = fields.get_mut(key).ok_or_else(|| BlockError::UnknownField {
                block_type: ty,
                field: key.clone(),
            })?;
            *slot = new_value.clone();
        }

        block.content = BlockContent::parse(ty, value).map_err(|e| BlockError::InvalidPatch {
            block_type: ty,
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Remove block `id`. Missing ids are ignored.
    pub fn remove_block(&mut self, id: &BlockId) -> Option<ContentBlock> {
        let index = self.position(id)?;
        Some(self.blocks.remove(index))
    }

    /// Take the block at `from` out and reinsert it at `to` in the remaining
    /// sequence. Both indices must be in range.
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<(), BlockError> {
        let len = self.blocks.len();
        if from >= len || to >= len {
            return Err(BlockError::IndexOutOfRange {
                index: from.max(to),
                len,
            });
        }
        if from == to {
            return Ok(());
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        Ok(())
    }
}

impl<'de> Deserialize<'de> for ContentDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let blocks = Vec::<ContentBlock>::deserialize(deserializer)?;
        Ok(Self::from_blocks(blocks))
    }
}

impl<'a> IntoIterator for &'a ContentDocument {
    type Item = &'a ContentBlock;
    type IntoIter = std::slice::Iter<'a, ContentBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
