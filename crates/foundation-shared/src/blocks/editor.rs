//! Authoring surface over a [`ContentDocument`]: block add/update/remove,
//! drag-and-drop reordering and row editing of the repeatable groups inside
//! a block.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::content::BlockContent;
use super::document::{BlockId, ContentBlock, ContentDocument};
use super::registry::{BlockType, ListSchema};
use super::BlockError;

/// Stable key of a row inside a repeatable group, for UI diffing.
/// Never persisted; the stored shape is a plain array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RowKey(u64);

/// Location of a repeatable group inside a block's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListPath {
    /// A top-level list field such as `stats` or `items`.
    Field(String),
    /// A list inside one row of a top-level list, such as
    /// `categories[2].services`.
    Nested {
        outer: String,
        row: usize,
        inner: String,
    },
}

impl ListPath {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn nested(outer: impl Into<String>, row: usize, inner: impl Into<String>) -> Self {
        Self::Nested {
            outer: outer.into(),
            row,
            inner: inner.into(),
        }
    }

    fn outer(&self) -> &str {
        match self {
            Self::Field(field) => field,
            Self::Nested { outer, .. } => outer,
        }
    }
}

impl fmt::Display for ListPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => f.write_str(field),
            Self::Nested { outer, row, inner } => write!(f, "{outer}[{row}].{inner}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct KeySlot {
    block: BlockId,
    field: &'static str,
    parent: Option<RowKey>,
}

struct Target {
    ty: BlockType,
    schema: &'static ListSchema,
    slot: KeySlot,
    value: Value,
}

#[derive(Debug, Default)]
pub struct BlockEditor {
    document: ContentDocument,
    drag_source: Option<usize>,
    row_keys: HashMap<KeySlot, Vec<RowKey>>,
    next_key: u64,
}

impl BlockEditor {
    pub fn new(document: ContentDocument) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    pub fn document(&self) -> &ContentDocument {
        &self.document
    }

    pub fn into_document(self) -> ContentDocument {
        self.document
    }

    /// Blocks the author sees. Blocks of unsupported types stay in the
    /// document but are not offered for editing.
    pub fn visible_blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.document.iter().filter(|block| !block.content.is_opaque())
    }

    pub fn unsupported_count(&self) -> usize {
        self.document.unsupported_count()
    }

    pub fn add_block(&mut self, ty: BlockType) -> BlockId {
        self.document.add_block(ty)
    }

    pub fn update_block(
        &mut self,
        id: &BlockId,
        patch: &serde_json::Map<String, Value>,
    ) -> Result<(), BlockError> {
        self.document.update_block(id, patch)
    }

    pub fn remove_block(&mut self, id: &BlockId) -> Option<ContentBlock> {
        let removed = self.document.remove_block(id)?;
        self.row_keys.retain(|slot, _| &slot.block != id);
        // indices shifted under any drag in progress
        self.drag_source = None;
        Some(removed)
    }

    /// Visible index of the block being dragged.
    pub fn drag_source(&self) -> Option<usize> {
        self.drag_source
    }

    /// Record the block at visible `index` as the one being dragged. Drag
    /// indices count only the blocks returned by [`Self::visible_blocks`].
    pub fn drag_start(&mut self, index: usize) -> bool {
        if index >= self.visible_len() {
            return false;
        }
        self.drag_source = Some(index);
        true
    }

    /// Whether `index` is a valid drop target right now. Never mutates.
    pub fn drag_over(&self, index: usize) -> bool {
        self.drag_source.is_some() && index < self.visible_len()
    }

    /// Finish a drag on visible position `target`. Returns whether the
    /// document changed. Hidden blocks keep their place among the others.
    pub fn drop_on(&mut self, target: usize) -> Result<bool, BlockError> {
        let Some(source) = self.drag_source.take() else {
            return Ok(false);
        };
        if source == target {
            return Ok(false);
        }
        let out_of_range = |index| BlockError::IndexOutOfRange {
            index,
            len: self.visible_len(),
        };
        let from = self.document_index(source).ok_or_else(|| out_of_range(source))?;
        let to = self.document_index(target).ok_or_else(|| out_of_range(target))?;
        self.document.move_block(from, to)?;
        Ok(true)
    }

    pub fn cancel_drag(&mut self) {
        self.drag_source = None;
    }

    /// Keys of the rows currently in the group at `path`, in order.
    pub fn rows(&mut self, id: &BlockId, path: &ListPath) -> Result<Vec<RowKey>, BlockError> {
        let target = self.target(id, path)?;
        Ok(self.row_keys.get(&target.slot).cloned().unwrap_or_default())
    }

    /// Append an empty row to the group at `path`.
    pub fn append_row(&mut self, id: &BlockId, path: &ListPath) -> Result<RowKey, BlockError> {
        let mut target = self.target(id, path)?;
        let rows = rows_of(&mut target.value, path)
            .ok_or_else(|| unknown_list(target.ty, path))?;
        rows.push(target.schema.empty_row());
        self.commit(id, target.ty, target.value)?;

        let key = self.fresh_key();
        self.row_keys.entry(target.slot).or_default().push(key);
        Ok(key)
    }

    /// Shallow-merge `value` into row `index`. Rows of plain strings take a
    /// string; rows of records take an object of their scalar fields.
    pub fn update_row(
        &mut self,
        id: &BlockId,
        path: &ListPath,
        index: usize,
        value: Value,
    ) -> Result<(), BlockError> {
        let mut target = self.target(id, path)?;
        let (ty, schema) = (target.ty, target.schema);
        let rows = rows_of(&mut target.value, path).ok_or_else(|| unknown_list(ty, path))?;
        let len = rows.len();
        let row = rows
            .get_mut(index)
            .ok_or(BlockError::IndexOutOfRange { index, len })?;

        if schema.is_text_rows() {
            if !value.is_string() {
                return Err(BlockError::InvalidPatch {
                    block_type: ty,
                    reason: format!("rows of {path} are strings"),
                });
            }
            *row = value;
        } else {
            let Value::Object(patch) = value else {
                return Err(BlockError::InvalidPatch {
                    block_type: ty,
                    reason: format!("rows of {path} are objects"),
                });
            };
            let fields = row.as_object_mut().ok_or_else(|| BlockError::InvalidPatch {
                block_type: ty,
                reason: format!("row {index} of {path} is not an object"),
            })?;
            for (key, new_value) in patch {
                if !schema.row_fields.contains(&key.as_str()) {
                    return Err(BlockError::UnknownField {
                        block_type: ty,
                        field: format!("{path}.{key}"),
                    });
                }
                fields.insert(key, new_value);
            }
        }

        self.commit(id, ty, target.value)
    }

    /// Remove row `index` from the group at `path`, along with any rows
    /// nested under it.
    pub fn remove_row(&mut self, id: &BlockId, path: &ListPath, index: usize) -> Result<(), BlockError> {
        let mut target = self.target(id, path)?;
        let rows = rows_of(&mut target.value, path)
            .ok_or_else(|| unknown_list(target.ty, path))?;
        if index >= rows.len() {
            return Err(BlockError::IndexOutOfRange {
                index,
                len: rows.len(),
            });
        }
        rows.remove(index);
        self.commit(id, target.ty, target.value)?;

        let removed = self
            .row_keys
            .get_mut(&target.slot)
            .filter(|keys| index < keys.len())
            .map(|keys| keys.remove(index));
        if let Some(removed) = removed {
            self.row_keys.retain(|slot, _| slot.parent != Some(removed));
        }
        Ok(())
    }

    /// Resolve `path` in block `id`, bringing the row keys of the outer and
    /// target groups in line with the current row counts.
    fn target(&mut self, id: &BlockId, path: &ListPath) -> Result<Target, BlockError> {
        let block = self
            .document
            .get(id)
            .ok_or_else(|| BlockError::BlockNotFound(id.clone()))?;
        let ty = block
            .block_type()
            .ok_or_else(|| BlockError::Unsupported(block.content.type_tag().to_string()))?;

        let outer_schema = ty.list(path.outer()).ok_or_else(|| unknown_list(ty, path))?;
        let schema = match path {
            ListPath::Field(_) => outer_schema,
            ListPath::Nested { inner, .. } => outer_schema
                .nested
                .filter(|nested| nested.field == inner.as_str())
                .ok_or_else(|| unknown_list(ty, path))?,
        };

        let mut value = block.content.to_value().map_err(|e| BlockError::InvalidPatch {
            block_type: ty,
            reason: e.to_string(),
        })?;

        let outer_len = value
            .get(outer_schema.field)
            .and_then(Value::as_array)
            .map(Vec::len)
            .ok_or_else(|| unknown_list(ty, path))?;
        let outer_slot = KeySlot {
            block: id.clone(),
            field: outer_schema.field,
            parent: None,
        };
        let outer_keys = self.row_keys.entry(outer_slot.clone()).or_default();
        sync_keys(outer_keys, outer_len, &mut self.next_key);

        let slot = match path {
            ListPath::Field(_) => outer_slot,
            ListPath::Nested { row, .. } => {
                let parent = *outer_keys.get(*row).ok_or(BlockError::IndexOutOfRange {
                    index: *row,
                    len: outer_len,
                })?;
                KeySlot {
                    block: id.clone(),
                    field: schema.field,
                    parent: Some(parent),
                }
            }
        };

        let len = rows_of(&mut value, path)
            .map(|rows| rows.len())
            .ok_or_else(|| unknown_list(ty, path))?;
        let keys = self.row_keys.entry(slot.clone()).or_default();
        sync_keys(keys, len, &mut self.next_key);

        Ok(Target {
            ty,
            schema,
            slot,
            value,
        })
    }

    fn commit(&mut self, id: &BlockId, ty: BlockType, value: Value) -> Result<(), BlockError> {
        let content = BlockContent::parse(ty, value).map_err(|e| BlockError::InvalidPatch {
            block_type: ty,
            reason: e.to_string(),
        })?;
        if let Some(block) = self.document.get_mut(id) {
            block.content = content;
        }
        Ok(())
    }

    fn visible_len(&self) -> usize {
        self.visible_blocks().count()
    }

    /// Document position of the block at visible position `visible`.
    fn document_index(&self, visible: usize) -> Option<usize> {
        self.document
            .iter()
            .enumerate()
            .filter(|(_, block)| !block.content.is_opaque())
            .nth(visible)
            .map(|(index, _)| index)
    }

    fn fresh_key(&mut self) -> RowKey {
        let key = RowKey(self.next_key);
        self.next_key += 1;
        key
    }
}

fn rows_of<'v>(value: &'v mut Value, path: &ListPath) -> Option<&'v mut Vec<Value>> {
    match path {
        ListPath::Field(field) => value.get_mut(field.as_str())?.as_array_mut(),
        ListPath::Nested { outer, row, inner } => value
            .get_mut(outer.as_str())?
            .get_mut(*row)?
            .get_mut(inner.as_str())?
            .as_array_mut(),
    }
}

fn sync_keys(keys: &mut Vec<RowKey>, len: usize, next_key: &mut u64) {
    keys.truncate(len);
    while keys.len() < len {
        keys.push(RowKey(*next_key));
        *next_key += 1;
    }
}

fn unknown_list(block_type: BlockType, path: &ListPath) -> BlockError {
    BlockError::UnknownList {
        block_type,
        path: path.to_string(),
    }
}
