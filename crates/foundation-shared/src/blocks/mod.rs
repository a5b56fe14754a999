//! Typed content blocks: the body of project and blog pages.
//!
//! A [`ContentDocument`] is an ordered list of [`ContentBlock`]s. Authors
//! edit it through a [`BlockEditor`], it is stored as a JSON array through
//! [`codec`], and pages turn it into HTML through [`render`].

pub mod codec;
mod content;
mod document;
mod editor;
mod registry;
pub mod render;

use thiserror::Error;

pub use content::*;
pub use document::{BlockId, ContentBlock, ContentDocument};
pub use editor::{BlockEditor, ListPath, RowKey};
pub use registry::{BlockType, ListSchema};

/// Misuse of the block store or editor.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("block {0} not found")]
    BlockNotFound(BlockId),

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("block type {0:?} cannot be edited")]
    Unsupported(String),

    #[error("{block_type} blocks have no field {field:?}")]
    UnknownField { block_type: BlockType, field: String },

    #[error("{block_type} blocks have no list {path}")]
    UnknownList { block_type: BlockType, path: String },

    #[error("invalid {block_type} content: {reason}")]
    InvalidPatch { block_type: BlockType, reason: String },
}
