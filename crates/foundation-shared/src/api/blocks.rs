use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blocks::{BlockType, ContentDocument};

/// One button of the "add block" palette.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaletteEntry {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub label: String,
    pub icon: String,
    pub default_content: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub content: ContentDocument,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub html: String,
    /// Blocks kept in the document whose type this version cannot show.
    pub unsupported_blocks: usize,
}
