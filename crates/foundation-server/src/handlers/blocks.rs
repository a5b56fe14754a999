use axum::Json;
use foundation_shared::api::{PaletteEntry, PreviewRequest, PreviewResponse};
use foundation_shared::blocks::render::{self, RenderContext};
use foundation_shared::blocks::BlockType;

use crate::error::AppError;

/// GET /api/v1/admin/blocks/palette
pub async fn palette() -> Result<Json<Vec<PaletteEntry>>, AppError> {
    let entries = BlockType::palette()
        .map(|ty| -> Result<PaletteEntry, AppError> {
            Ok(PaletteEntry {
                block_type: ty,
                label: ty.label().to_string(),
                icon: ty.icon().to_string(),
                default_content: ty.default_content().to_value().map_err(anyhow::Error::from)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(entries))
}

/// POST /api/v1/admin/blocks/preview
pub async fn preview(Json(req): Json<PreviewRequest>) -> Json<PreviewResponse> {
    let html = render::render_document(&req.content, RenderContext::Preview);

    Json(PreviewResponse {
        html: html.0,
        unsupported_blocks: req.content.unsupported_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation_shared::blocks::ContentDocument;
    use serde_json::json;

    #[tokio::test]
    async fn palette_lists_every_type_in_order() {
        let Json(entries) = palette().await.unwrap();
        assert_eq!(entries.len(), BlockType::ALL.len());
        assert_eq!(entries[0].block_type, BlockType::ALL[0]);
        assert!(entries.iter().all(|e| e.default_content.is_object()));
    }

    #[tokio::test]
    async fn preview_counts_unsupported_blocks() {
        let content: ContentDocument = serde_json::from_value(json!([
            { "id": "a", "type": "text", "content": { "heading": "", "text": "Hi" } },
            { "id": "b", "type": "hologram", "content": {} },
        ]))
        .unwrap();

        let Json(response) = preview(Json(PreviewRequest { content })).await;
        assert!(response.html.contains("block-preview"));
        assert!(response.html.contains("<p>Hi</p>"));
        assert_eq!(response.unsupported_blocks, 1);
    }
}
