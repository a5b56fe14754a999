//! Storage format of documents and the other JSON-array columns.
//!
//! Every value is a JSON array in a text column. An absent, empty or `null`
//! value reads back as an empty list; anything else that is not a JSON array
//! is a hard error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::document::{ContentBlock, ContentDocument};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{field}: stored value is not valid JSON: {source}")]
    Malformed {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field}: stored value is not a JSON array")]
    NotAnArray { field: &'static str },

    #[error("{field}: element {index} is not a valid entry")]
    BadElement { field: &'static str, index: usize },

    #[error("{field}: could not serialize: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub fn encode_document(document: &ContentDocument) -> Result<String, CodecError> {
    serde_json::to_string(document).map_err(|source| CodecError::Encode {
        field: "content",
        source,
    })
}

pub fn decode_document(stored: Option<&str>) -> Result<ContentDocument, CodecError> {
    const FIELD: &str = "content";
    let Some(elements) = parse_array(FIELD, stored)? else {
        return Ok(ContentDocument::new());
    };
    let blocks = elements
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            ContentBlock::from_value(value).ok_or(CodecError::BadElement { field: FIELD, index })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ContentDocument::from_blocks(blocks))
}

/// Encode a plain list column such as `categories`, `goals` or `gallery`.
pub fn encode_list<T: Serialize>(field: &'static str, items: &[T]) -> Result<String, CodecError> {
    serde_json::to_string(items).map_err(|source| CodecError::Encode { field, source })
}

pub fn decode_list<T: DeserializeOwned>(
    field: &'static str,
    stored: Option<&str>,
) -> Result<Vec<T>, CodecError> {
    let Some(elements) = parse_array(field, stored)? else {
        return Ok(Vec::new());
    };
    elements
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|_| CodecError::BadElement { field, index })
        })
        .collect()
}

fn parse_array(field: &'static str, stored: Option<&str>) -> Result<Option<Vec<Value>>, CodecError> {
    let text = match stored.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(text) => text,
    };
    match serde_json::from_str::<Value>(text).map_err(|source| CodecError::Malformed { field, source })? {
        Value::Null => Ok(None),
        Value::Array(elements) => Ok(Some(elements)),
        _ => Err(CodecError::NotAnArray { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{render, BlockContent, BlockEditor, BlockType, ListPath};
    use serde_json::json;

    fn every_type_filled() -> ContentDocument {
        let stored = json!([
            { "id": "t", "type": "text", "content": { "heading": "Intro", "text": "Hello" } },
            { "id": "i", "type": "image", "content": { "src": "/a.png", "alt": "A", "caption": "" } },
            { "id": "l", "type": "list", "content": { "title": "", "items": ["a", "", "b"] } },
            { "id": "q", "type": "quote", "content": { "text": "Q", "author": "" } },
            { "id": "g", "type": "gallery", "content": { "title": "G", "images": ["/1", "/2"] } },
            { "id": "v", "type": "video", "content": { "url": "/v.mp4", "autoplay": true, "showControls": false } },
            { "id": "ts", "type": "testimonial", "content": { "name": "N", "role": "R", "content": "C", "image": "" } },
            { "id": "s", "type": "stats", "content": { "title": "", "stats": [{ "label": "L", "value": "1" }] } },
            { "id": "tl", "type": "timeline", "content": { "events": [{ "year": "1999", "title": "T", "description": "" }] } },
            { "id": "f", "type": "faq", "content": { "questions": [{ "question": "?", "answer": "!" }] } },
            { "id": "c", "type": "cta", "content": { "title": "Go", "buttonText": "b", "buttonUrl": "/u" } },
            { "id": "fi", "type": "file", "content": { "fileUrl": "/f.pdf", "fileName": "f.pdf" } },
            { "id": "m", "type": "map", "content": { "address": "Main St", "embedUrl": "/map" } },
            { "id": "a", "type": "award", "content": { "title": "A", "year": "2021" } },
            { "id": "p", "type": "programme", "content": { "modules": [{ "title": "M1" }], "certification": "Cert" } },
            { "id": "se", "type": "services", "content": { "categories": [{ "name": "C", "services": [{ "name": "S" }] }] } },
            { "id": "sp", "type": "sponsorship", "content": { "options": [{ "name": "O", "benefits": ["x", "y"] }] } },
            { "id": "im", "type": "impact", "content": { "impacts": [{ "value": "5" }], "sdgs": ["SDG 6"] } },
            { "id": "te", "type": "team", "content": { "members": [{ "role": "R", "responsibilities": ["a"] }] } },
        ]);
        decode_document(Some(&stored.to_string())).unwrap()
    }

    #[test]
    fn round_trip_preserves_everything() {
        let document = every_type_filled();
        assert_eq!(document.len(), 19);
        assert_eq!(document.unsupported_count(), 0);

        let encoded = encode_document(&document).unwrap();
        assert_eq!(decode_document(Some(&encoded)).unwrap(), document);
    }

    #[test]
    fn round_trip_of_defaults_and_unknown_blocks() {
        let mut document = ContentDocument::new();
        for ty in BlockType::palette() {
            document.add_block(ty);
        }
        let mut stored: Vec<Value> =
            serde_json::from_str(&encode_document(&document).unwrap()).unwrap();
        stored.insert(3, json!({ "id": "future", "type": "unsupported-future-type", "content": [1] }));
        let document = decode_document(Some(&Value::Array(stored).to_string())).unwrap();

        assert_eq!(document.len(), 20);
        assert_eq!(document.blocks()[3].content.type_tag(), "unsupported-future-type");
        let encoded = encode_document(&document).unwrap();
        assert_eq!(decode_document(Some(&encoded)).unwrap(), document);
    }

    #[test]
    fn move_survives_round_trip() {
        let mut document = every_type_filled();
        document.move_block(0, 4).unwrap();
        let decoded = decode_document(Some(&encode_document(&document).unwrap())).unwrap();
        let ids: Vec<&str> = decoded.iter().take(5).map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["i", "l", "q", "g", "t"]);
    }

    #[test]
    fn absent_values_are_empty() {
        assert!(decode_document(None).unwrap().is_empty());
        assert!(decode_document(Some("")).unwrap().is_empty());
        assert!(decode_document(Some("  null ")).unwrap().is_empty());
        assert!(decode_document(Some("[]")).unwrap().is_empty());
        assert!(decode_list::<String>("goals", None).unwrap().is_empty());
    }

    #[test]
    fn null_fields_keep_blocks_typed() {
        let stored = r#"[
            {"id":"q","type":"quote","content":{"text":"Water is life","author":null}},
            {"id":"t","type":"testimonial","content":{"name":"Awa","role":null,"content":"Thanks","image":null}}
        ]"#;
        let decoded = decode_document(Some(stored)).unwrap();
        assert_eq!(decoded.unsupported_count(), 0);

        let reloaded = decode_document(Some(&encode_document(&decoded).unwrap())).unwrap();
        assert_eq!(reloaded, decoded);
        assert!(reloaded
            .iter()
            .all(|block| render::render(block, render::RenderContext::Public).is_some()));
    }

    #[test]
    fn corrupt_values_are_hard_errors() {
        assert!(matches!(
            decode_document(Some("[{\"id\":")),
            Err(CodecError::Malformed { field: "content", .. })
        ));
        assert!(matches!(
            decode_document(Some("{\"id\":\"x\"}")),
            Err(CodecError::NotAnArray { .. })
        ));
        assert!(matches!(
            decode_document(Some("[1]")),
            Err(CodecError::BadElement { index: 0, .. })
        ));
        assert!(matches!(
            decode_list::<String>("gallery", Some("[\"a\", 3]")),
            Err(CodecError::BadElement { field: "gallery", index: 1 })
        ));
    }

    #[test]
    fn list_columns_round_trip() {
        let goals = vec!["Clean water".to_string(), "School meals".to_string()];
        let encoded = encode_list("goals", &goals).unwrap();
        assert_eq!(encoded, r#"["Clean water","School meals"]"#);
        assert_eq!(decode_list::<String>("goals", Some(&encoded)).unwrap(), goals);
    }

    #[test]
    fn author_save_reload_render() {
        let mut editor = BlockEditor::default();
        let text = editor.add_block(BlockType::Text);
        editor
            .update_block(&text, json!({ "heading": "Intro", "text": "Hello" }).as_object().unwrap())
            .unwrap();
        let list = editor.add_block(BlockType::List);
        let items = ListPath::field("items");
        editor.update_row(&list, &items, 0, json!("a")).unwrap();
        editor.append_row(&list, &items).unwrap();
        editor.update_row(&list, &items, 1, json!("b")).unwrap();

        let stored = encode_document(editor.document()).unwrap();
        let reloaded = decode_document(Some(&stored)).unwrap();

        let sections: Vec<String> = reloaded
            .iter()
            .filter_map(|block| render::render(block, render::RenderContext::Public))
            .map(|html| html.0)
            .collect();
        assert_eq!(sections.len(), 2);
        assert!(sections[0].contains("<h2>Intro</h2><p>Hello</p>"));
        assert!(sections[1].contains("<ul><li>a</li><li>b</li></ul>"));

        let BlockContent::List(content) = &reloaded.blocks()[1].content else {
            panic!("expected a list block");
        };
        assert_eq!(content.items, ["a", "b"]);
        assert_eq!(&reloaded.blocks()[0], editor.document().get(&text).unwrap());
    }
}
