//! Static table of the block types an author can add.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::content::BlockContent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Text,
    Image,
    List,
    Quote,
    Gallery,
    Video,
    Testimonial,
    Stats,
    Timeline,
    Faq,
    Cta,
    File,
    Map,
    Award,
    Programme,
    Services,
    Sponsorship,
    Impact,
    Team,
}

/// Shape of a repeatable row group inside a block's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSchema {
    pub field: &'static str,
    /// Scalar fields of each row. Empty means rows are plain strings.
    pub row_fields: &'static [&'static str],
    /// A list nested inside each row.
    pub nested: Option<&'static ListSchema>,
}

impl ListSchema {
    /// The row appended by an "add row" action.
    pub fn empty_row(&self) -> Value {
        if self.row_fields.is_empty() {
            return Value::String(String::new());
        }
        let mut row = Map::new();
        for field in self.row_fields {
            row.insert((*field).to_string(), Value::String(String::new()));
        }
        if let Some(nested) = self.nested {
            row.insert(nested.field.to_string(), Value::Array(Vec::new()));
        }
        Value::Object(row)
    }

    pub fn is_text_rows(&self) -> bool {
        self.row_fields.is_empty()
    }
}

const ITEMS: ListSchema = ListSchema { field: "items", row_fields: &[], nested: None };
const IMAGES: ListSchema = ListSchema { field: "images", row_fields: &[], nested: None };
const STATS: ListSchema = ListSchema { field: "stats", row_fields: &["label", "value"], nested: None };
const EVENTS: ListSchema = ListSchema {
    field: "events",
    row_fields: &["year", "title", "description"],
    nested: None,
};
const QUESTIONS: ListSchema = ListSchema {
    field: "questions",
    row_fields: &["question", "answer"],
    nested: None,
};
const MODULES: ListSchema = ListSchema {
    field: "modules",
    row_fields: &["title", "description", "duration"],
    nested: None,
};
const SERVICES: ListSchema = ListSchema {
    field: "services",
    row_fields: &["name", "description"],
    nested: None,
};
const CATEGORIES: ListSchema = ListSchema {
    field: "categories",
    row_fields: &["name"],
    nested: Some(&SERVICES),
};
const BENEFITS: ListSchema = ListSchema { field: "benefits", row_fields: &[], nested: None };
const OPTIONS: ListSchema = ListSchema {
    field: "options",
    row_fields: &["name", "description"],
    nested: Some(&BENEFITS),
};
const IMPACTS: ListSchema = ListSchema {
    field: "impacts",
    row_fields: &["description", "value"],
    nested: None,
};
const SDGS: ListSchema = ListSchema { field: "sdgs", row_fields: &[], nested: None };
const RESPONSIBILITIES: ListSchema = ListSchema {
    field: "responsibilities",
    row_fields: &[],
    nested: None,
};
const MEMBERS: ListSchema = ListSchema {
    field: "members",
    row_fields: &["role"],
    nested: Some(&RESPONSIBILITIES),
};

impl BlockType {
    /// Every block type, in the order the "add block" palette shows them.
    pub const ALL: [BlockType; 19] = [
        BlockType::Text,
        BlockType::Image,
        BlockType::List,
        BlockType::Quote,
        BlockType::Gallery,
        BlockType::Video,
        BlockType::Testimonial,
        BlockType::Stats,
        BlockType::Timeline,
        BlockType::Faq,
        BlockType::Cta,
        BlockType::File,
        BlockType::Map,
        BlockType::Award,
        BlockType::Programme,
        BlockType::Services,
        BlockType::Sponsorship,
        BlockType::Impact,
        BlockType::Team,
    ];

    pub fn palette() -> impl Iterator<Item = BlockType> {
        Self::ALL.into_iter()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::List => "list",
            Self::Quote => "quote",
            Self::Gallery => "gallery",
            Self::Video => "video",
            Self::Testimonial => "testimonial",
            Self::Stats => "stats",
            Self::Timeline => "timeline",
            Self::Faq => "faq",
            Self::Cta => "cta",
            Self::File => "file",
            Self::Map => "map",
            Self::Award => "award",
            Self::Programme => "programme",
            Self::Services => "services",
            Self::Sponsorship => "sponsorship",
            Self::Impact => "impact",
            Self::Team => "team",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == tag)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::List => "List",
            Self::Quote => "Quote",
            Self::Gallery => "Gallery",
            Self::Video => "Video",
            Self::Testimonial => "Testimonial",
            Self::Stats => "Statistics",
            Self::Timeline => "Timeline",
            Self::Faq => "FAQ",
            Self::Cta => "Call to Action",
            Self::File => "File",
            Self::Map => "Map",
            Self::Award => "Award",
            Self::Programme => "Programme",
            Self::Services => "Services",
            Self::Sponsorship => "Sponsorship",
            Self::Impact => "Impact",
            Self::Team => "Team",
        }
    }

    /// Icon identifier for the palette button.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Text => "type",
            Self::Image => "image",
            Self::List => "list",
            Self::Quote => "quote",
            Self::Gallery => "images",
            Self::Video => "video",
            Self::Testimonial => "message-square",
            Self::Stats => "bar-chart",
            Self::Timeline => "clock",
            Self::Faq => "help-circle",
            Self::Cta => "megaphone",
            Self::File => "file",
            Self::Map => "map-pin",
            Self::Award => "award",
            Self::Programme => "book-open",
            Self::Services => "briefcase",
            Self::Sponsorship => "heart-handshake",
            Self::Impact => "target",
            Self::Team => "users",
        }
    }

    /// Empty but well-typed content for a freshly added block.
    pub fn default_content(self) -> BlockContent {
        BlockContent::default_for(self)
    }

    /// Repeatable row groups of this type's content.
    pub fn lists(self) -> &'static [ListSchema] {
        match self {
            Self::List => &[ITEMS],
            Self::Gallery => &[IMAGES],
            Self::Stats => &[STATS],
            Self::Timeline => &[EVENTS],
            Self::Faq => &[QUESTIONS],
            Self::Programme => &[MODULES],
            Self::Services => &[CATEGORIES],
            Self::Sponsorship => &[OPTIONS],
            Self::Impact => &[IMPACTS, SDGS],
            Self::Team => &[MEMBERS],
            Self::Text
            | Self::Image
            | Self::Quote
            | Self::Video
            | Self::Testimonial
            | Self::Cta
            | Self::File
            | Self::Map
            | Self::Award => &[],
        }
    }

    pub fn list(self, field: &str) -> Option<&'static ListSchema> {
        self.lists().iter().find(|list| list.field == field)
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_round_trip() {
        for ty in BlockType::palette() {
            assert_eq!(BlockType::from_tag(ty.as_str()), Some(ty));
            assert_eq!(serde_json::to_value(ty).unwrap(), json!(ty.as_str()));
        }
        assert_eq!(BlockType::from_tag("unsupported-future-type"), None);
    }

    #[test]
    fn palette_lists_every_type_once() {
        let mut seen = std::collections::HashSet::new();
        for ty in BlockType::palette() {
            assert!(seen.insert(ty));
            assert!(!ty.label().is_empty());
            assert!(!ty.icon().is_empty());
        }
        assert_eq!(seen.len(), 19);
        assert_eq!(BlockType::ALL[0], BlockType::Text);
        assert_eq!(BlockType::ALL[18], BlockType::Team);
    }

    #[test]
    fn list_defaults_to_one_empty_item() {
        let value = BlockType::List.default_content().to_value().unwrap();
        assert_eq!(value, json!({ "title": "", "items": [""] }));

        let value = BlockType::Stats.default_content().to_value().unwrap();
        assert_eq!(value, json!({ "title": "", "stats": [] }));
    }

    #[test]
    fn default_content_has_every_declared_list() {
        for ty in BlockType::palette() {
            let value = ty.default_content().to_value().unwrap();
            assert_eq!(ty.default_content().block_type(), Some(ty));
            for list in ty.lists() {
                assert!(value[list.field].is_array(), "{ty}.{}", list.field);
            }
        }
    }

    #[test]
    fn empty_rows_follow_schema() {
        let categories = BlockType::Services.list("categories").unwrap();
        assert_eq!(categories.empty_row(), json!({ "name": "", "services": [] }));
        assert_eq!(
            categories.nested.unwrap().empty_row(),
            json!({ "name": "", "description": "" })
        );
        assert_eq!(BlockType::List.list("items").unwrap().empty_row(), json!(""));
        assert!(BlockType::Text.list("items").is_none());
    }
}
