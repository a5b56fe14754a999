use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::registry::BlockType;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextContent {
    pub heading: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageContent {
    pub src: String,
    pub alt: String,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListContent {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteContent {
    pub text: String,
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryContent {
    pub title: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoContent {
    pub url: String,
    pub title: String,
    pub description: String,
    pub autoplay: bool,
    pub show_controls: bool,
}

impl Default for VideoContent {
    fn default() -> Self {
        Self {
            url: String::new(),
            title: String::new(),
            description: String::new(),
            autoplay: false,
            show_controls: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialContent {
    pub name: String,
    pub role: String,
    pub content: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsContent {
    pub title: String,
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineEvent {
    pub year: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineContent {
    pub title: String,
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqContent {
    pub title: String,
    pub questions: Vec<FaqItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaContent {
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub button_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileContent {
    pub title: String,
    pub description: String,
    pub file_url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapContent {
    pub title: String,
    pub address: String,
    pub embed_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwardContent {
    pub title: String,
    pub description: String,
    pub issuer: String,
    pub year: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgrammeModule {
    pub title: String,
    pub description: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgrammeContent {
    pub title: String,
    pub duration: String,
    pub modules: Vec<ProgrammeModule>,
    pub certification: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceCategory {
    pub name: String,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServicesContent {
    pub title: String,
    pub categories: Vec<ServiceCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SponsorshipOption {
    pub name: String,
    pub description: String,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SponsorshipContent {
    pub title: String,
    pub options: Vec<SponsorshipOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Impact {
    pub description: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImpactContent {
    pub title: String,
    pub impacts: Vec<Impact>,
    pub sdgs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMember {
    pub role: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamContent {
    pub title: String,
    pub members: Vec<TeamMember>,
}

/// A stored block we cannot type: either its tag is not one of ours or its
/// content does not fit the tag's schema. The raw JSON object is kept so the
/// block survives a save untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueBlock {
    pub raw: Map<String, Value>,
}

impl OpaqueBlock {
    pub fn type_tag(&self) -> &str {
        self.raw.get("type").and_then(Value::as_str).unwrap_or_default()
    }
}

macro_rules! block_contents {
    ($($variant:ident($content:ty)),* $(,)?) => {
        /// Content record of a block, one variant per block type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum BlockContent {
            $($variant($content),)*
            Opaque(OpaqueBlock),
        }

        impl BlockContent {
            pub fn block_type(&self) -> Option<BlockType> {
                match self {
                    $(Self::$variant(_) => Some(BlockType::$variant),)*
                    Self::Opaque(_) => None,
                }
            }

            /// Parse a content object against the schema of `ty`. A `null`
            /// field reads as absent and takes the field default.
            pub fn parse(ty: BlockType, mut value: Value) -> Result<Self, serde_json::Error> {
                drop_nulls(&mut value);
                match ty {
                    $(BlockType::$variant => serde_json::from_value(value).map(Self::$variant),)*
                }
            }

            fn empty_for(ty: BlockType) -> Self {
                match ty {
                    $(BlockType::$variant => Self::$variant(<$content>::default()),)*
                }
            }
        }

        impl Serialize for BlockContent {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    $(Self::$variant(content) => content.serialize(serializer),)*
                    Self::Opaque(opaque) => opaque
                        .raw
                        .get("content")
                        .unwrap_or(&Value::Null)
                        .serialize(serializer),
                }
            }
        }
    };
}

block_contents! {
    Text(TextContent),
    Image(ImageContent),
    List(ListContent),
    Quote(QuoteContent),
    Gallery(GalleryContent),
    Video(VideoContent),
    Testimonial(TestimonialContent),
    Stats(StatsContent),
    Timeline(TimelineContent),
    Faq(FaqContent),
    Cta(CtaContent),
    File(FileContent),
    Map(MapContent),
    Award(AwardContent),
    Programme(ProgrammeContent),
    Services(ServicesContent),
    Sponsorship(SponsorshipContent),
    Impact(ImpactContent),
    Team(TeamContent),
}

fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(fields) => {
            fields.retain(|_, field| !field.is_null());
            fields.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(drop_nulls),
        _ => {}
    }
}

impl BlockContent {
    /// Content of a block freshly added from the palette.
    pub(crate) fn default_for(ty: BlockType) -> Self {
        match ty {
            // one empty item so the form shows an input row
            BlockType::List => Self::List(ListContent {
                items: vec![String::new()],
                ..ListContent::default()
            }),
            ty => Self::empty_for(ty),
        }
    }

    /// The `type` tag written to storage.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Opaque(opaque) => opaque.type_tag(),
            known => known.block_type().map(BlockType::as_str).unwrap_or_default(),
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// Content as a JSON object, the shape the authoring forms edit.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let content = BlockContent::parse(BlockType::Video, json!({ "url": "https://x.test/v.mp4" }))
            .unwrap();
        let BlockContent::Video(video) = content else {
            panic!("expected a video block");
        };
        assert_eq!(video.url, "https://x.test/v.mp4");
        assert!(video.show_controls);
        assert!(!video.autoplay);
        assert_eq!(video.title, "");
    }

    #[test]
    fn null_fields_take_their_defaults() {
        let quote = BlockContent::parse(
            BlockType::Quote,
            json!({ "text": "Water is life", "author": null }),
        )
        .unwrap();
        assert_eq!(
            quote,
            BlockContent::Quote(QuoteContent { text: "Water is life".into(), author: String::new() })
        );

        let video = BlockContent::parse(BlockType::Video, json!({ "url": "/v.mp4", "showControls": null }))
            .unwrap();
        let BlockContent::Video(video) = video else {
            panic!("expected a video block");
        };
        assert!(video.show_controls);

        let stats = BlockContent::parse(
            BlockType::Stats,
            json!({ "title": null, "stats": [{ "label": "Wells", "value": null }] }),
        )
        .unwrap();
        let BlockContent::Stats(stats) = stats else {
            panic!("expected a stats block");
        };
        assert_eq!(stats.stats, [Stat { label: "Wells".into(), value: String::new() }]);
    }

    #[test]
    fn absent_list_items_load_empty() {
        let list = BlockContent::parse(BlockType::List, json!({ "title": "Goals" })).unwrap();
        assert_eq!(list, BlockContent::List(ListContent { title: "Goals".into(), items: vec![] }));
        assert_eq!(
            BlockContent::default_for(BlockType::List),
            BlockContent::List(ListContent { title: String::new(), items: vec![String::new()] })
        );
    }

    #[test]
    fn camel_case_keys_match_storage() {
        let cta = BlockContent::Cta(CtaContent {
            title: "Donate".into(),
            button_text: "Give".into(),
            button_url: "/donate".into(),
            ..Default::default()
        });
        let value = cta.to_value().unwrap();
        assert_eq!(value["buttonText"], "Give");
        assert_eq!(value["buttonUrl"], "/donate");
        assert_eq!(cta.type_tag(), "cta");
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let err = BlockContent::parse(BlockType::List, json!({ "items": "not a list" }));
        assert!(err.is_err());
    }

    #[test]
    fn opaque_keeps_its_tag() {
        let mut raw = Map::new();
        raw.insert("type".into(), json!("carousel"));
        let content = BlockContent::Opaque(OpaqueBlock { raw });
        assert_eq!(content.type_tag(), "carousel");
        assert!(content.block_type().is_none());
        assert!(content.is_opaque());
    }
}
