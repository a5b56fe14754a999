use serde::{Deserialize, Serialize};

use crate::blocks::ContentDocument;
use crate::PublishStatus;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBlogPostRequest {
    pub title: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default)]
    pub content: ContentDocument,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateBlogPostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentDocument>,
}
