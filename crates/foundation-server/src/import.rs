//! One-off migration of the legacy file store into Postgres.
//!
//! The legacy store is a directory of JSON files, one array of camelCase
//! records per kind. Records that fail validation or whose content does not
//! decode are reported and skipped; records whose slug is already taken are
//! skipped so the import can be re-run. Messages have no slug, so their id is
//! derived from the record itself and a re-run finds the same rows.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use foundation_shared::api::ContactRequest;
use foundation_shared::blocks::codec::{self, CodecError};
use foundation_shared::blocks::ContentDocument;
use foundation_shared::save::{self, SaveError};
use foundation_shared::slug::slugify;
use foundation_shared::{BlogPost, Message, Project, PublishStatus};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::handlers::{blog, ensure_slug_free, messages, non_blank, projects};

pub const PROJECTS_FILE: &str = "projects.json";
pub const BLOG_POSTS_FILE: &str = "blog_posts.json";
pub const MESSAGES_FILE: &str = "messages.json";

#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("record does not match the legacy shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] SaveError),

    #[error("content could not be decoded: {0}")]
    Content(#[from] CodecError),

    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file: &'static str,
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyProject {
    #[serde(default)]
    title: String,
    slug: Option<String>,
    #[serde(default)]
    excerpt: String,
    cover_image: Option<String>,
    location: Option<String>,
    status: Option<String>,
    #[serde(default)]
    featured: bool,
    categories: Option<Value>,
    goals: Option<Value>,
    gallery: Option<Value>,
    content: Option<Value>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyBlogPost {
    #[serde(default)]
    title: String,
    slug: Option<String>,
    #[serde(default)]
    excerpt: String,
    cover_image: Option<String>,
    author: Option<String>,
    tags: Option<Value>,
    status: Option<String>,
    published: Option<bool>,
    published_at: Option<DateTime<Utc>>,
    content: Option<Value>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMessage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    subject: Option<String>,
    #[serde(default, alias = "message")]
    body: String,
    #[serde(default)]
    read: bool,
    created_at: Option<DateTime<Utc>>,
}

/// Legacy columns hold either a JSON array or that array serialized into a
/// string.
fn stored_text(value: Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    }
}

fn legacy_document(value: Option<Value>) -> Result<ContentDocument, CodecError> {
    codec::decode_document(stored_text(value).as_deref())
}

fn legacy_list(field: &'static str, value: Option<Value>) -> Result<Vec<String>, CodecError> {
    codec::decode_list(field, stored_text(value).as_deref())
}

fn legacy_status(status: Option<&str>, published: Option<bool>) -> PublishStatus {
    match (status.map(str::trim), published) {
        (Some(s), _) if s.eq_ignore_ascii_case("published") => PublishStatus::Published,
        (None, Some(true)) => PublishStatus::Published,
        _ => PublishStatus::Draft,
    }
}

/// Keeps a usable legacy slug, normalized, and derives one from the title
/// otherwise.
fn legacy_slug(slug: Option<&str>, title: &str) -> Result<String, SaveError> {
    match slug.map(slugify).filter(|s| !s.is_empty()) {
        Some(slug) => Ok(slug),
        None => save::derive_slug(title),
    }
}

fn parse<T: DeserializeOwned>(value: Value) -> Result<T, SkipReason> {
    Ok(serde_json::from_value(value)?)
}

fn prepare_project(value: Value, now: DateTime<Utc>) -> Result<Project, SkipReason> {
    let legacy: LegacyProject = parse(value)?;
    save::require("title", &legacy.title)?;
    save::require("excerpt", &legacy.excerpt)?;

    let created_at = legacy.created_at.unwrap_or(now);
    Ok(Project {
        id: Uuid::new_v4(),
        slug: legacy_slug(legacy.slug.as_deref(), &legacy.title)?,
        title: legacy.title.trim().to_string(),
        excerpt: legacy.excerpt.trim().to_string(),
        cover_image: non_blank(legacy.cover_image),
        location: non_blank(legacy.location),
        status: legacy_status(legacy.status.as_deref(), None),
        featured: legacy.featured,
        categories: legacy_list("categories", legacy.categories)?,
        goals: legacy_list("goals", legacy.goals)?,
        gallery: legacy_list("gallery", legacy.gallery)?,
        content: legacy_document(legacy.content)?,
        created_at,
        updated_at: legacy.updated_at.unwrap_or(created_at),
    })
}

fn prepare_post(value: Value, now: DateTime<Utc>) -> Result<BlogPost, SkipReason> {
    let legacy: LegacyBlogPost = parse(value)?;
    save::require("title", &legacy.title)?;
    save::require("excerpt", &legacy.excerpt)?;

    let created_at = legacy.created_at.unwrap_or(now);
    let status = legacy_status(legacy.status.as_deref(), legacy.published);
    let published_at = match status {
        PublishStatus::Published => Some(legacy.published_at.unwrap_or(created_at)),
        PublishStatus::Draft => None,
    };
    Ok(BlogPost {
        id: Uuid::new_v4(),
        slug: legacy_slug(legacy.slug.as_deref(), &legacy.title)?,
        title: legacy.title.trim().to_string(),
        excerpt: legacy.excerpt.trim().to_string(),
        cover_image: non_blank(legacy.cover_image),
        author: non_blank(legacy.author),
        tags: legacy_list("tags", legacy.tags)?,
        status,
        published_at,
        content: legacy_document(legacy.content)?,
        created_at,
        updated_at: legacy.updated_at.unwrap_or(created_at),
    })
}

/// Namespace for ids of imported messages.
const LEGACY_MESSAGE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2d7e_5a4b_4c3d_9e8f_7a6b_5c4d_3e2f);

fn legacy_message_id(legacy: &LegacyMessage) -> Uuid {
    let created_at = legacy.created_at.map(|at| at.to_rfc3339()).unwrap_or_default();
    let key = serde_json::json!([
        legacy.name,
        legacy.email.trim().to_lowercase(),
        legacy.subject,
        legacy.body,
        created_at,
    ]);
    Uuid::new_v5(&LEGACY_MESSAGE_NAMESPACE, key.to_string().as_bytes())
}

fn prepare_message(value: Value, now: DateTime<Utc>) -> Result<Message, SkipReason> {
    let legacy: LegacyMessage = parse(value)?;
    let id = legacy_message_id(&legacy);
    let mut message = messages::new_message(ContactRequest {
        name: legacy.name,
        email: legacy.email,
        subject: legacy.subject,
        body: legacy.body,
    })
    .map_err(|e| SkipReason::Rejected(e.to_string()))?;
    message.id = id;
    message.read = legacy.read;
    message.created_at = legacy.created_at.unwrap_or(now);
    Ok(message)
}

async fn read_records(dir: &Path, file: &str) -> anyhow::Result<Option<Vec<Value>>> {
    let path = dir.join(file);
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let records = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;
    Ok(Some(records))
}

fn skip(file: &str, index: usize, reason: &SkipReason) {
    tracing::warn!(file, index, %reason, "Skipping legacy record");
}

async fn import_projects(pool: &DbPool, records: Vec<Value>) -> anyhow::Result<FileReport> {
    let mut report = FileReport { file: PROJECTS_FILE, imported: 0, skipped: 0 };
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for (index, value) in records.into_iter().enumerate() {
        let project = match prepare_project(value, now) {
            Ok(project) => project,
            Err(reason) => {
                skip(PROJECTS_FILE, index, &reason);
                report.skipped += 1;
                continue;
            }
        };
        match ensure_slug_free(&mut *tx, "projects", &project.slug, None).await {
            Ok(()) => {}
            Err(AppError::Save(SaveError::SlugConflict(slug))) => {
                tracing::info!(slug = %slug, "Project already imported");
                report.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        projects::insert_project(&mut *tx, &project).await?;
        report.imported += 1;
    }

    tx.commit().await?;
    Ok(report)
}

async fn import_posts(pool: &DbPool, records: Vec<Value>) -> anyhow::Result<FileReport> {
    let mut report = FileReport { file: BLOG_POSTS_FILE, imported: 0, skipped: 0 };
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for (index, value) in records.into_iter().enumerate() {
        let post = match prepare_post(value, now) {
            Ok(post) => post,
            Err(reason) => {
                skip(BLOG_POSTS_FILE, index, &reason);
                report.skipped += 1;
                continue;
            }
        };
        match ensure_slug_free(&mut *tx, "blog_posts", &post.slug, None).await {
            Ok(()) => {}
            Err(AppError::Save(SaveError::SlugConflict(slug))) => {
                tracing::info!(slug = %slug, "Blog post already imported");
                report.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        blog::insert_post(&mut *tx, &post).await?;
        report.imported += 1;
    }

    tx.commit().await?;
    Ok(report)
}

async fn import_messages(pool: &DbPool, records: Vec<Value>) -> anyhow::Result<FileReport> {
    let mut report = FileReport { file: MESSAGES_FILE, imported: 0, skipped: 0 };
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for (index, value) in records.into_iter().enumerate() {
        match prepare_message(value, now) {
            Ok(message) => {
                if messages::insert_message(&mut *tx, &message).await? {
                    report.imported += 1;
                } else {
                    tracing::info!(message_id = %message.id, "Message already imported");
                    report.skipped += 1;
                }
            }
            Err(reason) => {
                skip(MESSAGES_FILE, index, &reason);
                report.skipped += 1;
            }
        }
    }

    tx.commit().await?;
    Ok(report)
}

/// Imports every legacy file present in `dir`, one transaction per file.
pub async fn run(pool: &DbPool, dir: &Path) -> anyhow::Result<Vec<FileReport>> {
    let mut reports = Vec::new();

    if let Some(records) = read_records(dir, PROJECTS_FILE).await? {
        reports.push(import_projects(pool, records).await?);
    }
    if let Some(records) = read_records(dir, BLOG_POSTS_FILE).await? {
        reports.push(import_posts(pool, records).await?);
    }
    if let Some(records) = read_records(dir, MESSAGES_FILE).await? {
        reports.push(import_messages(pool, records).await?);
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation_shared::blocks::BlockContent;
    use serde_json::json;

    #[test]
    fn project_with_stringified_columns() {
        let value = json!({
            "id": 1712000000,
            "title": "Écoles du Sahel",
            "excerpt": "Classrooms for 400 pupils",
            "status": "published",
            "categories": "[\"Education\"]",
            "goals": ["Build 4 classrooms"],
            "content": "[{\"id\":\"b1\",\"type\":\"text\",\"content\":{\"heading\":\"Why\",\"text\":\"\"}}]",
            "createdAt": "2023-04-01T10:00:00Z"
        });

        let project = prepare_project(value, Utc::now()).unwrap();
        assert_eq!(project.slug, "écoles-du-sahel");
        assert_eq!(project.status, PublishStatus::Published);
        assert_eq!(project.categories, ["Education"]);
        assert_eq!(project.goals, ["Build 4 classrooms"]);
        assert!(matches!(project.content.blocks()[0].content, BlockContent::Text(_)));
        assert_eq!(project.updated_at, project.created_at);
    }

    #[test]
    fn legacy_slug_is_normalized() {
        assert_eq!(legacy_slug(Some("Water Wells"), "ignored").unwrap(), "water-wells");
        assert_eq!(legacy_slug(Some("  "), "Water").unwrap(), "water");
        assert_eq!(legacy_slug(None, "!!"), Err(SaveError::AuthoringInput("title")));
    }

    #[test]
    fn corrupt_content_skips_the_record() {
        let value = json!({ "title": "T", "excerpt": "E", "content": "{not json" });
        assert!(matches!(
            prepare_project(value, Utc::now()),
            Err(SkipReason::Content(CodecError::Malformed { .. }))
        ));
    }

    #[test]
    fn missing_required_fields_skip_the_record() {
        let value = json!({ "title": "Only a title" });
        assert!(matches!(
            prepare_post(value, Utc::now()),
            Err(SkipReason::Invalid(SaveError::AuthoringInput("excerpt")))
        ));
    }

    #[test]
    fn published_flag_sets_published_at() {
        let value = json!({
            "title": "Rains",
            "excerpt": "Season report",
            "published": true,
            "createdAt": "2024-01-02T00:00:00Z"
        });
        let post = prepare_post(value, Utc::now()).unwrap();
        assert_eq!(post.status, PublishStatus::Published);
        assert_eq!(post.published_at, Some(post.created_at));
    }

    #[test]
    fn legacy_messages_use_message_key() {
        let value = json!({
            "name": "Ada",
            "email": "ada@example.org",
            "message": "Can I volunteer?",
            "read": true
        });
        let message = prepare_message(value, Utc::now()).unwrap();
        assert_eq!(message.body, "Can I volunteer?");
        assert!(message.read);

        let invalid = json!({ "name": "Ada", "email": "nope", "message": "Hi" });
        assert!(matches!(prepare_message(invalid, Utc::now()), Err(SkipReason::Rejected(_))));
    }

    #[test]
    fn reimported_messages_keep_their_id() {
        let record = json!({
            "name": "Ada",
            "email": "ada@example.org",
            "subject": "Volunteering",
            "message": "Can I volunteer?",
            "createdAt": "2023-05-01T10:00:00Z"
        });
        let first = prepare_message(record.clone(), Utc::now()).unwrap();
        let again = prepare_message(record.clone(), Utc::now() + chrono::Duration::days(1)).unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.id.get_version_num(), 5);

        // no timestamp in the record still gives a stable id
        let undated = json!({ "name": "Ada", "email": "ada@example.org", "message": "Hi" });
        assert_eq!(
            prepare_message(undated.clone(), Utc::now()).unwrap().id,
            prepare_message(undated, Utc::now() + chrono::Duration::days(1)).unwrap().id
        );

        let mut other = record;
        other["message"] = json!("Can I donate?");
        assert_ne!(prepare_message(other, Utc::now()).unwrap().id, first.id);
    }
}
