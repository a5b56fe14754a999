use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use foundation_shared::{
    api::{CreateBlogPostRequest, UpdateBlogPostRequest},
    blocks::codec::{self, CodecError},
    save, BlogPost, BlogPostSummary, PublishStatus,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::AppError;
use crate::routes::AppState;

use super::{ensure_slug_free, non_blank};

type BlogPostRow = (
    Uuid,                    // id
    String,                  // title
    String,                  // slug
    String,                  // excerpt
    Option<String>,          // cover_image
    Option<String>,          // author
    Option<String>,          // tags
    PublishStatus,           // status
    Option<DateTime<Utc>>,   // published_at
    Option<String>,          // content
    DateTime<Utc>,           // created_at
    DateTime<Utc>,           // updated_at
);

type SummaryRow = (
    Uuid,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    PublishStatus,
    Option<DateTime<Utc>>,
);

fn row_to_post(row: BlogPostRow) -> Result<BlogPost, CodecError> {
    Ok(BlogPost {
        id: row.0,
        title: row.1,
        slug: row.2,
        excerpt: row.3,
        cover_image: row.4,
        author: row.5,
        tags: codec::decode_list("tags", row.6.as_deref())?,
        status: row.7,
        published_at: row.8,
        content: codec::decode_document(row.9.as_deref())?,
        created_at: row.10,
        updated_at: row.11,
    })
}

fn row_to_summary(row: SummaryRow) -> BlogPostSummary {
    BlogPostSummary {
        id: row.0,
        title: row.1,
        slug: row.2,
        excerpt: row.3,
        cover_image: row.4,
        author: row.5,
        status: row.6,
        published_at: row.7,
    }
}

/// Keeps `published_at` in step with the status: stamped on first publish,
/// cleared when the post goes back to draft.
fn apply_status(post: &mut BlogPost, status: PublishStatus, now: DateTime<Utc>) {
    post.status = status;
    match status {
        PublishStatus::Published => {
            post.published_at.get_or_insert(now);
        }
        PublishStatus::Draft => post.published_at = None,
    }
}

pub(crate) async fn fetch_post(db: &DbPool, id: Uuid) -> Result<Option<BlogPost>, AppError> {
    let row: Option<BlogPostRow> = sqlx::query_as(
        r#"
        SELECT id, title, slug, excerpt, cover_image, author, tags, status, published_at,
               content, created_at, updated_at
        FROM blog_posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(row_to_post).transpose()?)
}

pub(crate) async fn fetch_published_post(db: &DbPool, slug: &str) -> Result<Option<BlogPost>, AppError> {
    let row: Option<BlogPostRow> = sqlx::query_as(
        r#"
        SELECT id, title, slug, excerpt, cover_image, author, tags, status, published_at,
               content, created_at, updated_at
        FROM blog_posts
        WHERE slug = $1 AND status = 'published'
        "#,
    )
    .bind(slug)
    .fetch_optional(db)
    .await?;

    Ok(row.map(row_to_post).transpose()?)
}

/// Published posts, newest first.
pub(crate) async fn list_published_posts(
    db: &DbPool,
    limit: i64,
) -> Result<Vec<BlogPostSummary>, AppError> {
    let rows: Vec<SummaryRow> = sqlx::query_as(
        r#"
        SELECT id, title, slug, excerpt, cover_image, author, status, published_at
        FROM blog_posts
        WHERE status = 'published'
        ORDER BY published_at DESC NULLS LAST
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(row_to_summary).collect())
}

pub(crate) async fn insert_post<'e, E>(executor: E, post: &BlogPost) -> Result<(), AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO blog_posts (id, title, slug, excerpt, cover_image, author, tags, status,
                                published_at, content, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(post.id)
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.excerpt)
    .bind(&post.cover_image)
    .bind(&post.author)
    .bind(codec::encode_list("tags", &post.tags)?)
    .bind(post.status)
    .bind(post.published_at)
    .bind(codec::encode_document(&post.content)?)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// GET /api/v1/admin/blog
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPostSummary>>, AppError> {
    let rows: Vec<SummaryRow> = sqlx::query_as(
        r#"
        SELECT id, title, slug, excerpt, cover_image, author, status, published_at
        FROM blog_posts
        ORDER BY updated_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows.into_iter().map(row_to_summary).collect()))
}

/// POST /api/v1/admin/blog
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateBlogPostRequest>,
) -> Result<Json<BlogPost>, AppError> {
    save::require("title", &req.title)?;
    save::require("excerpt", &req.excerpt)?;

    let slug = save::derive_slug(&req.title)?;
    ensure_slug_free(&state.db, "blog_posts", &slug, None).await?;

    let now = Utc::now();
    let mut post = BlogPost {
        id: Uuid::new_v4(),
        title: req.title.trim().to_string(),
        slug,
        excerpt: req.excerpt.trim().to_string(),
        cover_image: non_blank(req.cover_image),
        author: non_blank(req.author),
        tags: req.tags,
        status: PublishStatus::Draft,
        published_at: None,
        content: req.content,
        created_at: now,
        updated_at: now,
    };
    apply_status(&mut post, req.status, now);

    insert_post(&state.db, &post).await?;

    tracing::info!(post_id = %post.id, admin_id = %user.id, slug = %post.slug, "Blog post created");

    Ok(Json(post))
}

/// GET /api/v1/admin/blog/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BlogPost>, AppError> {
    let post = fetch_post(&state.db, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(post))
}

/// PATCH /api/v1/admin/blog/:id
pub async fn update_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBlogPostRequest>,
) -> Result<Json<BlogPost>, AppError> {
    let mut post = fetch_post(&state.db, id).await?.ok_or(AppError::NotFound)?;
    let now = Utc::now();

    if let Some(title) = req.title {
        save::require("title", &title)?;
        let title = title.trim().to_string();
        if title != post.title {
            let slug = save::derive_slug(&title)?;
            ensure_slug_free(&state.db, "blog_posts", &slug, Some(id)).await?;
            post.slug = slug;
            post.title = title;
        }
    }
    if let Some(excerpt) = req.excerpt {
        save::require("excerpt", &excerpt)?;
        post.excerpt = excerpt.trim().to_string();
    }
    if req.cover_image.is_some() {
        post.cover_image = non_blank(req.cover_image);
    }
    if req.author.is_some() {
        post.author = non_blank(req.author);
    }
    if let Some(tags) = req.tags {
        post.tags = tags;
    }
    if let Some(status) = req.status {
        apply_status(&mut post, status, now);
    }
    if let Some(content) = req.content {
        post.content = content;
    }
    post.updated_at = now;

    sqlx::query(
        r#"
        UPDATE blog_posts
        SET title = $2, slug = $3, excerpt = $4, cover_image = $5, author = $6, tags = $7,
            status = $8, published_at = $9, content = $10, updated_at = $11
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.excerpt)
    .bind(&post.cover_image)
    .bind(&post.author)
    .bind(codec::encode_list("tags", &post.tags)?)
    .bind(post.status)
    .bind(post.published_at)
    .bind(codec::encode_document(&post.content)?)
    .bind(post.updated_at)
    .execute(&state.db)
    .await?;

    tracing::info!(post_id = %id, admin_id = %user.id, "Blog post updated");

    Ok(Json(post))
}

/// DELETE /api/v1/admin/blog/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(post_id = %id, admin_id = %user.id, "Blog post deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation_shared::blocks::ContentDocument;

    fn draft() -> BlogPost {
        let now = Utc::now();
        BlogPost {
            id: Uuid::new_v4(),
            title: "Rains".into(),
            slug: "rains".into(),
            excerpt: "Season report".into(),
            cover_image: None,
            author: None,
            tags: vec![],
            status: PublishStatus::Draft,
            published_at: None,
            content: ContentDocument::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn first_publish_stamps_the_date_once() {
        let mut post = draft();
        let first = Utc::now();
        apply_status(&mut post, PublishStatus::Published, first);
        assert_eq!(post.published_at, Some(first));

        apply_status(&mut post, PublishStatus::Published, first + chrono::Duration::days(1));
        assert_eq!(post.published_at, Some(first));
    }

    #[test]
    fn unpublishing_clears_the_date() {
        let mut post = draft();
        apply_status(&mut post, PublishStatus::Published, Utc::now());
        apply_status(&mut post, PublishStatus::Draft, Utc::now());
        assert_eq!(post.status, PublishStatus::Draft);
        assert_eq!(post.published_at, None);
    }
}
