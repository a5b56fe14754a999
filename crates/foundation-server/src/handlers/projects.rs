use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use foundation_shared::{
    api::{CreateProjectRequest, UpdateProjectRequest},
    blocks::codec::{self, CodecError},
    save, Project, ProjectSummary, PublishStatus,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::AppError;
use crate::routes::AppState;

use super::{ensure_slug_free, non_blank};

type ProjectRow = (
    Uuid,                // id
    String,              // title
    String,              // slug
    String,              // excerpt
    Option<String>,      // cover_image
    Option<String>,      // location
    PublishStatus,       // status
    bool,                // featured
    Option<String>,      // categories
    Option<String>,      // goals
    Option<String>,      // gallery
    Option<String>,      // content
    DateTime<Utc>,       // created_at
    DateTime<Utc>,       // updated_at
);

type SummaryRow = (
    Uuid,
    String,
    String,
    String,
    Option<String>,
    PublishStatus,
    bool,
    DateTime<Utc>,
);

fn row_to_project(row: ProjectRow) -> Result<Project, CodecError> {
    Ok(Project {
        id: row.0,
        title: row.1,
        slug: row.2,
        excerpt: row.3,
        cover_image: row.4,
        location: row.5,
        status: row.6,
        featured: row.7,
        categories: codec::decode_list("categories", row.8.as_deref())?,
        goals: codec::decode_list("goals", row.9.as_deref())?,
        gallery: codec::decode_list("gallery", row.10.as_deref())?,
        content: codec::decode_document(row.11.as_deref())?,
        created_at: row.12,
        updated_at: row.13,
    })
}

fn row_to_summary(row: SummaryRow) -> ProjectSummary {
    ProjectSummary {
        id: row.0,
        title: row.1,
        slug: row.2,
        excerpt: row.3,
        cover_image: row.4,
        status: row.5,
        featured: row.6,
        updated_at: row.7,
    }
}

pub(crate) async fn fetch_project(db: &DbPool, id: Uuid) -> Result<Option<Project>, AppError> {
    let row: Option<ProjectRow> = sqlx::query_as(
        r#"
        SELECT id, title, slug, excerpt, cover_image, location, status, featured,
               categories, goals, gallery, content, created_at, updated_at
        FROM projects
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(row_to_project).transpose()?)
}

pub(crate) async fn fetch_published_project(
    db: &DbPool,
    slug: &str,
) -> Result<Option<Project>, AppError> {
    let row: Option<ProjectRow> = sqlx::query_as(
        r#"
        SELECT id, title, slug, excerpt, cover_image, location, status, featured,
               categories, goals, gallery, content, created_at, updated_at
        FROM projects
        WHERE slug = $1 AND status = 'published'
        "#,
    )
    .bind(slug)
    .fetch_optional(db)
    .await?;

    Ok(row.map(row_to_project).transpose()?)
}

/// Published projects, featured first.
pub(crate) async fn list_published_projects(db: &DbPool) -> Result<Vec<ProjectSummary>, AppError> {
    let rows: Vec<SummaryRow> = sqlx::query_as(
        r#"
        SELECT id, title, slug, excerpt, cover_image, status, featured, updated_at
        FROM projects
        WHERE status = 'published'
        ORDER BY featured DESC, updated_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(row_to_summary).collect())
}

pub(crate) async fn insert_project<'e, E>(executor: E, project: &Project) -> Result<(), AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO projects (id, title, slug, excerpt, cover_image, location, status, featured,
                              categories, goals, gallery, content, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(project.id)
    .bind(&project.title)
    .bind(&project.slug)
    .bind(&project.excerpt)
    .bind(&project.cover_image)
    .bind(&project.location)
    .bind(project.status)
    .bind(project.featured)
    .bind(codec::encode_list("categories", &project.categories)?)
    .bind(codec::encode_list("goals", &project.goals)?)
    .bind(codec::encode_list("gallery", &project.gallery)?)
    .bind(codec::encode_document(&project.content)?)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// GET /api/v1/admin/projects
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectSummary>>, AppError> {
    let rows: Vec<SummaryRow> = sqlx::query_as(
        r#"
        SELECT id, title, slug, excerpt, cover_image, status, featured, updated_at
        FROM projects
        ORDER BY updated_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows.into_iter().map(row_to_summary).collect()))
}

/// POST /api/v1/admin/projects
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    save::require("title", &req.title)?;
    save::require("excerpt", &req.excerpt)?;

    let slug = save::derive_slug(&req.title)?;
    ensure_slug_free(&state.db, "projects", &slug, None).await?;

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4(),
        title: req.title.trim().to_string(),
        slug,
        excerpt: req.excerpt.trim().to_string(),
        cover_image: non_blank(req.cover_image),
        location: non_blank(req.location),
        status: req.status,
        featured: req.featured,
        categories: req.categories,
        goals: req.goals,
        gallery: req.gallery,
        content: req.content,
        created_at: now,
        updated_at: now,
    };

    insert_project(&state.db, &project).await?;

    tracing::info!(project_id = %project.id, admin_id = %user.id, slug = %project.slug, "Project created");

    Ok(Json(project))
}

/// GET /api/v1/admin/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, AppError> {
    let project = fetch_project(&state.db, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(project))
}

/// PATCH /api/v1/admin/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    let mut project = fetch_project(&state.db, id).await?.ok_or(AppError::NotFound)?;

    if let Some(title) = req.title {
        save::require("title", &title)?;
        let title = title.trim().to_string();
        if title != project.title {
            let slug = save::derive_slug(&title)?;
            ensure_slug_free(&state.db, "projects", &slug, Some(id)).await?;
            project.slug = slug;
            project.title = title;
        }
    }
    if let Some(excerpt) = req.excerpt {
        save::require("excerpt", &excerpt)?;
        project.excerpt = excerpt.trim().to_string();
    }
    if req.cover_image.is_some() {
        project.cover_image = non_blank(req.cover_image);
    }
    if req.location.is_some() {
        project.location = non_blank(req.location);
    }
    if let Some(status) = req.status {
        project.status = status;
    }
    if let Some(featured) = req.featured {
        project.featured = featured;
    }
    if let Some(categories) = req.categories {
        project.categories = categories;
    }
    if let Some(goals) = req.goals {
        project.goals = goals;
    }
    if let Some(gallery) = req.gallery {
        project.gallery = gallery;
    }
    if let Some(content) = req.content {
        project.content = content;
    }
    project.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE projects
        SET title = $2, slug = $3, excerpt = $4, cover_image = $5, location = $6,
            status = $7, featured = $8, categories = $9, goals = $10, gallery = $11,
            content = $12, updated_at = $13
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&project.title)
    .bind(&project.slug)
    .bind(&project.excerpt)
    .bind(&project.cover_image)
    .bind(&project.location)
    .bind(project.status)
    .bind(project.featured)
    .bind(codec::encode_list("categories", &project.categories)?)
    .bind(codec::encode_list("goals", &project.goals)?)
    .bind(codec::encode_list("gallery", &project.gallery)?)
    .bind(codec::encode_document(&project.content)?)
    .bind(project.updated_at)
    .execute(&state.db)
    .await?;

    tracing::info!(project_id = %id, admin_id = %user.id, "Project updated");

    Ok(Json(project))
}

/// DELETE /api/v1/admin/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(project_id = %id, admin_id = %user.id, "Project deleted");

    Ok(())
}
