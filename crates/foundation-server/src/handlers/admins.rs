use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use foundation_shared::{
    api::{CreateAdminRequest, UpdateAdminRequest},
    Admin, AdminRole,
};
use uuid::Uuid;

use crate::auth::{hash_password, AuthUser};
use crate::db::DbPool;
use crate::error::AppError;
use crate::routes::AppState;

use super::messages::is_valid_email;

const MIN_PASSWORD_LEN: usize = 8;

type AdminRow = (
    Uuid,                    // id
    String,                  // email
    String,                  // display_name
    AdminRole,               // role
    i32,                     // failed_attempts
    Option<DateTime<Utc>>,   // locked_until
    Option<DateTime<Utc>>,   // last_login_at
    DateTime<Utc>,           // created_at
    DateTime<Utc>,           // updated_at
);

fn row_to_admin(row: AdminRow) -> Admin {
    Admin {
        id: row.0,
        email: row.1,
        display_name: row.2,
        role: row.3,
        failed_attempts: row.4,
        locked_until: row.5,
        last_login_at: row.6,
        created_at: row.7,
        updated_at: row.8,
    }
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) async fn fetch_admin(db: &DbPool, id: Uuid) -> Result<Option<Admin>, AppError> {
    let row: Option<AdminRow> = sqlx::query_as(
        r#"
        SELECT id, email, display_name, role, failed_attempts, locked_until, last_login_at,
               created_at, updated_at
        FROM admins
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(row_to_admin))
}

/// GET /api/v1/admin/admins
pub async fn list_admins(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Admin>>, AppError> {
    user.require_admin_access()?;

    let rows: Vec<AdminRow> = sqlx::query_as(
        r#"
        SELECT id, email, display_name, role, failed_attempts, locked_until, last_login_at,
               created_at, updated_at
        FROM admins
        ORDER BY email
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows.into_iter().map(row_to_admin).collect()))
}

/// POST /api/v1/admin/admins
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateAdminRequest>,
) -> Result<Json<Admin>, AppError> {
    user.require_admin_access()?;

    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::Validation("A valid email address is required".to_string()));
    }
    if req.display_name.trim().is_empty() {
        return Err(AppError::Validation("Display name is required".to_string()));
    }
    check_password(&req.password)?;

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM admins WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("An admin with this email already exists".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let now = Utc::now();
    let admin = Admin {
        id: Uuid::new_v4(),
        email,
        display_name: req.display_name.trim().to_string(),
        role: req.role,
        failed_attempts: 0,
        locked_until: None,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO admins (id, email, display_name, password_hash, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(admin.id)
    .bind(&admin.email)
    .bind(&admin.display_name)
    .bind(&password_hash)
    .bind(admin.role)
    .bind(admin.created_at)
    .bind(admin.updated_at)
    .execute(&state.db)
    .await?;

    tracing::info!(target_admin = %admin.id, admin_id = %user.id, role = ?admin.role, "Admin created");

    Ok(Json(admin))
}

/// GET /api/v1/admin/admins/:id
pub async fn get_admin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Admin>, AppError> {
    user.require_admin_access()?;

    let admin = fetch_admin(&state.db, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(admin))
}

/// PATCH /api/v1/admin/admins/:id
pub async fn update_admin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAdminRequest>,
) -> Result<Json<Admin>, AppError> {
    user.require_admin_access()?;

    let mut admin = fetch_admin(&state.db, id).await?.ok_or(AppError::NotFound)?;

    if let Some(display_name) = req.display_name {
        if display_name.trim().is_empty() {
            return Err(AppError::Validation("Display name is required".to_string()));
        }
        admin.display_name = display_name.trim().to_string();
    }
    if let Some(role) = req.role {
        if id == user.id && role != AdminRole::SuperAdmin {
            return Err(AppError::Validation("You cannot change your own role".to_string()));
        }
        admin.role = role;
    }
    let password_hash = match req.password {
        Some(password) => {
            check_password(&password)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };
    admin.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE admins
        SET display_name = $2, role = $3, password_hash = COALESCE($4, password_hash),
            updated_at = $5
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&admin.display_name)
    .bind(admin.role)
    .bind(&password_hash)
    .bind(admin.updated_at)
    .execute(&state.db)
    .await?;

    if password_hash.is_some() {
        // A new password signs the account out everywhere.
        sqlx::query("DELETE FROM sessions WHERE admin_id = $1")
            .bind(id)
            .execute(&state.db)
            .await?;
    }

    tracing::info!(target_admin = %id, admin_id = %user.id, "Admin updated");

    Ok(Json(admin))
}

/// POST /api/v1/admin/admins/:id/unlock
pub async fn unlock_admin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Admin>, AppError> {
    user.require_admin_access()?;

    let result = sqlx::query(
        "UPDATE admins SET failed_attempts = 0, locked_until = NULL, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(target_admin = %id, admin_id = %user.id, "Admin unlocked");

    let admin = fetch_admin(&state.db, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(admin))
}

/// DELETE /api/v1/admin/admins/:id
pub async fn delete_admin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    user.require_admin_access()?;

    if id == user.id {
        return Err(AppError::Validation("You cannot delete your own account".to_string()));
    }

    let result = sqlx::query("DELETE FROM admins WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(target_admin = %id, admin_id = %user.id, "Admin deleted");

    Ok(())
}
