use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use foundation_shared::api::{LoginRequest, LoginResponse, MeResponse, MenuEntry};
use foundation_shared::AdminRole;
use uuid::Uuid;

use crate::auth::{create_session_token, verify_password, verify_unknown_account, AuthUser, SESSION_COOKIE};
use crate::error::AppError;
use crate::routes::AppState;

use super::admins::fetch_admin;

fn session_cookie_header(token: &str, max_age: i64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}")
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = req.email.trim().to_lowercase();

    let row: Option<(Uuid, String, AdminRole, Option<DateTime<Utc>>)> = sqlx::query_as(
        "SELECT id, password_hash, role, locked_until FROM admins WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?;

    // Unknown emails fail exactly like wrong passwords, in the same time.
    let Some((admin_id, password_hash, role, locked_until)) = row else {
        verify_unknown_account(&req.password);
        return Err(AppError::Unauthorized);
    };

    let policy = state.config.lockout_policy();
    let now = Utc::now();

    if let Some(until) = policy.active_lock(locked_until, now) {
        return Err(AppError::AccountLocked(until));
    }

    if !verify_password(&req.password, &password_hash)? {
        if let Some(until) = policy.record_failure(&state.db, admin_id, now).await? {
            tracing::warn!(admin_id = %admin_id, %until, "Account locked after repeated failed logins");
            return Err(AppError::AccountLocked(until));
        }
        return Err(AppError::Unauthorized);
    }

    if let Some(until) = policy.record_success(&state.db, admin_id, now).await? {
        return Err(AppError::AccountLocked(until));
    }

    let session_id = Uuid::new_v4();
    let expires_in = state.config.session_expires_in;

    sqlx::query("INSERT INTO sessions (id, admin_id, expires_at) VALUES ($1, $2, $3)")
        .bind(session_id)
        .bind(admin_id)
        .bind(now + Duration::seconds(expires_in))
        .execute(&state.db)
        .await?;

    let token = create_session_token(admin_id, session_id, role, &state.config.jwt_secret, expires_in)?;

    tracing::info!(admin_id = %admin_id, "Admin logged in");

    Ok((
        [(header::SET_COOKIE, session_cookie_header(&token, expires_in))],
        Json(LoginResponse {
            token,
            expires_in,
            admin_id,
            role,
        }),
    ))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(user.session_id)
        .execute(&state.db)
        .await?;

    Ok([(header::SET_COOKIE, session_cookie_header("", 0))])
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>, AppError> {
    let admin = fetch_admin(&state.db, user.id).await?.ok_or(AppError::NotFound)?;
    let menu = admin.role.menu().into_iter().map(MenuEntry::from).collect();

    Ok(Json(MeResponse { admin, menu }))
}

/// GET /api/v1/admin/menu
pub async fn menu(Extension(user): Extension<AuthUser>) -> Json<Vec<MenuEntry>> {
    Json(user.role.menu().into_iter().map(MenuEntry::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_is_http_only() {
        let cookie = session_cookie_header("abc", 60);
        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("Max-Age=60"));
    }
}
