use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use foundation_shared::AdminRole;
use uuid::Uuid;

use crate::{error::AppError, routes::AppState};

use super::jwt::verify_session_token;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: AdminRole,
}

impl AuthUser {
    pub fn require_message_access(&self) -> Result<(), AppError> {
        if self.role.can_manage_messages() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_admin_access(&self) -> Result<(), AppError> {
        if self.role.can_manage_admins() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// Value of the session cookie, if the request carries one.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Bearer token, falling back to the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .or_else(|| session_cookie(headers))
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(request.headers()).ok_or(AppError::Unauthorized)?;
    let claims = verify_session_token(token, &state.config.jwt_secret)?;

    // The role is re-read so a demoted admin loses access immediately.
    let row: Option<(AdminRole,)> = sqlx::query_as(
        r#"
        SELECT a.role
        FROM sessions s
        JOIN admins a ON a.id = s.admin_id
        WHERE s.id = $1 AND s.admin_id = $2 AND s.expires_at > NOW()
        "#,
    )
    .bind(claims.sid)
    .bind(claims.sub)
    .fetch_optional(&state.db)
    .await?;

    let (role,) = row.ok_or(AppError::Unauthorized)?;

    let auth_user = AuthUser {
        id: claims.sub,
        session_id: claims.sid,
        role,
    };

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=xyz"));
        assert_eq!(token_from_headers(&headers), Some("abc"));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session=xyz; lang=fr"));
        assert_eq!(token_from_headers(&headers), Some("xyz"));

        headers.insert(header::COOKIE, HeaderValue::from_static("sessionid=1; session="));
        assert_eq!(session_cookie(&headers), None);
    }

    #[test]
    fn role_guards() {
        let editor = AuthUser {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            role: AdminRole::Editor,
        };
        assert!(matches!(editor.require_message_access(), Err(AppError::Forbidden)));
        let admin = AuthUser { role: AdminRole::Admin, ..editor };
        assert!(admin.require_message_access().is_ok());
        assert!(matches!(admin.require_admin_access(), Err(AppError::Forbidden)));
    }
}
