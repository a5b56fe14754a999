use std::sync::OnceLock;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use foundation_shared::{
    api::{ContactRequest, MarkReadRequest},
    Message,
};
use regex::Regex;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::routes::AppState;

use super::non_blank;

type MessageRow = (
    Uuid,
    String,
    String,
    Option<String>,
    String,
    bool,
    DateTime<Utc>,
);

fn row_to_message(row: MessageRow) -> Message {
    Message {
        id: row.0,
        name: row.1,
        email: row.2,
        subject: row.3,
        body: row.4,
        read: row.5,
        created_at: row.6,
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// Checks a contact submission and builds the message to store.
pub(crate) fn new_message(req: ContactRequest) -> Result<Message, AppError> {
    let name = req.name.trim();
    let email = req.email.trim();
    let body = req.body.trim();

    if name.is_empty() || body.is_empty() {
        return Err(AppError::Validation("Name and message are required".to_string()));
    }
    if !is_valid_email(email) {
        return Err(AppError::Validation("A valid email address is required".to_string()));
    }

    Ok(Message {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        subject: non_blank(req.subject),
        body: body.to_string(),
        read: false,
        created_at: Utc::now(),
    })
}

/// Returns `false` when a message with the same id is already stored.
pub(crate) async fn insert_message<'e, E>(executor: E, message: &Message) -> Result<bool, AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO messages (id, name, email, subject, body, read, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(message.id)
    .bind(&message.name)
    .bind(&message.email)
    .bind(&message.subject)
    .bind(&message.body)
    .bind(message.read)
    .bind(message.created_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// POST /api/v1/messages
pub async fn submit_message(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<Message>, AppError> {
    let message = new_message(req)?;
    insert_message(&state.db, &message).await?;

    tracing::info!(message_id = %message.id, "Contact message received");

    Ok(Json(message))
}

/// GET /api/v1/admin/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Message>>, AppError> {
    user.require_message_access()?;

    let rows: Vec<MessageRow> = sqlx::query_as(
        r#"
        SELECT id, name, email, subject, body, read, created_at
        FROM messages
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows.into_iter().map(row_to_message).collect()))
}

/// PATCH /api/v1/admin/messages/:id
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<MarkReadRequest>,
) -> Result<Json<Message>, AppError> {
    user.require_message_access()?;

    let row: MessageRow = sqlx::query_as(
        r#"
        UPDATE messages SET read = $2
        WHERE id = $1
        RETURNING id, name, email, subject, body, read, created_at
        "#,
    )
    .bind(id)
    .bind(req.read)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(Json(row_to_message(row)))
}

/// DELETE /api/v1/admin/messages/:id
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    user.require_message_access()?;

    let result = sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(message_id = %id, admin_id = %user.id, "Message deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, body: &str) -> ContactRequest {
        ContactRequest {
            name: name.into(),
            email: email.into(),
            subject: Some("  ".into()),
            body: body.into(),
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ada@example.org"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example@org.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn contact_submission_is_trimmed() {
        let message = new_message(request(" Ada ", "ada@example.org ", "Hello\n")).unwrap();
        assert_eq!(message.name, "Ada");
        assert_eq!(message.email, "ada@example.org");
        assert_eq!(message.body, "Hello");
        assert_eq!(message.subject, None);
        assert!(!message.read);
    }

    #[test]
    fn incomplete_submissions_are_rejected() {
        assert!(matches!(
            new_message(request("", "ada@example.org", "Hi")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            new_message(request("Ada", "not-an-email", "Hi")),
            Err(AppError::Validation(_))
        ));
    }
}
