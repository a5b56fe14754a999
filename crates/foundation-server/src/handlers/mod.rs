pub mod admins;
pub mod auth;
pub mod blocks;
pub mod blog;
pub mod messages;
pub mod projects;

use uuid::Uuid;

use foundation_shared::save;

use crate::error::AppError;

/// Fails with a slug conflict when a record of `table` other than `editing`
/// already holds `slug`.
pub(crate) async fn ensure_slug_free<'e, E>(
    executor: E,
    table: &'static str,
    slug: &str,
    editing: Option<Uuid>,
) -> Result<(), AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    let sql = format!("SELECT id FROM {table} WHERE slug = $1");
    let owner: Option<(Uuid,)> = sqlx::query_as(&sql)
        .bind(slug)
        .fetch_optional(executor)
        .await?;

    save::ensure_slug_available(slug, owner.map(|(id,)| id), editing)?;
    Ok(())
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optionals_collapse_to_none() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" Dakar ".into())), Some("Dakar".into()));
        assert_eq!(non_blank(None), None);
    }
}
