//! Checks run on the save path of projects and blog posts, before anything
//! is written.

use thiserror::Error;
use uuid::Uuid;

use crate::slug::slugify;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("{0} is required")]
    AuthoringInput(&'static str),

    #[error("the slug {0:?} is already used by another entry")]
    SlugConflict(String),
}

/// Reject a blank required field.
pub fn require(field: &'static str, value: &str) -> Result<(), SaveError> {
    if value.trim().is_empty() {
        return Err(SaveError::AuthoringInput(field));
    }
    Ok(())
}

/// Slug for `title`. A title with no word characters cannot be routed to.
pub fn derive_slug(title: &str) -> Result<String, SaveError> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(SaveError::AuthoringInput("title"));
    }
    Ok(slug)
}

/// `owner` is the entry currently holding `slug`, `editing` the entry being
/// saved (`None` when creating).
pub fn ensure_slug_available(
    slug: &str,
    owner: Option<Uuid>,
    editing: Option<Uuid>,
) -> Result<(), SaveError> {
    match owner {
        Some(owner) if Some(owner) != editing => Err(SaveError::SlugConflict(slug.to_string())),
        _ => Ok(()),
    }
}
