use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use foundation_shared::blocks::render::{Escaped, SafeUrl};

use crate::error::AppError;

pub const SITE_NAME: &str = "The Foundation";

const NAV: [(&str, &str); 5] = [
    ("/", "Home"),
    ("/about", "About"),
    ("/projects", "Projects"),
    ("/blog", "Blog"),
    ("/contact", "Contact"),
];

/// Wraps page `body` in the site chrome. `title` is escaped, `body` is
/// trusted HTML.
pub fn page(title: &str, body: &str) -> Html<String> {
    let nav: String = NAV
        .iter()
        .map(|(href, label)| format!(r#"<a href="{href}">{label}</a>"#))
        .collect();

    Html(format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{title} | {SITE_NAME}</title><link rel="stylesheet" href="/static/site.css"></head><body><header class="site-header"><a class="brand" href="/">{SITE_NAME}</a><nav>{nav}</nav></header><main>{body}</main><footer class="site-footer">&copy; {SITE_NAME}</footer></body></html>"#,
        title = Escaped(title),
    ))
}

/// A listing card linking to `href`.
pub fn card(href: &str, title: &str, excerpt: &str, image: Option<&str>) -> String {
    let image = image
        .filter(|src| !src.trim().is_empty())
        .map(|src| format!(r#"<img src="{}" alt="" loading="lazy">"#, SafeUrl(src)))
        .unwrap_or_default();
    format!(
        r#"<article class="card"><a href="{}">{image}<h3>{}</h3></a><p>{}</p></article>"#,
        SafeUrl(href),
        Escaped(title),
        Escaped(excerpt)
    )
}

/// Error surfaced by a public page. Missing records and content that fails
/// to decode both show the not-found page.
#[derive(Debug)]
pub struct PageError(AppError);

impl<E: Into<AppError>> From<E> for PageError {
    fn from(e: E) -> Self {
        PageError(e.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, heading, detail) = match &self.0 {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "Page not found",
                "The page you are looking for does not exist.",
            ),
            AppError::Decode(e) => {
                tracing::error!("Page content could not be decoded: {:?}", e);
                (
                    StatusCode::NOT_FOUND,
                    "Page unavailable",
                    "This page is currently unavailable.",
                )
            }
            other => {
                tracing::error!("Page failed: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                    "Please try again later.",
                )
            }
        };

        let body = format!(r#"<section class="error"><h1>{heading}</h1><p>{detail}</p></section>"#);
        (status, page(heading, &body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation_shared::blocks::codec::CodecError;

    #[test]
    fn page_escapes_title() {
        let Html(html) = page("<Water & Wells>", "<p>body</p>");
        assert!(html.contains("<title>&lt;Water &amp; Wells&gt; | The Foundation</title>"));
        assert!(html.contains("<main><p>body</p></main>"));
    }

    #[test]
    fn card_skips_blank_image() {
        let html = card("/projects/wells", "Wells", "Clean water", Some(" "));
        assert!(!html.contains("<img"));
        assert!(html.contains(r#"<a href="/projects/wells"><h3>Wells</h3></a>"#));
    }

    #[test]
    fn decode_failures_read_as_not_found() {
        let response = PageError::from(CodecError::NotAnArray { field: "content" }).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = PageError::from(AppError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
