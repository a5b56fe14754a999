//! Public HTML pages. Only published records are shown.

mod layout;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use foundation_shared::api::ContactRequest;
use foundation_shared::blocks::render::{self, Escaped, RenderContext, SafeUrl};
use foundation_shared::{BlogPost, Project};

use crate::error::AppError;
use crate::handlers::{blog, messages, projects};
use crate::routes::AppState;

pub use layout::{card, page, PageError, SITE_NAME};

const HOME_POSTS: i64 = 3;
const HOME_PROJECTS: usize = 3;

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let projects = projects::list_published_projects(&state.db).await?;
    let posts = blog::list_published_posts(&state.db, HOME_POSTS).await?;

    let project_cards: String = projects
        .iter()
        .take(HOME_PROJECTS)
        .map(|p| card(&format!("/projects/{}", p.slug), &p.title, &p.excerpt, p.cover_image.as_deref()))
        .collect();
    let post_cards: String = posts
        .iter()
        .map(|p| card(&format!("/blog/{}", p.slug), &p.title, &p.excerpt, p.cover_image.as_deref()))
        .collect();

    let body = format!(
        r#"<section class="hero"><h1>{SITE_NAME}</h1><p>Supporting communities through education, clean water and health programmes.</p><a class="button" href="/contact">Get involved</a></section><section><h2>Our projects</h2><div class="cards">{project_cards}</div><a href="/projects">All projects</a></section><section><h2>Latest news</h2><div class="cards">{post_cards}</div><a href="/blog">All posts</a></section>"#
    );

    Ok(page("Home", &body))
}

/// GET /about
pub async fn about() -> Html<String> {
    page(
        "About",
        r#"<section><h1>About us</h1><p>We are an independent nonprofit foundation. We partner with local organisations to run long-term projects in education, water access and community health.</p><p>Every project is planned with the communities it serves and reported on openly through this site.</p></section>"#,
    )
}

/// GET /projects
pub async fn projects_index(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let projects = projects::list_published_projects(&state.db).await?;

    let cards: String = if projects.is_empty() {
        "<p>No projects yet.</p>".to_string()
    } else {
        projects
            .iter()
            .map(|p| card(&format!("/projects/{}", p.slug), &p.title, &p.excerpt, p.cover_image.as_deref()))
            .collect()
    };

    Ok(page("Projects", &format!(r#"<h1>Projects</h1><div class="cards">{cards}</div>"#)))
}

/// GET /projects/:slug
pub async fn project_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, PageError> {
    let project = projects::fetch_published_project(&state.db, &slug)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(page(&project.title, &project_body(&project)))
}

fn project_body(project: &Project) -> String {
    let mut body = format!(r#"<article class="project"><header><h1>{}</h1>"#, Escaped(&project.title));
    if let Some(location) = &project.location {
        body.push_str(&format!(r#"<p class="location">{}</p>"#, Escaped(location)));
    }
    body.push_str(&tag_list("categories", &project.categories));
    body.push_str(&format!(r#"<p class="excerpt">{}</p></header>"#, Escaped(&project.excerpt)));
    if let Some(cover) = &project.cover_image {
        body.push_str(&format!(r#"<img class="cover" src="{}" alt="">"#, SafeUrl(cover)));
    }
    if !project.goals.is_empty() {
        body.push_str(r#"<section class="goals"><h2>Goals</h2><ul>"#);
        for goal in &project.goals {
            body.push_str(&format!("<li>{}</li>", Escaped(goal)));
        }
        body.push_str("</ul></section>");
    }
    body.push_str(render::render_document(&project.content, RenderContext::Public).as_str());
    if !project.gallery.is_empty() {
        body.push_str(r#"<section class="gallery">"#);
        for src in &project.gallery {
            body.push_str(&format!(r#"<img src="{}" alt="" loading="lazy">"#, SafeUrl(src)));
        }
        body.push_str("</section>");
    }
    body.push_str("</article>");
    body
}

fn tag_list(class: &str, tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let items: String = tags
        .iter()
        .map(|t| format!("<li>{}</li>", Escaped(t)))
        .collect();
    format!(r#"<ul class="{class}">{items}</ul>"#)
}

/// GET /blog
pub async fn blog_index(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let posts = blog::list_published_posts(&state.db, i64::MAX).await?;

    let cards: String = if posts.is_empty() {
        "<p>No posts yet.</p>".to_string()
    } else {
        posts
            .iter()
            .map(|p| card(&format!("/blog/{}", p.slug), &p.title, &p.excerpt, p.cover_image.as_deref()))
            .collect()
    };

    Ok(page("Blog", &format!(r#"<h1>Blog</h1><div class="cards">{cards}</div>"#)))
}

/// GET /blog/:slug
pub async fn blog_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, PageError> {
    let post = blog::fetch_published_post(&state.db, &slug)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(page(&post.title, &post_body(&post)))
}

fn post_body(post: &BlogPost) -> String {
    let mut body = format!(r#"<article class="post"><header><h1>{}</h1><p class="meta">"#, Escaped(&post.title));
    if let Some(author) = &post.author {
        body.push_str(&format!("By {}", Escaped(author)));
    }
    if let Some(date) = post.published_at {
        body.push_str(&format!(r#" <time datetime="{}">{}</time>"#, date.to_rfc3339(), date.format("%-d %B %Y")));
    }
    body.push_str("</p>");
    body.push_str(&tag_list("tags", &post.tags));
    body.push_str("</header>");
    body.push_str(render::render_document(&post.content, RenderContext::Public).as_str());
    body.push_str("</article>");
    body
}

/// GET /contact
pub async fn contact_form() -> Html<String> {
    page("Contact", &contact_body(None, None))
}

/// POST /contact
pub async fn contact_submit(
    State(state): State<AppState>,
    Form(req): Form<ContactRequest>,
) -> Result<Response, PageError> {
    let message = match messages::new_message(req) {
        Ok(message) => message,
        Err(AppError::Validation(reason)) => {
            let html = page("Contact", &contact_body(Some(&reason), None));
            return Ok((StatusCode::BAD_REQUEST, html).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    messages::insert_message(&state.db, &message).await?;
    tracing::info!(message_id = %message.id, "Contact form submitted");

    Ok(page("Contact", &contact_body(None, Some("Thank you, we will be in touch soon."))).into_response())
}

fn contact_body(error: Option<&str>, notice: Option<&str>) -> String {
    let mut body = String::from("<h1>Contact us</h1>");
    if let Some(error) = error {
        body.push_str(&format!(r#"<p class="form-error">{}</p>"#, Escaped(error)));
    }
    if let Some(notice) = notice {
        body.push_str(&format!(r#"<p class="form-notice">{}</p>"#, Escaped(notice)));
        return body;
    }
    body.push_str(
        r#"<form method="post" action="/contact"><label>Name <input name="name" required></label><label>Email <input type="email" name="email" required></label><label>Subject <input name="subject"></label><label>Message <textarea name="body" rows="6" required></textarea></label><button type="submit">Send</button></form>"#,
    );
    body
}
