use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::auth_middleware;
use crate::handlers::{
    admins as admin_handlers, auth as auth_handlers, blocks as block_handlers,
    blog as blog_handlers, messages as message_handlers, projects as project_handlers,
};
use crate::pages;
use crate::{Config, DbPool};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}

pub fn create_router(db: DbPool, config: Config) -> Router {
    let state = AppState { db, config };

    // Public site
    let page_routes = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/projects", get(pages::projects_index))
        .route("/projects/:slug", get(pages::project_page))
        .route("/blog", get(pages::blog_index))
        .route("/blog/:slug", get(pages::blog_page))
        .route("/contact", get(pages::contact_form).post(pages::contact_submit));

    // Public auth routes (no middleware)
    let public_auth_routes = Router::new().route("/login", post(auth_handlers::login));

    // Protected auth routes (need auth)
    let protected_auth_routes = Router::new()
        .route("/logout", post(auth_handlers::logout))
        .route("/me", get(auth_handlers::me))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let auth_routes = Router::new()
        .merge(public_auth_routes)
        .merge(protected_auth_routes);

    let project_routes = Router::new()
        .route(
            "/",
            get(project_handlers::list_projects).post(project_handlers::create_project),
        )
        .route(
            "/:id",
            get(project_handlers::get_project)
                .patch(project_handlers::update_project)
                .delete(project_handlers::delete_project),
        );

    let blog_routes = Router::new()
        .route("/", get(blog_handlers::list_posts).post(blog_handlers::create_post))
        .route(
            "/:id",
            get(blog_handlers::get_post)
                .patch(blog_handlers::update_post)
                .delete(blog_handlers::delete_post),
        );

    let message_routes = Router::new()
        .route("/", get(message_handlers::list_messages))
        .route(
            "/:id",
            patch(message_handlers::mark_read).delete(message_handlers::delete_message),
        );

    let admin_account_routes = Router::new()
        .route(
            "/",
            get(admin_handlers::list_admins).post(admin_handlers::create_admin),
        )
        .route(
            "/:id",
            get(admin_handlers::get_admin)
                .patch(admin_handlers::update_admin)
                .delete(admin_handlers::delete_admin),
        )
        .route("/:id/unlock", post(admin_handlers::unlock_admin));

    let block_routes = Router::new()
        .route("/palette", get(block_handlers::palette))
        .route("/preview", post(block_handlers::preview));

    // Admin API (all protected)
    let admin_routes = Router::new()
        .route("/menu", get(auth_handlers::menu))
        .nest("/projects", project_routes)
        .nest("/blog", blog_routes)
        .nest("/messages", message_routes)
        .nest("/admins", admin_account_routes)
        .nest("/blocks", block_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(page_routes)
        .route("/api/v1/messages", post(message_handlers::submit_message))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config {
            database_url: "postgres://localhost/foundation_test".into(),
            jwt_secret: "test-secret".into(),
            session_expires_in: 3600,
            port: 0,
            db_max_connections: 1,
            max_failed_logins: 5,
            lockout_minutes: 15,
        };
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        create_router(db, config)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn static_pages_render_without_database() {
        for path in ["/about", "/contact"] {
            let response = app()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path}");
            assert!(body_text(response).await.contains("<!DOCTYPE html>"));
        }
    }

    #[tokio::test]
    async fn admin_routes_require_a_session() {
        for path in ["/api/v1/admin/menu", "/api/v1/admin/blocks/palette", "/api/v1/auth/me"] {
            let response = app()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        }
    }

    #[tokio::test]
    async fn forged_tokens_are_rejected_before_the_database() {
        let response = app()
            .oneshot(
                Request::get("/api/v1/admin/projects")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("\"error\""));
    }

    #[tokio::test]
    async fn invalid_contact_form_is_redisplayed() {
        let response = app()
            .oneshot(
                Request::post("/contact")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=Ada&email=nope&subject=&body=Hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("A valid email address is required"));
    }

    #[tokio::test]
    async fn contact_api_validates_before_storing() {
        let response = app()
            .oneshot(
                Request::post("/api/v1/messages")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"","email":"ada@example.org","body":"Hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
