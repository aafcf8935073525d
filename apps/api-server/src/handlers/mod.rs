//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod blog;
mod health;


use std::str::FromStr;

use actix_web::web;
use chrono::{DateTime, Utc};

use inkpress_core::domain::Category;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(web::scope("/auth").route("/login", web::post().to(auth::login)))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(blog::list_posts))
                    .route("/slug/{slug}", web::get().to(blog::get_post_by_slug))
                    .route("/{id}", web::get().to(blog::get_post))
                    .route("/{id}/like", web::post().to(blog::like_post))
                    .route("/{id}/like", web::delete().to(blog::unlike_post))
                    .route("/{id}/share", web::get().to(blog::share_post)),
            )
            // Admin routes, gated by the `Identity` extractor
            .service(
                web::scope("/admin")
                    .route("/posts", web::get().to(admin::list_posts))
                    .route("/posts", web::post().to(admin::create_post))
                    .route("/posts/refresh", web::post().to(admin::refresh))
                    .route("/posts/load-more", web::post().to(admin::load_more))
                    .route("/posts/bulk", web::post().to(admin::bulk_action))
                    .route("/posts/{id}", web::patch().to(admin::update_post))
                    .route("/posts/{id}", web::delete().to(admin::delete_post))
                    .route(
                        "/posts/{id}/toggle-published",
                        web::post().to(admin::toggle_published),
                    )
                    .route(
                        "/posts/{id}/toggle-featured",
                        web::post().to(admin::toggle_featured),
                    )
                    .route("/export", web::get().to(admin::export))
                    .route("/import", web::post().to(admin::import))
                    .route("/activity", web::get().to(admin::activity))
                    .route("/metrics", web::get().to(admin::metrics)),
            ),
    );
}

/// Parse an optional query value, treating blank as absent.
fn parse_param<T>(raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: ToString,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| AppError::BadRequest(e.to_string())),
        None => Ok(None),
    }
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, AppError> {
    parse_param(raw)
}

fn parse_date(field: &str, raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| format!("{field} must be an RFC 3339 timestamp"))
}
