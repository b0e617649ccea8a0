//! HTTP handlers and route configuration.

mod auth;
mod health;
mod pages;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, http::header, web};

use quill_core::domain::User;
use quill_core::error::DomainError;
use quill_shared::dto::SessionUser;

use crate::middleware::error::AppResult;
use crate::session::SessionContext;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/register", web::get().to(auth::register_page))
        .route("/register", web::post().to(auth::register))
        .route("/login", web::get().to(auth::login_page))
        .route("/login", web::post().to(auth::login))
        .route("/logout", web::get().to(auth::logout))
        .route("/post/{id}", web::get().to(posts::show_post))
        .route("/post/{id}", web::post().to(posts::add_comment))
        .route("/new-post", web::get().to(posts::new_post_page))
        .route("/new-post", web::post().to(posts::create_post))
        .route("/edit-post/{id}", web::get().to(posts::edit_post_page))
        .route("/edit-post/{id}", web::post().to(posts::edit_post))
        .route("/delete/{id}", web::get().to(posts::delete_post))
        .route("/about", web::get().to(pages::about))
        .route("/contact", web::get().to(pages::contact))
        .route("/health", web::get().to(health::health_check));
}

/// Redirect-after-post response.
pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Recover a domain error into a flash message and a redirect. Every
/// recoverable failure goes through here; terminal failures propagate
/// as `AppError` instead.
pub(crate) fn recover(
    session: &SessionContext,
    err: DomainError,
    message: &str,
    location: &str,
) -> AppResult<HttpResponse> {
    tracing::debug!(error = %err, "request recovered into a redirect");
    session.flash(message)?;
    Ok(see_other(location))
}

/// Project the caller onto the page payload shape.
pub(crate) fn session_user(caller: Option<&User>) -> Option<SessionUser> {
    caller.map(|user| SessionUser {
        id: user.id,
        name: user.name.clone(),
        is_admin: user.is_admin,
    })
}
