//! Static page handlers.

use actix_web::{HttpResponse, web};

use quill_shared::dto::StaticPage;

use crate::middleware::error::AppResult;
use crate::session::{SessionContext, current_user};
use crate::state::AppState;

async fn static_page(
    state: web::Data<AppState>,
    session: SessionContext,
    page: &str,
) -> AppResult<HttpResponse> {
    let caller = current_user(&session, state.users.as_ref()).await?;

    Ok(HttpResponse::Ok().json(StaticPage {
        page: page.to_string(),
        flash: session.take_flash(),
        current_user: super::session_user(caller.as_ref()),
    }))
}

/// GET /about
pub async fn about(state: web::Data<AppState>, session: SessionContext) -> AppResult<HttpResponse> {
    static_page(state, session, "about").await
}

/// GET /contact
pub async fn contact(
    state: web::Data<AppState>,
    session: SessionContext,
) -> AppResult<HttpResponse> {
    static_page(state, session, "contact").await
}
