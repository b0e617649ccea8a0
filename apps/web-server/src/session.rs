//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie session stores exactly two things: the logged-in user's
//! id and the pending flash messages. The current `User` is resolved
//! from the record store at the top of each request that needs it and
//! passed explicitly into the policy guards.

use actix_session::{
    Session, SessionMiddleware, config::CookieContentSecurity, storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use quill_core::domain::User;
use quill_core::ports::UserRepository;

use crate::middleware::error::{AppError, AppResult};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const FLASH_KEY: &str = "_flash";

/// Build the cookie-session middleware.
pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Bind the given user to the session, effective immediately.
    pub fn log_in(&self, user_id: i64) -> AppResult<()> {
        self.0
            .insert(USER_ID_KEY, user_id)
            .map_err(|e| AppError::Internal(format!("failed to persist session: {e}")))
    }

    /// Clear the identity binding. Pending flash messages survive.
    pub fn log_out(&self) {
        self.0.remove(USER_ID_KEY);
    }

    /// The user id bound to this session, if any.
    pub fn user_id(&self) -> AppResult<Option<i64>> {
        self.0
            .get::<i64>(USER_ID_KEY)
            .map_err(|e| AppError::Internal(format!("failed to read session: {e}")))
    }

    /// Queue a transient message for the next rendered page.
    pub fn flash(&self, message: impl Into<String>) -> AppResult<()> {
        let mut messages = self
            .0
            .get::<Vec<String>>(FLASH_KEY)
            .map_err(|e| AppError::Internal(format!("failed to read session: {e}")))?
            .unwrap_or_default();
        messages.push(message.into());

        self.0
            .insert(FLASH_KEY, messages)
            .map_err(|e| AppError::Internal(format!("failed to persist session: {e}")))
    }

    /// Drain the pending flash messages. Unreadable flash state is
    /// dropped rather than surfaced.
    pub fn take_flash(&self) -> Vec<String> {
        match self.0.remove_as::<Vec<String>>(FLASH_KEY) {
            Some(Ok(messages)) => messages,
            Some(Err(_)) | None => Vec::new(),
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Resolve the session binding to a `User`, looked up fresh from the
/// record store. A cookie referencing a vanished account is treated as
/// anonymous and unbound.
pub async fn current_user(
    session: &SessionContext,
    users: &dyn UserRepository,
) -> AppResult<Option<User>> {
    let Some(id) = session.user_id()? else {
        return Ok(None);
    };

    match users.find_by_id(id).await? {
        Some(user) => Ok(Some(user)),
        None => {
            tracing::warn!(user_id = id, "session references a missing user");
            session.log_out();
            Ok(None)
        }
    }
}
