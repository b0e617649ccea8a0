//! Registration, login and logout handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::{NewUser, validate};
use quill_core::error::{DomainError, RepoError};
use quill_core::policy;
use quill_shared::dto::{FormPage, LoginForm, RegisterForm};

use crate::middleware::error::AppResult;
use crate::session::{SessionContext, current_user};
use crate::state::AppState;

use super::{recover, see_other};

/// Both backends name the violated column or index in the message.
fn admin_slot_taken(constraint: &str) -> bool {
    constraint.to_lowercase().contains("admin_slot")
}

/// GET /register
pub async fn register_page(
    state: web::Data<AppState>,
    session: SessionContext,
) -> AppResult<HttpResponse> {
    let caller = current_user(&session, state.users.as_ref()).await?;

    Ok(HttpResponse::Ok().json(FormPage {
        flash: session.take_flash(),
        current_user: super::session_user(caller.as_ref()),
    }))
}

/// POST /register
///
/// Creates the account and logs it in. The first registration claims
/// the administrator slot; the slot's unique index decides the winner
/// when registrations race, and the loser retries as a regular user.
/// Duplicate emails are likewise decided by the store, not a lookup.
pub async fn register(
    state: web::Data<AppState>,
    session: SessionContext,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    validate::non_empty("name", &form.name)?;
    validate::email(&form.email)?;
    validate::non_empty("password", &form.password)?;

    let password_hash = state.passwords.hash(&form.password)?;

    let draft = NewUser {
        name: form.name,
        email: form.email,
        password_hash,
        is_admin: state.users.count().await? == 0,
    };

    let inserted = match state.users.insert(draft.clone()).await {
        Err(RepoError::Constraint(c)) if draft.is_admin && admin_slot_taken(&c) => {
            tracing::info!("lost the administrator bootstrap race, registering as regular user");
            state
                .users
                .insert(NewUser {
                    is_admin: false,
                    ..draft
                })
                .await
        }
        other => other,
    };

    match inserted {
        Ok(user) => {
            tracing::info!(user_id = user.id, is_admin = user.is_admin, "user registered");
            session.log_in(user.id)?;
            Ok(see_other("/"))
        }
        Err(RepoError::Constraint(_)) => recover(
            &session,
            DomainError::DuplicateEmail,
            "This email is already registered. Try logging in instead.",
            "/login",
        ),
        Err(e) => Err(e.into()),
    }
}

/// GET /login
pub async fn login_page(
    state: web::Data<AppState>,
    session: SessionContext,
) -> AppResult<HttpResponse> {
    let caller = current_user(&session, state.users.as_ref()).await?;

    Ok(HttpResponse::Ok().json(FormPage {
        flash: session.take_flash(),
        current_user: super::session_user(caller.as_ref()),
    }))
}

/// POST /login
///
/// Unknown email and wrong password are deliberately indistinguishable
/// to the caller.
pub async fn login(
    state: web::Data<AppState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    let user = state.users.find_by_email(&form.email).await?;

    let verified = match &user {
        Some(user) => state
            .passwords
            .verify(&form.password, &user.password_hash)?,
        None => false,
    };

    match user {
        Some(user) if verified => {
            session.log_in(user.id)?;
            Ok(see_other("/"))
        }
        _ => recover(
            &session,
            DomainError::InvalidCredentials,
            "Your email or password is incorrect. Please try again.",
            "/login",
        ),
    }
}

/// GET /logout
pub async fn logout(state: web::Data<AppState>, session: SessionContext) -> AppResult<HttpResponse> {
    let caller = current_user(&session, state.users.as_ref()).await?;

    if let Err(err) = policy::require_session(caller.as_ref()) {
        return recover(&session, err, "You must log in first.", "/login");
    }

    session.log_out();
    Ok(see_other("/"))
}
