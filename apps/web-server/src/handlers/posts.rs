//! Post and comment handlers.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::Local;

use quill_core::domain::{NewComment, NewPost, Post, PostUpdate, validate};
use quill_core::error::{DomainError, RepoError};
use quill_core::policy;
use quill_core::ports::UserRepository;
use quill_shared::dto::{
    CommentForm, CommentView, EditPostPage, FormPage, PostDetail, PostForm, PostListPage, PostPage,
    PostSummary,
};

use crate::middleware::error::AppResult;
use crate::session::{SessionContext, current_user};
use crate::state::AppState;

use super::{recover, see_other};

/// Creation dates render as e.g. "August 30, 2026".
const DATE_FORMAT: &str = "%B %d, %Y";

async fn author_name(users: &dyn UserRepository, id: i64) -> AppResult<String> {
    Ok(users
        .find_by_id(id)
        .await?
        .map(|user| user.name)
        .unwrap_or_else(|| "unknown".to_string()))
}

fn post_detail(post: Post, author: String) -> PostDetail {
    PostDetail {
        id: post.id,
        title: post.title,
        subtitle: post.subtitle,
        date: post.date,
        body: post.body,
        img_url: post.img_url,
        author,
    }
}

fn validate_post_form(form: &PostForm) -> AppResult<()> {
    validate::non_empty("title", &form.title)?;
    validate::max_len("title", &form.title, validate::TEXT_FIELD_MAX)?;
    validate::non_empty("subtitle", &form.subtitle)?;
    validate::max_len("subtitle", &form.subtitle, validate::TEXT_FIELD_MAX)?;
    validate::non_empty("body", &form.body)?;
    validate::http_url("image URL", &form.img_url)?;
    Ok(())
}

/// GET / - every post, id order, world-readable.
pub async fn index(state: web::Data<AppState>, session: SessionContext) -> AppResult<HttpResponse> {
    let caller = current_user(&session, state.users.as_ref()).await?;
    let posts = state.posts.list_all().await?;

    let mut names: HashMap<i64, String> = HashMap::new();
    let mut summaries = Vec::with_capacity(posts.len());
    for post in posts {
        if !names.contains_key(&post.author_id) {
            let name = author_name(state.users.as_ref(), post.author_id).await?;
            names.insert(post.author_id, name);
        }
        summaries.push(PostSummary {
            id: post.id,
            title: post.title,
            subtitle: post.subtitle,
            date: post.date,
            img_url: post.img_url,
            author: names[&post.author_id].clone(),
        });
    }

    Ok(HttpResponse::Ok().json(PostListPage {
        posts: summaries,
        flash: session.take_flash(),
        current_user: super::session_user(caller.as_ref()),
    }))
}

/// GET /post/{id} - the post and its comments in creation order.
pub async fn show_post(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let caller = current_user(&session, state.users.as_ref()).await?;

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "post",
            id: post_id,
        })?;

    let author = author_name(state.users.as_ref(), post.author_id).await?;

    let mut comments = Vec::new();
    for comment in state.comments.find_by_post_id(post_id).await? {
        comments.push(CommentView {
            id: comment.id,
            body: comment.body,
            author: author_name(state.users.as_ref(), comment.author_id).await?,
        });
    }

    Ok(HttpResponse::Ok().json(PostPage {
        post: post_detail(post, author),
        comments,
        flash: session.take_flash(),
        current_user: super::session_user(caller.as_ref()),
    }))
}

/// POST /post/{id} - submit a comment; redirect back to the post so a
/// reload cannot resubmit the form.
pub async fn add_comment(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let caller = current_user(&session, state.users.as_ref()).await?;

    let author = match policy::require_session(caller.as_ref()) {
        Ok(author) => author,
        Err(err) => return recover(&session, err, "You must log in to comment.", "/login"),
    };

    let form = form.into_inner();
    validate::non_empty("comment", &form.body)?;

    let draft = NewComment {
        post_id,
        author_id: author.id,
        body: form.body,
    };

    match state.comments.insert(draft).await {
        Ok(_) => Ok(see_other(&format!("/post/{post_id}"))),
        // The foreign key caught a vanished post.
        Err(RepoError::NotFound) => Err(DomainError::NotFound {
            entity: "post",
            id: post_id,
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}

/// GET /new-post - admin only.
pub async fn new_post_page(
    state: web::Data<AppState>,
    session: SessionContext,
) -> AppResult<HttpResponse> {
    let caller = current_user(&session, state.users.as_ref()).await?;
    policy::require_admin(caller.as_ref())?;

    Ok(HttpResponse::Ok().json(FormPage {
        flash: session.take_flash(),
        current_user: super::session_user(caller.as_ref()),
    }))
}

/// POST /new-post - admin only; the creation date is fixed here and
/// never changes afterwards.
pub async fn create_post(
    state: web::Data<AppState>,
    session: SessionContext,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let caller = current_user(&session, state.users.as_ref()).await?;
    let admin = policy::require_admin(caller.as_ref())?;

    let form = form.into_inner();
    validate_post_form(&form)?;

    let draft = NewPost {
        author_id: admin.id,
        title: form.title,
        subtitle: form.subtitle,
        date: Local::now().format(DATE_FORMAT).to_string(),
        body: form.body,
        img_url: form.img_url,
    };

    match state.posts.insert(draft).await {
        Ok(post) => {
            tracing::info!(post_id = post.id, "post created");
            Ok(see_other("/"))
        }
        Err(RepoError::Constraint(_)) => recover(
            &session,
            DomainError::DuplicateTitle,
            "A post with this title already exists.",
            "/new-post",
        ),
        Err(e) => Err(e.into()),
    }
}

/// GET /edit-post/{id} - admin only; the form prefilled with the post.
pub async fn edit_post_page(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let caller = current_user(&session, state.users.as_ref()).await?;
    policy::require_admin(caller.as_ref())?;

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "post",
            id: post_id,
        })?;
    let author = author_name(state.users.as_ref(), post.author_id).await?;

    Ok(HttpResponse::Ok().json(EditPostPage {
        post: post_detail(post, author),
        flash: session.take_flash(),
        current_user: super::session_user(caller.as_ref()),
    }))
}

/// POST /edit-post/{id} - admin only; author and creation date are
/// immutable across edits.
pub async fn edit_post(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let caller = current_user(&session, state.users.as_ref()).await?;
    policy::require_admin(caller.as_ref())?;

    let form = form.into_inner();
    validate_post_form(&form)?;

    let update = PostUpdate {
        title: form.title,
        subtitle: form.subtitle,
        body: form.body,
        img_url: form.img_url,
    };

    match state.posts.update(post_id, update).await {
        Ok(post) => Ok(see_other(&format!("/post/{}", post.id))),
        Err(RepoError::NotFound) => Err(DomainError::NotFound {
            entity: "post",
            id: post_id,
        }
        .into()),
        Err(RepoError::Constraint(_)) => recover(
            &session,
            DomainError::DuplicateTitle,
            "A post with this title already exists.",
            &format!("/edit-post/{post_id}"),
        ),
        Err(e) => Err(e.into()),
    }
}

/// GET /delete/{id} - admin only; comments cascade with the post.
pub async fn delete_post(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let caller = current_user(&session, state.users.as_ref()).await?;
    policy::require_admin(caller.as_ref())?;

    match state.posts.delete(post_id).await {
        Ok(()) => {
            tracing::info!(post_id, "post deleted");
            Ok(see_other("/"))
        }
        Err(RepoError::NotFound) => Err(DomainError::NotFound {
            entity: "post",
            id: post_id,
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}
