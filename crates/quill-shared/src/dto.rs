//! Data Transfer Objects - form submissions and page payloads.
//!
//! Handlers never render HTML themselves; each GET produces one of the
//! page payloads below and hands it to the rendering collaborator.

use serde::{Deserialize, Serialize};

/// Registration form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Create/edit post form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}

/// Comment form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentForm {
    pub body: String,
}

/// The logged-in caller as pages see them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub is_admin: bool,
}

/// One post on the index page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub img_url: String,
    pub author: String,
}

/// A fully rendered post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
    pub author: String,
}

/// One comment under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i64,
    pub body: String,
    pub author: String,
}

/// GET / payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListPage {
    pub posts: Vec<PostSummary>,
    pub flash: Vec<String>,
    pub current_user: Option<SessionUser>,
}

/// GET /post/{id} payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    pub post: PostDetail,
    pub comments: Vec<CommentView>,
    pub flash: Vec<String>,
    pub current_user: Option<SessionUser>,
}

/// GET payload for the register/login/new-post forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormPage {
    pub flash: Vec<String>,
    pub current_user: Option<SessionUser>,
}

/// GET /edit-post/{id} payload: the form prefilled with the post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPostPage {
    pub post: PostDetail,
    pub flash: Vec<String>,
    pub current_user: Option<SessionUser>,
}

/// GET /about and /contact payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPage {
    pub page: String,
    pub flash: Vec<String>,
    pub current_user: Option<SessionUser>,
}
