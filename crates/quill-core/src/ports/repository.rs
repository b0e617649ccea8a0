//! Record store ports.
//!
//! Uniqueness of emails and titles is enforced by the store itself;
//! `insert` surfaces a violated constraint as `RepoError::Constraint`
//! so concurrent duplicates are decided by the storage layer, not by a
//! check-then-insert race in the application.

use async_trait::async_trait;

use crate::domain::{Comment, NewComment, NewPost, NewUser, Post, PostUpdate, User};
use crate::error::RepoError;

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A duplicate email yields `Constraint`.
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Number of registered users. Zero means the next registration
    /// bootstraps the administrator.
    async fn count(&self) -> Result<u64, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post. A duplicate title yields `Constraint`.
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// All posts in insertion (id) order.
    async fn list_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Overwrite the four mutable fields. Author and creation date are
    /// untouched. `NotFound` if the post does not exist; a title
    /// collision yields `Constraint`.
    async fn update(&self, id: i64, update: PostUpdate) -> Result<Post, RepoError>;

    /// Delete a post; its comments cascade with it. `NotFound` if the
    /// post does not exist.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a new comment. A vanished parent post yields `NotFound`
    /// via the foreign-key constraint.
    async fn insert(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments for one post in creation (id) order.
    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}
