//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{CommentRepository, PasswordService, PostRepository, UserRepository};
use quill_infra::database::{SqlCommentRepository, SqlPostRepository, SqlUserRepository};
use quill_infra::{Argon2PasswordService, DatabaseConfig, DbConn, DbErr, connect};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Connect to the record store and build the application state.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let db = connect(config).await?;
        Ok(Self::with_connection(db))
    }

    /// Build state on top of an existing connection.
    pub fn with_connection(db: DbConn) -> Self {
        Self {
            users: Arc::new(SqlUserRepository::new(db.clone())),
            posts: Arc::new(SqlPostRepository::new(db.clone())),
            comments: Arc::new(SqlCommentRepository::new(db)),
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }
}
