use serde::{Deserialize, Serialize};

/// Comment entity - authored by a user, attached to one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub body: String,
}

/// Insertion draft for a comment; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub body: String,
}
