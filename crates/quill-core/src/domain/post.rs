use serde::{Deserialize, Serialize};

/// Post entity - a published blog post.
///
/// `date` is a preformatted calendar string ("Month DD, YYYY") fixed at
/// creation time; edits never touch it or the author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
}

/// Insertion draft for a post; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
}

/// The four fields an edit may overwrite.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}
