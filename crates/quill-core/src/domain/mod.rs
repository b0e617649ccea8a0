//! Domain entities - the core business objects.

mod comment;

mod post;

mod user;

pub mod validate;

pub use comment::{Comment, NewComment};
pub use post::{NewPost, Post, PostUpdate};
pub use user::{NewUser, User};
