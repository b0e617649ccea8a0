//! Record store: SeaORM entities, connection management, repositories.

mod base;
mod connections;
pub mod entity;
pub mod repos;

pub use connections::{DatabaseConfig, connect};
pub use repos::{SqlCommentRepository, SqlPostRepository, SqlUserRepository};
