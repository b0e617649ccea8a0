//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! the SeaORM record store and the Argon2 credential store.

pub mod auth;
pub mod database;

pub use auth::Argon2PasswordService;
pub use database::{DatabaseConfig, connect};
pub use sea_orm::{DbConn, DbErr};
