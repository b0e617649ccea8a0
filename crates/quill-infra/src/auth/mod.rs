//! Credential store implementation.

mod password;

pub use password::Argon2PasswordService;
