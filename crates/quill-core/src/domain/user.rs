use serde::{Deserialize, Serialize};

/// User entity - a registered account.
///
/// The administrator is marked with an explicit flag set once at
/// bootstrap, never inferred from id allocation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Insertion draft for a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}
