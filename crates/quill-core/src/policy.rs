//! Authorization policy.
//!
//! There is exactly one privileged role: the administrator flagged at
//! bootstrap. Handlers call these guards explicitly at the top of the
//! body; there is no decorator middleware and no ambient current user.

use crate::domain::User;
use crate::error::DomainError;

/// Require a logged-in caller. Anonymous callers get
/// `AuthenticationRequired`.
pub fn require_session(caller: Option<&User>) -> Result<&User, DomainError> {
    caller.ok_or(DomainError::AuthenticationRequired)
}

/// Require the administrator. Anonymous and non-admin callers both get
/// `Forbidden`, before any mutation happens.
pub fn require_admin(caller: Option<&User>) -> Result<&User, DomainError> {
    match caller {
        Some(user) if user.is_admin => Ok(user),
        _ => Err(DomainError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, is_admin: bool) -> User {
        User {
            id,
            name: "Test".to_string(),
            email: format!("user{id}@example.com"),
            password_hash: "$argon2id$test".to_string(),
            is_admin,
        }
    }

    #[test]
    fn anonymous_caller_has_no_session() {
        assert!(matches!(
            require_session(None),
            Err(DomainError::AuthenticationRequired)
        ));
    }

    #[test]
    fn any_logged_in_caller_passes_session_gate() {
        let bob = user(2, false);
        assert_eq!(require_session(Some(&bob)).unwrap().id, 2);
    }

    #[test]
    fn anonymous_caller_is_forbidden() {
        assert!(matches!(require_admin(None), Err(DomainError::Forbidden)));
    }

    #[test]
    fn non_admin_caller_is_forbidden() {
        let bob = user(2, false);
        assert!(matches!(
            require_admin(Some(&bob)),
            Err(DomainError::Forbidden)
        ));
    }

    #[test]
    fn admin_caller_passes() {
        let alice = user(1, true);
        assert!(require_admin(Some(&alice)).unwrap().is_admin);
    }

    #[test]
    fn admin_flag_beats_id_order() {
        // Being user #1 means nothing without the flag.
        let first = user(1, false);
        let later = user(42, true);
        assert!(require_admin(Some(&first)).is_err());
        assert!(require_admin(Some(&later)).is_ok());
    }
}
