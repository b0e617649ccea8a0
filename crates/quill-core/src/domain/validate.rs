//! Syntactic input checks shared by the request handlers.
//!
//! Every mutation validates its input here before touching the store.
//! Uniqueness is not checked here; that guarantee comes from the
//! store's constraints.

use crate::error::DomainError;

/// Titles and subtitles are capped at the column width.
pub const TEXT_FIELD_MAX: usize = 250;

pub fn non_empty(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn max_len(field: &'static str, value: &str, limit: usize) -> Result<(), DomainError> {
    if value.chars().count() > limit {
        return Err(DomainError::Validation(format!(
            "{field} must be at most {limit} characters"
        )));
    }
    Ok(())
}

/// Syntactic email check: one `@` with a non-empty local part and a
/// dotted domain. Deliverability is not our problem.
pub fn email(value: &str) -> Result<(), DomainError> {
    non_empty("email", value)?;

    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(DomainError::Validation(
            "please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

pub fn http_url(field: &'static str, value: &str) -> Result<(), DomainError> {
    non_empty(field, value)?;

    match url::Url::parse(value) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        _ => Err(DomainError::Validation(format!(
            "{field} must be a valid http(s) URL"
        ))),
    }
}
