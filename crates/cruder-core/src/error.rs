//! # Error Hierarchy
//!
//! Two levels, built with `thiserror`:
//!
//! - [`RepositoryError`]: what a persistence adapter can report besides
//!   "no rows". Zero-row outcomes are *not* errors at that layer; they come
//!   back as `None` / `false`.
//! - [`ServiceError`]: the classified domain outcome consumed by the HTTP
//!   layer. Every repository failure is either reclassified (not found,
//!   username taken) or carried through opaquely.

use thiserror::Error;

/// Failure reported by a [`crate::UserRepository`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The store rejected a write because of a uniqueness constraint.
    #[error("unique constraint violated{}", constraint_suffix(.constraint))]
    UniqueViolation {
        /// Name of the violated constraint, when the store reports it.
        constraint: Option<String>,
    },

    /// Any other store or driver failure.
    #[error("storage error: {0}")]
    Storage(String),
}

fn constraint_suffix(constraint: &Option<String>) -> String {
    match constraint {
        Some(name) => format!(": {name}"),
        None => String::new(),
    }
}

/// Domain-level outcome of a [`crate::UserService`] call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No user matched the lookup key.
    #[error("users not found")]
    NotFound,

    /// Another user already owns the requested username.
    #[error("username already exists")]
    UsernameTaken,

    /// Unclassified persistence failure, passed through unchanged.
    #[error(transparent)]
    Repository(RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_messages_are_fixed() {
        assert_eq!(ServiceError::NotFound.to_string(), "users not found");
        assert_eq!(
            ServiceError::UsernameTaken.to_string(),
            "username already exists"
        );
    }

    #[test]
    fn repository_error_is_transparent() {
        let err = ServiceError::Repository(RepositoryError::Storage("connection reset".into()));
        assert_eq!(err.to_string(), "storage error: connection reset");
    }

    #[test]
    fn unique_violation_display_includes_constraint() {
        let named = RepositoryError::UniqueViolation {
            constraint: Some("users_username_key".into()),
        };
        assert_eq!(
            named.to_string(),
            "unique constraint violated: users_username_key"
        );
        let anonymous = RepositoryError::UniqueViolation { constraint: None };
        assert_eq!(anonymous.to_string(), "unique constraint violated");
    }
}
