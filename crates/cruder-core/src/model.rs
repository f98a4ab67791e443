//! # Entity Model
//!
//! The `User` record as stored and returned, and the subset of fields a
//! caller may write.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted user.
///
/// `id` and `uuid` are assigned by the store on insert and never change
/// afterwards. `uuid` is the public reference used by update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned numeric identifier.
    pub id: i64,
    /// Store-generated public identifier.
    pub uuid: Uuid,
    /// Unique login name.
    pub username: String,
    /// Contact address. Not unique.
    pub email: String,
    /// Optional display name.
    pub full_name: Option<String>,
}

/// The mutable fields of a [`User`], used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    /// Requested username.
    pub username: String,
    /// Requested email address.
    pub email: String,
    /// Requested display name.
    #[serde(default)]
    pub full_name: Option<String>,
}

impl UserInput {
    /// Build an input with no display name.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            full_name: None,
        }
    }

    /// Set the display name.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_with_wire_field_names() {
        let user = User {
            id: 7,
            uuid: Uuid::nil(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            full_name: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["uuid"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["username"], "jdoe");
        assert_eq!(json["email"], "jdoe@example.com");
        assert!(json["full_name"].is_null());
    }

    #[test]
    fn input_without_full_name_deserializes() {
        let input: UserInput =
            serde_json::from_str(r#"{"username":"a","email":"a@example.com"}"#).unwrap();
        assert_eq!(input, UserInput::new("a", "a@example.com"));
    }

    #[test]
    fn with_full_name_sets_field() {
        let input = UserInput::new("a", "a@example.com").with_full_name("Alice");
        assert_eq!(input.full_name.as_deref(), Some("Alice"));
    }
}
