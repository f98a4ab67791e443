//! # Persistence Port
//!
//! One operation per access pattern against the single `users` table.
//! Implementations map each call to exactly one statement; nothing here
//! spans more than one row or more than one round-trip.
//!
//! "Zero rows" is a neutral outcome at this layer, never an error: lookups
//! return `None`, updates return `None`, deletes return `false`. The service
//! layer decides what that means.

mod memory;

pub use memory::MemoryUserRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::model::{User, UserInput};

/// Persistence contract for [`User`] records.
///
/// Object-safe so the service can hold an `Arc<dyn UserRepository>` and
/// tests can substitute [`MemoryUserRepository`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users in storage order. Empty when the table is empty.
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;

    /// The user with the given username, if any.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// The user with the given numeric identifier, if any.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError>;

    /// The user with the given public identifier, if any.
    async fn find_by_public_id(&self, public_id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Insert a new row and return it with the store-assigned `id` and `uuid`.
    ///
    /// Fails with [`RepositoryError::UniqueViolation`] when the username is
    /// already taken.
    async fn insert(&self, input: &UserInput) -> Result<User, RepositoryError>;

    /// Replace username, email and full name of the row with `public_id`.
    ///
    /// Returns `None` when no row was affected. `id` and `uuid` are kept.
    async fn update_by_public_id(
        &self,
        public_id: Uuid,
        input: &UserInput,
    ) -> Result<Option<User>, RepositoryError>;

    /// Hard-delete the row with `public_id`. Returns `false` when no row was
    /// affected.
    async fn delete_by_public_id(&self, public_id: Uuid) -> Result<bool, RepositoryError>;
}
