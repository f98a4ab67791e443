//! # Business Layer
//!
//! Wraps the repository with exactly two rules:
//!
//! 1. **Not-found translation.** Every zero-row outcome becomes
//!    [`ServiceError::NotFound`], whichever key was used.
//! 2. **Username uniqueness.** Create and update look the username up before
//!    writing. The lookup races concurrent writers, so a
//!    [`RepositoryError::UniqueViolation`] coming back from the write is
//!    folded into the same [`ServiceError::UsernameTaken`].
//!
//! The layer is stateless; all state lives in the repository. Email is never
//! checked for uniqueness.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{RepositoryError, ServiceError};
use crate::model::{User, UserInput};
use crate::repository::UserRepository;

/// Business contract consumed by the HTTP layer.
#[async_trait]
pub trait UserService: Send + Sync {
    /// All users. Never fails with `NotFound`.
    async fn get_all(&self) -> Result<Vec<User>, ServiceError>;

    /// Look a user up by username.
    async fn get_by_username(&self, username: &str) -> Result<User, ServiceError>;

    /// Look a user up by numeric identifier.
    async fn get_by_id(&self, id: i64) -> Result<User, ServiceError>;

    /// Look a user up by public identifier.
    async fn get_by_public_id(&self, public_id: Uuid) -> Result<User, ServiceError>;

    /// Create a user after checking the username is free.
    async fn create(&self, input: UserInput) -> Result<User, ServiceError>;

    /// Replace the mutable fields of the user with `public_id`.
    async fn update(&self, public_id: Uuid, input: UserInput) -> Result<User, ServiceError>;

    /// Remove the user with `public_id`.
    async fn delete(&self, public_id: Uuid) -> Result<(), ServiceError>;
}

/// Default [`UserService`] over any [`UserRepository`].
#[derive(Clone)]
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl std::fmt::Debug for UserManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserManager").finish_non_exhaustive()
    }
}

impl UserManager {
    /// Build a service over the given repository.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

/// Map a failed write: a constraint rejection is a username collision, the
/// rest passes through.
fn classify_write_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::UniqueViolation { .. } => ServiceError::UsernameTaken,
        other => ServiceError::Repository(other),
    }
}

fn found(row: Option<User>) -> Result<User, ServiceError> {
    row.ok_or(ServiceError::NotFound)
}

#[async_trait]
impl UserService for UserManager {
    async fn get_all(&self) -> Result<Vec<User>, ServiceError> {
        self.repo.find_all().await.map_err(ServiceError::Repository)
    }

    async fn get_by_username(&self, username: &str) -> Result<User, ServiceError> {
        let row = self
            .repo
            .find_by_username(username)
            .await
            .map_err(ServiceError::Repository)?;
        found(row)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, ServiceError> {
        let row = self
            .repo
            .find_by_id(id)
            .await
            .map_err(ServiceError::Repository)?;
        found(row)
    }

    async fn get_by_public_id(&self, public_id: Uuid) -> Result<User, ServiceError> {
        let row = self
            .repo
            .find_by_public_id(public_id)
            .await
            .map_err(ServiceError::Repository)?;
        found(row)
    }

    async fn create(&self, input: UserInput) -> Result<User, ServiceError> {
        let existing = self
            .repo
            .find_by_username(&input.username)
            .await
            .map_err(ServiceError::Repository)?;
        if existing.is_some() {
            return Err(ServiceError::UsernameTaken);
        }

        self.repo.insert(&input).await.map_err(classify_write_error)
    }

    async fn update(&self, public_id: Uuid, input: UserInput) -> Result<User, ServiceError> {
        let current = self.get_by_public_id(public_id).await?;

        if input.username != current.username {
            let holder = self
                .repo
                .find_by_username(&input.username)
                .await
                .map_err(ServiceError::Repository)?;
            if holder.is_some_and(|other| other.uuid != public_id) {
                return Err(ServiceError::UsernameTaken);
            }
        }

        let row = self
            .repo
            .update_by_public_id(public_id, &input)
            .await
            .map_err(classify_write_error)?;
        found(row)
    }

    async fn delete(&self, public_id: Uuid) -> Result<(), ServiceError> {
        let removed = self
            .repo
            .delete_by_public_id(public_id)
            .await
            .map_err(ServiceError::Repository)?;
        if removed {
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}
