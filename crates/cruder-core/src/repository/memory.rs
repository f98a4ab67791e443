//! In-memory [`UserRepository`].
//!
//! Behaves like the Postgres adapter: sequential ids, random v4 public ids,
//! insertion order for `find_all`, and a username uniqueness check standing
//! in for the table constraint.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::UserRepository;
use crate::error::RepositoryError;
use crate::model::{User, UserInput};

/// Name reported for username collisions, matching the Postgres default.
const USERNAME_CONSTRAINT: &str = "users_username_key";

#[derive(Debug, Default)]
struct Table {
    rows: Vec<User>,
    next_id: i64,
}

impl Table {
    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.rows
            .iter()
            .any(|u| u.username == username && Some(u.uuid) != except)
    }
}

/// Thread-safe, cloneable in-memory user table.
///
/// Clones share the same rows. The lock is `parking_lot` and is never held
/// across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    /// Whether no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unique_violation() -> RepositoryError {
    RepositoryError::UniqueViolation {
        constraint: Some(USERNAME_CONSTRAINT.to_string()),
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.table.read().rows.clone())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let table = self.table.read();
        Ok(table.rows.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let table = self.table.read();
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_public_id(&self, public_id: Uuid) -> Result<Option<User>, RepositoryError> {
        let table = self.table.read();
        Ok(table.rows.iter().find(|u| u.uuid == public_id).cloned())
    }

    async fn insert(&self, input: &UserInput) -> Result<User, RepositoryError> {
        let mut table = self.table.write();
        if table.username_taken(&input.username, None) {
            return Err(unique_violation());
        }

        table.next_id += 1;
        let user = User {
            id: table.next_id,
            uuid: Uuid::new_v4(),
            username: input.username.clone(),
            email: input.email.clone(),
            full_name: input.full_name.clone(),
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn update_by_public_id(
        &self,
        public_id: Uuid,
        input: &UserInput,
    ) -> Result<Option<User>, RepositoryError> {
        let mut table = self.table.write();
        if table.username_taken(&input.username, Some(public_id)) {
            return Err(unique_violation());
        }

        Ok(table
            .rows
            .iter_mut()
            .find(|u| u.uuid == public_id)
            .map(|row| {
                row.username = input.username.clone();
                row.email = input.email.clone();
                row.full_name = input.full_name.clone();
                row.clone()
            }))
    }

    async fn delete_by_public_id(&self, public_id: Uuid) -> Result<bool, RepositoryError> {
        let mut table = self.table.write();
        let before = table.rows.len();
        table.rows.retain(|u| u.uuid != public_id);
        Ok(table.rows.len() < before)
    }
}
