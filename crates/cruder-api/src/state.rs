//! # Application State
//!
//! Shared across all Axum handlers via `State<AppState>`. Holds the business
//! service behind a trait object, so the Postgres-backed service and the
//! in-memory one are interchangeable.

use std::sync::Arc;

use cruder_core::{MemoryUserRepository, UserManager, UserRepository, UserService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Business layer for the user resource.
    pub users: Arc<dyn UserService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }

    /// Wire the default [`UserManager`] over `repo`.
    pub fn with_repository(repo: Arc<dyn UserRepository>) -> Self {
        Self::new(Arc::new(UserManager::new(repo)))
    }

    /// State over a fresh [`MemoryUserRepository`]. No database required.
    pub fn in_memory() -> Self {
        Self::with_repository(Arc::new(MemoryUserRepository::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_state_starts_empty() {
        let state = AppState::in_memory();
        assert!(state.users.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_one_store() {
        let state = AppState::in_memory();
        let copy = state.clone();
        copy.users
            .create(cruder_core::UserInput::new("jdoe", "jdoe@example.com"))
            .await
            .unwrap();
        assert_eq!(state.users.get_all().await.unwrap().len(), 1);
    }
}
