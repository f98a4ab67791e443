//! User persistence operations.
//!
//! One parameterized statement per [`UserRepository`] method, all against the
//! `users` table. Writes use `RETURNING` so the store-assigned `id` and `uuid`
//! come back in the same round-trip.

use async_trait::async_trait;
use cruder_core::{RepositoryError, User, UserInput, UserRepository};
use sqlx::PgPool;
use uuid::Uuid;

/// [`UserRepository`] backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, uuid, username, email, full_name FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRow::into_record).collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, uuid, username, email, full_name FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRow::into_record))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, uuid, username, email, full_name FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRow::into_record))
    }

    async fn find_by_public_id(&self, public_id: Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, uuid, username, email, full_name FROM users WHERE uuid = $1",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRow::into_record))
    }

    async fn insert(&self, input: &UserInput) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, email, full_name)
             VALUES ($1, $2, $3)
             RETURNING id, uuid, username, email, full_name",
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into_record())
    }

    async fn update_by_public_id(
        &self,
        public_id: Uuid,
        input: &UserInput,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET username = $1, email = $2, full_name = $3
             WHERE uuid = $4
             RETURNING id, uuid, username, email, full_name",
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRow::into_record))
    }

    async fn delete_by_public_id(&self, public_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE uuid = $1")
            .bind(public_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Classify a driver error. Unique violations keep their constraint name;
/// everything else becomes an opaque storage failure.
fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::UniqueViolation {
            constraint: db.constraint().map(str::to_string),
        },
        _ => RepositoryError::Storage(err.to_string()),
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    uuid: Uuid,
    username: String,
    email: String,
    full_name: Option<String>,
}

impl UserRow {
    fn into_record(self) -> User {
        User {
            id: self.id,
            uuid: self.uuid,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
        }
    }
}
