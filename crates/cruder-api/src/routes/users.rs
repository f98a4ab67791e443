//! # Users API
//!
//! CRUD over the single user collection.
//!
//! ## Endpoints
//!
//! - `GET /api/v1/users`: list users
//! - `POST /api/v1/users`: create user
//! - `GET /api/v1/users/username/:username`: get by username
//! - `GET /api/v1/users/id/:id`: get by numeric id
//! - `PATCH /api/v1/users/:uuid`: replace mutable fields
//! - `DELETE /api/v1/users/:uuid`: delete
//!
//! The collection routes also answer with a trailing slash.
//!
//! Bodies are decoded as JSON whatever their `Content-Type`, then validated
//! before the service is called; a bad body never reaches the business layer. A `:uuid` segment that does not parse as
//! a UUID cannot name a user and is answered with 404.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use cruder_core::{ServiceError, User, UserInput};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::extractors::{extract_path, extract_validated_json};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Body of create and update requests.
///
/// Length limits match the column sizes of the `users` table.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserRequest {
    /// Unique login name.
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub username: String,
    /// Contact address.
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub email: String,
    /// Optional display name.
    #[serde(default)]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub full_name: Option<String>,
}

impl From<UserRequest> for UserInput {
    fn from(req: UserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            full_name: req.full_name,
        }
    }
}

/// A user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub uuid: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            uuid: user.uuid,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users", get(list_users).post(create_user))
        .route("/api/v1/users/", get(list_users).post(create_user))
        .route("/api/v1/users/username/:username", get(get_user_by_username))
        .route("/api/v1/users/id/:id", get(get_user_by_id))
        .route(
            "/api/v1/users/:uuid",
            axum::routing::patch(update_user).delete(delete_user),
        )
}

/// A public id that is not a UUID names no user.
fn parse_public_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound.into())
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/v1/users: List all users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users, possibly empty", body = Vec<UserResponse>),
        (status = 401, description = "API key missing", body = crate::error::ErrorBody),
        (status = 403, description = "API key invalid", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.get_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/users/username/:username: Get a user by username.
#[utoipa::path(
    get,
    path = "/api/v1/users/username/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get_by_username(&username).await?;
    Ok(Json(user.into()))
}

/// GET /api/v1/users/id/:id: Get a user by numeric id.
#[utoipa::path(
    get,
    path = "/api/v1/users/id/{id}",
    params(("id" = i64, Path, description = "Numeric user id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Id is not an integer", body = crate::error::ErrorBody),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn get_user_by_id(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let id = extract_path(id)?;
    let user = state.users.get_by_id(id).await?;
    Ok(Json(user.into()))
}

/// POST /api/v1/users: Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid body", body = crate::error::ErrorBody),
        (status = 409, description = "Username already exists", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn create_user(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let req: UserRequest = extract_validated_json(body)?;
    let user = state.users.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PATCH /api/v1/users/:uuid: Replace username, email and full name.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{uuid}",
    params(("uuid" = Uuid, Path, description = "Public user id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid body", body = crate::error::ErrorBody),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
        (status = 409, description = "Username already exists", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn update_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let req: UserRequest = extract_validated_json(body)?;
    let public_id = parse_public_id(&raw_id)?;
    let user = state.users.update(public_id, req.into()).await?;
    Ok(Json(user.into()))
}

/// DELETE /api/v1/users/:uuid: Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{uuid}",
    params(("uuid" = Uuid, Path, description = "Public user id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn delete_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let public_id = parse_public_id(&raw_id)?;
    state.users.delete(public_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
