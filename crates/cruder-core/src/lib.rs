#![deny(missing_docs)]

//! # cruder-core: Domain Layer for the User Service
//!
//! Framework-free types and contracts shared by every outer layer. Nothing in
//! this crate knows about HTTP or SQL; the api crate plugs a Postgres adapter
//! into [`UserRepository`] and drives [`UserService`] from its handlers.
//!
//! ## Layers
//!
//! ```text
//! UserService (business rules) → UserRepository (persistence port) → store
//! ```
//!
//! - [`model`]: the [`User`] entity and its [`UserInput`] write model.
//! - [`repository`]: the persistence contract plus [`MemoryUserRepository`].
//! - [`service`]: username uniqueness and not-found translation.
//! - [`error`]: [`RepositoryError`] and [`ServiceError`].

pub mod error;
pub mod model;
pub mod repository;
pub mod service;

pub use error::{RepositoryError, ServiceError};
pub use model::{User, UserInput};
pub use repository::{MemoryUserRepository, UserRepository};
pub use service::{UserManager, UserService};
