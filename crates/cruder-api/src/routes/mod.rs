//! # API Route Modules
//!
//! - `users`: CRUD over the single user collection, mounted at
//!   `/api/v1/users`.

pub mod users;
