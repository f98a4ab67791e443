//! # Middleware Stack
//!
//! Cross-cutting layers wrapped around the router:
//! - [`request_log`]: one structured JSON record per request.
//!
//! The API-key gate lives in [`crate::auth`].

pub mod request_log;
