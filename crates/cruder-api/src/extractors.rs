//! # Custom Extractors & Validation
//!
//! Helpers that turn axum rejections and `validator` failures into
//! [`AppError::BadRequest`], so the business layer only ever sees input that
//! already passed decode-time checks.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::Path;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// Decode a JSON body, mapping read and parse errors to [`AppError::BadRequest`].
///
/// Handlers take the body as `Result<Bytes, BytesRejection>`, so the
/// `Content-Type` header is not consulted. Clients that omit it are served
/// the same as those that send `application/json`.
pub fn extract_json<T: DeserializeOwned>(
    body: Result<Bytes, BytesRejection>,
) -> Result<T, AppError> {
    let bytes = body.map_err(|err| AppError::BadRequest(err.body_text()))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| AppError::BadRequest(format!("invalid JSON body: {err}")))
}

/// Decode a JSON body and run its `#[validate(...)]` rules.
pub fn extract_validated_json<T: DeserializeOwned + Validate>(
    body: Result<Bytes, BytesRejection>,
) -> Result<T, AppError> {
    let value: T = extract_json(body)?;
    value
        .validate()
        .map_err(|errs| AppError::BadRequest(describe(&errs)))?;
    Ok(value)
}

/// Extract a typed path parameter, mapping parse failures to
/// [`AppError::BadRequest`].
pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Flatten field errors into one line, e.g. `email: must be a valid email address`.
///
/// Fields are sorted so the message is stable across runs.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{field}: {}", reasons.join(", "))
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
