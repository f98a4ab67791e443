//! # API-Key Middleware
//!
//! Gates the user routes behind one shared static secret sent in the
//! `X-API-Key` header.
//!
//! | Header | Outcome |
//! |---|---|
//! | absent | 401 `{"error": "API key required"}` |
//! | present, not equal | 403 `{"error": "Invalid API key"}` |
//! | present, equal | request passes through unchanged |
//!
//! Rejections short-circuit: nothing downstream runs. The comparison is a
//! plain string equality; there is no hashing and no per-key scoping.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// API-key configuration injected into request extensions.
///
/// Custom `Debug` redacts the key to prevent credential leakage in logs.
#[derive(Clone)]
pub struct ApiKeyConfig {
    pub key: String,
}

impl ApiKeyConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl std::fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Decide whether a provided header value is acceptable.
///
/// An empty header value counts as absent. Values are compared as raw bytes,
/// so a non-UTF-8 header is simply a wrong key.
pub fn check_api_key(provided: Option<&[u8]>, expected: &str) -> Result<(), AppError> {
    match provided {
        None => Err(AppError::Unauthorized("API key required".into())),
        Some(value) if value.is_empty() => Err(AppError::Unauthorized("API key required".into())),
        Some(value) if value == expected.as_bytes() => Ok(()),
        Some(_) => Err(AppError::Forbidden("Invalid API key".into())),
    }
}

/// Validate the `X-API-Key` header against [`ApiKeyConfig`].
///
/// A missing `ApiKeyConfig` extension is a wiring bug; the request is refused
/// with 500 rather than let through unauthenticated.
pub async fn api_key_middleware(request: Request, next: Next) -> Response {
    let Some(config) = request.extensions().get::<ApiKeyConfig>().cloned() else {
        return AppError::Internal("ApiKeyConfig extension missing".into()).into_response();
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|v| v.as_bytes());

    match check_api_key(provided, &config.key) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(key: &str, hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/test",
                get(move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        "ok"
                    }
                }),
            )
            .layer(from_fn(api_key_middleware))
            .layer(axum::Extension(ApiKeyConfig::new(key)))
    }

    async fn error_message(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn matching_key_passes_through() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app("my-secret", hits.clone());

        let request = Request::builder()
            .uri("/test")
            .header("X-API-Key", "my-secret")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_header_is_401_and_short_circuits() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app("my-secret", hits.clone());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(response).await, "API key required");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wrong_key_is_403_and_short_circuits() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app("my-secret", hits.clone());

        let request = Request::builder()
            .uri("/test")
            .header("X-API-Key", "wrong")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_message(response).await, "Invalid API key");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_config_fails_closed() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(from_fn(api_key_middleware));

        let request = Request::builder()
            .uri("/test")
            .header("X-API-Key", "anything")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn comparison_is_exact() {
        assert!(check_api_key(Some("key".as_bytes()), "key").is_ok());
        assert!(matches!(
            check_api_key(Some("key ".as_bytes()), "key"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_api_key(Some("KEY".as_bytes()), "key"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_api_key(Some("".as_bytes()), "key"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(check_api_key(None, "key"), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", ApiKeyConfig::new("top-secret"));
        assert!(!rendered.contains("top-secret"));
    }
}
