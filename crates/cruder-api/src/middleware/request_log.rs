//! # Structured Request Logger
//!
//! Emits exactly one `tracing` event per request, after the rest of the chain
//! has produced a response. The layer sits outside the API-key gate, so
//! rejected requests are recorded too.
//!
//! Record fields:
//!
//! | Field | Source |
//! |---|---|
//! | `timestamp` | completion time, RFC 3339 with nanoseconds |
//! | `http.server.request.duration` | elapsed milliseconds |
//! | `http.log.level` | `error` for 5xx, `warning` for 4xx, `info` otherwise |
//! | `http.request.method` | request method |
//! | `http.response.status_code` | final status |
//! | `http.route` | matched route template, empty when nothing matched |
//! | `url.path` | raw request path |
//! | `http.request.host` | `Host` header, falling back to the URI authority |
//! | `user_id` | value of a `username`, `id` or `uuid` path parameter |
//! | `path_params` | any other path parameters, as a JSON object string |
//!
//! The event level follows `http.log.level`, so an `EnvFilter` can mute
//! successful requests without losing failures.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::extract::{MatchedPath, RawPathParams, Request};
use axum::http::header::HOST;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{SecondsFormat, Utc};

/// `tracing` target of every request record.
pub const LOG_TARGET: &str = "cruder::request";

/// Path parameter names that identify a user across route shapes.
const USER_ID_PARAMS: [&str; 3] = ["username", "id", "uuid"];

/// Severity derived from the response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn for_status(status: u16) -> Self {
        match status {
            500.. => Self::Error,
            400..=499 => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Router path parameters, with the user identifier pulled out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NormalizedParams {
    pub user_id: Option<String>,
    pub rest: BTreeMap<String, String>,
}

/// Fold `username`, `id` and `uuid` into one `user_id`; keep the rest by name.
pub fn normalize_params<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> NormalizedParams {
    let mut normalized = NormalizedParams::default();
    for (name, value) in params {
        if USER_ID_PARAMS.contains(&name) {
            normalized.user_id = Some(value.to_string());
        } else {
            normalized.rest.insert(name.to_string(), value.to_string());
        }
    }
    normalized
}

/// One request's log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLogEntry {
    pub timestamp: String,
    pub duration_ms: u64,
    pub severity: Severity,
    pub method: String,
    pub status: u16,
    pub route: String,
    pub path: String,
    pub host: String,
    pub params: NormalizedParams,
}

// `tracing` needs a constant level per callsite, hence one expansion per arm.
macro_rules! emit_at {
    ($level:expr, $entry:expr, $path_params:expr) => {
        tracing::event!(
            target: LOG_TARGET,
            $level,
            timestamp = %$entry.timestamp,
            http.server.request.duration = $entry.duration_ms,
            http.log.level = $entry.severity.as_str(),
            http.request.method = %$entry.method,
            http.response.status_code = $entry.status,
            http.route = %$entry.route,
            url.path = %$entry.path,
            http.request.host = %$entry.host,
            user_id = $entry.params.user_id.as_deref(),
            path_params = $path_params,
            "Incoming request"
        )
    };
}

impl RequestLogEntry {
    /// Parameters other than the user identifier, as a JSON object string.
    /// `None` when there are none.
    pub fn path_params_json(&self) -> Option<String> {
        if self.params.rest.is_empty() {
            return None;
        }
        let object: serde_json::Map<String, serde_json::Value> = self
            .params
            .rest
            .iter()
            .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
            .collect();
        Some(serde_json::Value::Object(object).to_string())
    }

    /// Write the record at the level matching its severity.
    pub fn emit(&self) {
        let path_params = self.path_params_json();
        let path_params = path_params.as_deref();

        match self.severity {
            Severity::Error => emit_at!(tracing::Level::ERROR, self, path_params),
            Severity::Warning => emit_at!(tracing::Level::WARN, self, path_params),
            Severity::Info => emit_at!(tracing::Level::INFO, self, path_params),
        }
    }
}

/// Time the inner chain and log the outcome.
///
/// Must be added with `Router::layer` so [`MatchedPath`] and the path
/// parameters are already in the request extensions.
pub async fn request_log_middleware(
    matched: Option<MatchedPath>,
    params: Option<RawPathParams>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let host = request_host(&request);
    let route = matched
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let params = params
        .map(|p| normalize_params(p.iter()))
        .unwrap_or_default();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let entry = RequestLogEntry {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        severity: Severity::for_status(status),
        method,
        status,
        route,
        path,
        host,
        params,
    };
    entry.emit();

    response
}

fn request_host(request: &Request) -> String {
    request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn request_records(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
                .filter(|record| record["target"] == LOG_TARGET)
                .collect()
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (captured, guard)
    }

    fn test_app() -> Router {
        Router::new()
            .route("/users/username/:username", get(|| async { "found" }))
            .route(
                "/orgs/:org/members/:id",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/plain", get(|| async { StatusCode::NO_CONTENT }))
            .layer(from_fn(request_log_middleware))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = axum::http::Request::builder()
            .uri(uri)
            .header("host", "api.example.test")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    #[test]
    fn severity_buckets() {
        assert_eq!(Severity::for_status(200), Severity::Info);
        assert_eq!(Severity::for_status(204), Severity::Info);
        assert_eq!(Severity::for_status(302), Severity::Info);
        assert_eq!(Severity::for_status(400), Severity::Warning);
        assert_eq!(Severity::for_status(499), Severity::Warning);
        assert_eq!(Severity::for_status(500), Severity::Error);
        assert_eq!(Severity::for_status(503), Severity::Error);
        assert_eq!(Severity::Warning.as_str(), "warning");
    }

    #[test]
    fn identifier_params_fold_into_user_id() {
        for name in ["username", "id", "uuid"] {
            let normalized = normalize_params([(name, "abc")]);
            assert_eq!(normalized.user_id.as_deref(), Some("abc"));
            assert!(normalized.rest.is_empty());
        }
    }

    #[test]
    fn other_params_are_kept_by_name() {
        let normalized = normalize_params([("org", "acme"), ("id", "7")]);
        assert_eq!(normalized.user_id.as_deref(), Some("7"));
        assert_eq!(normalized.rest.get("org").map(String::as_str), Some("acme"));
    }

    fn entry_with(params: NormalizedParams) -> RequestLogEntry {
        RequestLogEntry {
            timestamp: String::new(),
            duration_ms: 0,
            severity: Severity::Info,
            method: "GET".into(),
            status: 200,
            route: String::new(),
            path: "/".into(),
            host: String::new(),
            params,
        }
    }

    #[test]
    fn path_params_json_is_absent_when_nothing_remains() {
        let entry = entry_with(normalize_params([("username", "jdoe")]));
        assert_eq!(entry.path_params_json(), None);
    }

    #[test]
    fn path_params_json_escapes_values_and_sorts_names() {
        let entry = entry_with(normalize_params([
            ("team", "a\"b"),
            ("org", "acme"),
            ("id", "7"),
        ]));
        assert_eq!(
            entry.path_params_json().as_deref(),
            Some(r#"{"org":"acme","team":"a\"b"}"#)
        );
    }

    #[test]
    fn records_use_the_exported_target() {
        let (captured, _guard) = capture();

        entry_with(normalize_params([("org", "acme")])).emit();

        let records = captured.request_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["target"], LOG_TARGET);
        assert_eq!(records[0]["path_params"], r#"{"org":"acme"}"#);
    }

    #[tokio::test]
    async fn logs_route_template_and_user_id() {
        let (captured, _guard) = capture();

        let (status, body) = call(test_app(), "/users/username/jdoe").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"found");

        let records = captured.request_records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["level"], "INFO");
        assert_eq!(record["http.log.level"], "info");
        assert_eq!(record["http.request.method"], "GET");
        assert_eq!(record["http.response.status_code"], 200);
        assert_eq!(record["http.route"], "/users/username/:username");
        assert_eq!(record["url.path"], "/users/username/jdoe");
        assert_eq!(record["http.request.host"], "api.example.test");
        assert_eq!(record["user_id"], "jdoe");
        assert!(record["http.server.request.duration"].is_u64());
        assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(record.get("path_params").is_none());
    }

    #[tokio::test]
    async fn server_errors_log_at_error_with_extra_params() {
        let (captured, _guard) = capture();

        let (status, body) = call(test_app(), "/orgs/acme/members/42").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"boom");

        let records = captured.request_records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["level"], "ERROR");
        assert_eq!(record["http.log.level"], "error");
        assert_eq!(record["user_id"], "42");
        assert_eq!(record["path_params"], r#"{"org":"acme"}"#);
    }

    #[tokio::test]
    async fn unmatched_path_logs_empty_route_as_warning() {
        let (captured, _guard) = capture();

        let (status, _) = call(test_app(), "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let records = captured.request_records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["level"], "WARN");
        assert_eq!(record["http.log.level"], "warning");
        assert_eq!(record["http.route"], "");
        assert_eq!(record["url.path"], "/nowhere");
        assert!(record.get("user_id").is_none());
    }

    #[tokio::test]
    async fn response_passes_through_untouched() {
        let (captured, _guard) = capture();

        let (status, body) = call(test_app(), "/plain").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
        assert_eq!(captured.request_records().len(), 1);
    }
}
