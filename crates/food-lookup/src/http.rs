//! HTTP surface: `/search`, `/suggest` and `/healthz`.
//!
//! Every response carries permissive CORS headers and `OPTIONS` preflights
//! are answered before any other processing. When an access token is
//! configured, `/search` and `/suggest` require `Authorization: Bearer <token>`.

use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{Query, Request, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use food_lookup_core::{Classification, Engine, SuggestError};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

/// Body returned when `/search` has no usable `key`.
pub const MISSING_KEY_MESSAGE: &str = "key parameter is missing";

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Shared state for every handler.
#[derive(Debug)]
pub struct AppState {
    engine: Engine,
    access_token: Option<String>,
}

impl AppState {
    /// Wrap a loaded engine. An empty token leaves the routes open.
    pub fn new(engine: Engine, access_token: Option<&str>) -> Self {
        Self {
            engine,
            access_token: access_token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.access_token.as_deref() else {
            return true;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().strip_prefix("Bearer "))
            .is_some_and(|presented| constant_time_eq(presented.trim(), expected))
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let gated = Router::new()
        .route("/search", get(search))
        .route("/suggest", post(suggest))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_token,
        ));

    Router::new()
        .merge(gated)
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: Arc<AppState>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local_addr = listener.local_addr()?;
    info!(
        %local_addr,
        entries = state.engine.catalog().len(),
        gated = state.access_token.is_some(),
        "HTTP server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            warn!(error = %err, "failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}

async fn require_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.is_authorized(request.headers()) {
        return next.run(request).await;
    }
    debug!(path = %request.uri().path(), "rejected request without valid token");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        "missing or invalid Authorization header",
    )
        .into_response()
}

/// Query string of `/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Text to look up.
    pub key: Option<String>,
}

async fn search(State(state): State<Arc<AppState>>, Query(params): Query<SearchParams>) -> Response {
    let Some(key) = params.key.filter(|k| !k.is_empty()) else {
        return (StatusCode::BAD_REQUEST, MISSING_KEY_MESSAGE).into_response();
    };
    Json(state.engine.lookup(&key)).into_response()
}

/// Body of `/suggest`.
#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    /// Proposed food name.
    #[serde(rename = "inputText")]
    pub input_text: String,
    /// Whether the submitter believes the food is allowed.
    #[serde(default)]
    pub allowed: bool,
}

async fn suggest(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: SuggestRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "malformed suggestion body");
            return (StatusCode::BAD_REQUEST, format!("invalid JSON body: {err}")).into_response();
        }
    };

    let classification = Classification::from_allowed(request.allowed);
    let sink = Arc::clone(state.engine.sink());
    let result =
        tokio::task::spawn_blocking(move || sink.submit(&request.input_text, classification)).await;

    match result {
        Ok(Ok(outcome)) => {
            debug!(?outcome, %classification, "suggestion accepted");
            StatusCode::OK.into_response()
        }
        Ok(Err(err)) => suggest_error_response(&err),
        Err(err) => {
            error!(error = %err, "suggestion task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn suggest_error_response(err: &SuggestError) -> Response {
    if err.is_client_error() {
        debug!(error = %err, "suggestion rejected");
        (StatusCode::BAD_REQUEST, err.to_string()).into_response()
    } else {
        error!(error = %err, "failed to record suggestion");
        (StatusCode::INTERNAL_SERVER_ERROR, "failed to record suggestion").into_response()
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "entries": state.engine.catalog().len(),
        "suggestions": state.engine.suggestion_counts(),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use food_lookup_core::Config;
    use std::fs;
    use tempfile::TempDir;

    fn data_dir() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("allowed")).unwrap();
        fs::create_dir_all(root.join("not_allowed")).unwrap();
        fs::write(root.join("allowed/fruit.dat"), "Apple\nFruit\n").unwrap();
        fs::write(root.join("not_allowed/sweets.dat"), "Apple Pie\n").unwrap();
        (tmp, root)
    }

    fn state(root: &Utf8PathBuf, token: Option<&str>) -> Arc<AppState> {
        let engine = Engine::open(root, &Config::default());
        Arc::new(AppState::new(engine, token))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn spawn(state: Arc<AppState>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn search_returns_both_lists() {
        let (_tmp, root) = data_dir();
        let params = SearchParams {
            key: Some("apple".to_string()),
        };

        let response = search(State(state(&root, None)), Query(params)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["possible_allowed"], serde_json::json!(["Apple"]));
        assert_eq!(json["possible_disallowed"], serde_json::json!(["Apple Pie"]));
    }

    #[tokio::test]
    async fn search_without_key_is_bad_request() {
        let (_tmp, root) = data_dir();
        let shared = state(&root, None);

        for key in [None, Some(String::new())] {
            let response = search(State(Arc::clone(&shared)), Query(SearchParams { key })).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_text(response).await, MISSING_KEY_MESSAGE);
        }
    }

    #[tokio::test]
    async fn suggest_records_then_accepts_duplicate() {
        let (_tmp, root) = data_dir();
        let shared = state(&root, None);
        let body = Bytes::from_static(br#"{"inputText": "Mango", "allowed": true}"#);

        let first = suggest(State(Arc::clone(&shared)), body.clone()).await;
        let second = suggest(State(Arc::clone(&shared)), body).await;

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);
        assert!(body_text(first).await.is_empty());
        let log = fs::read_to_string(root.join("suggested_allowed.txt")).unwrap();
        assert_eq!(log, "mango\n");
    }

    #[tokio::test]
    async fn suggest_rejects_bad_input() {
        let (_tmp, root) = data_dir();
        let shared = state(&root, None);

        let malformed = suggest(State(Arc::clone(&shared)), Bytes::from_static(b"{not json")).await;
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let short = suggest(
            State(Arc::clone(&shared)),
            Bytes::from_static(br#"{"inputText": "ab", "allowed": false}"#),
        )
        .await;
        assert_eq!(short.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(short).await.contains("too short"));
    }

    #[tokio::test]
    async fn suggest_reports_persist_failure_as_server_error() {
        let tmp = TempDir::new().unwrap();
        let file = Utf8PathBuf::try_from(tmp.path().join("not-a-dir")).unwrap();
        fs::write(&file, "").unwrap();
        let shared = state(&file, None);

        let response = suggest(
            State(shared),
            Bytes::from_static(br#"{"inputText": "mango", "allowed": true}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn healthz_reports_counts() {
        let (_tmp, root) = data_dir();

        let response = healthz(State(state(&root, None))).await;

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["entries"], 3);
        assert_eq!(json["suggestions"]["allowed"], 0);
    }

    #[test]
    fn bearer_token_is_checked() {
        let (_tmp, root) = data_dir();
        let engine = Engine::open(&root, &Config::default());
        let state = AppState::new(engine, Some("s3cret"));

        let mut headers = HeaderMap::new();
        assert!(!state.is_authorized(&headers));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer wrong"));
        assert!(!state.is_authorized(&headers));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"));
        assert!(state.is_authorized(&headers));
    }

    #[tokio::test]
    async fn responses_carry_cors_headers_and_preflight_skips_gate() {
        let (_tmp, root) = data_dir();
        let base = spawn(state(&root, Some("s3cret"))).await;
        let client = reqwest::Client::new();

        let preflight = client
            .request(reqwest::Method::OPTIONS, format!("{base}/search"))
            .send()
            .await
            .unwrap();
        assert_eq!(preflight.status(), reqwest::StatusCode::OK);
        assert_eq!(
            preflight.headers()["access-control-allow-methods"],
            ALLOW_METHODS
        );

        let denied = client
            .get(format!("{base}/search?key=apple"))
            .send()
            .await
            .unwrap();
        assert_eq!(denied.status(), reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(denied.headers()["access-control-allow-origin"], "*");

        let allowed = client
            .get(format!("{base}/search?key=apple"))
            .bearer_auth("s3cret")
            .send()
            .await
            .unwrap();
        assert_eq!(allowed.status(), reqwest::StatusCode::OK);
        assert_eq!(
            allowed.headers()["access-control-allow-headers"],
            ALLOW_HEADERS
        );

        let health = client.get(format!("{base}/healthz")).send().await.unwrap();
        assert_eq!(health.status(), reqwest::StatusCode::OK);
    }
}
