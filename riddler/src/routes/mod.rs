//! HTTP route handlers
//!
//! Handlers are thin: parse the request, authenticate if needed, call one
//! engine operation, and serialize its result or its [`RiddlerError`].

pub mod auth_routes;
pub mod daily_routes;
pub mod health;
pub mod player_routes;
pub mod riddle_routes;
pub mod room_routes;

pub use health::{health_check, status_check};

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS};
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use crate::db::schemas::UserDoc;
use crate::server::AppState;
use crate::types::{Result, RiddlerError};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest accepted JSON request body
const MAX_BODY_BYTES: usize = 10 * 1024;

// =============================================================================
// Response Helpers
// =============================================================================

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

fn with_cors(mut response: Response<BoxBody>) -> Response<BoxBody> {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::new(full_body(json));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(response)
}

pub fn error_response(err: RiddlerError) -> Response<BoxBody> {
    let (status, body) = err.into_status_code_and_body();
    if status.is_server_error() {
        error!(status = status.as_u16(), "{}", body.error);
    } else {
        warn!(status = status.as_u16(), "{}", body.error);
    }
    json_response(status, &body)
}

/// 200 with the serialized value, or the error's status and body
pub fn respond<T: Serialize>(result: Result<T>) -> Response<BoxBody> {
    match result {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(err) => error_response(err),
    }
}

pub fn cors_preflight() -> Response<BoxBody> {
    let mut response = Response::new(empty_body());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    with_cors(response)
}

pub fn not_found_response(path: &str) -> Response<BoxBody> {
    error_response(RiddlerError::NotFound(format!("Route {}", path)))
}

pub fn method_not_allowed() -> Response<BoxBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({ "error": "Method not allowed", "code": "METHOD_NOT_ALLOWED" }),
    )
}

// =============================================================================
// Request Helpers
// =============================================================================

pub async fn parse_json_body<T: DeserializeOwned>(req: Request<Incoming>) -> Result<T> {
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| RiddlerError::BadRequest(format!("Failed to read body: {}", e)))?;

    serde_json::from_slice(&body.to_bytes())
        .map_err(|e| RiddlerError::BadRequest(format!("Invalid JSON: {}", e)))
}

/// Deserialize the query string; a missing query reads as empty
pub fn parse_query<T: DeserializeOwned>(req: &Request<Incoming>) -> Result<T> {
    serde_urlencoded::from_str(req.uri().query().unwrap_or(""))
        .map_err(|e| RiddlerError::BadRequest(format!("Invalid query: {}", e)))
}

pub fn get_auth_header(req: &Request<Incoming>) -> Option<&str> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Resolve the caller from the bearer token
pub async fn current_user(req: &Request<Incoming>, state: &AppState) -> Result<UserDoc> {
    state.accounts.authenticate(get_auth_header(req)).await
}
