//! Riddle routes
//!
//! - GET  /riddle?language&category - deliver an unseen riddle
//! - POST /check - judge a guess
//! - POST /share, POST /like - bump riddle counters
//! - GET  /riddle/shared/{id} - public view of a shared riddle
//! - GET  /categories - categories with their riddle counts

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{current_user, error_response, json_response, parse_json_body, parse_query, respond, BoxBody};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RiddleQuery {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub riddle_id: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct RiddleRef {
    pub riddle_id: String,
}

pub async fn handle_get_riddle(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let query: RiddleQuery = match parse_query(&req) {
        Ok(q) => q,
        Err(e) => return error_response(e),
    };
    let user = match current_user(&req, state).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    let language = query
        .language
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| user.language.clone());
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    respond(state.engine.delivery.deliver(&user, &language, category).await)
}

pub async fn handle_check(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let user = match current_user(&req, state).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };
    let check: CheckRequest = match parse_json_body(req).await {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };

    respond(
        state
            .engine
            .delivery
            .submit(&user.id, &check.riddle_id, &check.answer)
            .await,
    )
}

pub async fn handle_share(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    if let Err(e) = current_user(&req, state).await {
        return error_response(e);
    }
    let target: RiddleRef = match parse_json_body(req).await {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };

    respond(state.engine.catalog.share(&target.riddle_id).await)
}

pub async fn handle_like(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    if let Err(e) = current_user(&req, state).await {
        return error_response(e);
    }
    let target: RiddleRef = match parse_json_body(req).await {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };

    respond(state.engine.catalog.like(&target.riddle_id).await)
}

pub async fn handle_shared(riddle_id: &str, state: &AppState) -> Response<BoxBody> {
    respond(state.engine.catalog.shared(riddle_id).await)
}

pub async fn handle_categories(state: &AppState) -> Response<BoxBody> {
    match state.engine.catalog.categories().await {
        Ok(categories) => json_response(StatusCode::OK, &json!({ "categories": categories })),
        Err(e) => error_response(e),
    }
}
