//! Player routes
//!
//! - GET  /achievements
//! - GET  /leaderboard?limit
//! - GET  /profile
//! - POST /reset-history

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{current_user, error_response, json_response, parse_query, respond, BoxBody};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn handle_achievements(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    match current_user(&req, state).await {
        Ok(user) => json_response(StatusCode::OK, &state.engine.players.achievements(&user)),
        Err(e) => error_response(e),
    }
}

pub async fn handle_leaderboard(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let query: LeaderboardQuery = match parse_query(&req) {
        Ok(q) => q,
        Err(e) => return error_response(e),
    };

    match state.engine.players.leaderboard(query.limit).await {
        Ok(leaderboard) => json_response(StatusCode::OK, &json!({ "leaderboard": leaderboard })),
        Err(e) => error_response(e),
    }
}

pub async fn handle_profile(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let user = match current_user(&req, state).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    respond(state.engine.players.profile(&user).await)
}

pub async fn handle_reset_history(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let user = match current_user(&req, state).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    match state.engine.players.reset_history(&user).await {
        Ok(()) => json_response(StatusCode::OK, &json!({ "message": "History reset!" })),
        Err(e) => error_response(e),
    }
}
