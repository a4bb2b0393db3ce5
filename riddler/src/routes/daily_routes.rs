//! Daily challenge routes
//!
//! - GET  /daily-challenge - today's challenge, created on first request
//! - POST /daily-challenge/answer - one credited answer per user per date

use chrono::Utc;
use hyper::body::Incoming;
use hyper::{Request, Response};
use serde::Deserialize;

use super::{current_user, error_response, parse_json_body, respond, BoxBody};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyAnswer {
    pub answer: String,
}

pub async fn handle_get_daily(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let user = match current_user(&req, state).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    respond(state.engine.daily.view_at(&user, Utc::now()).await)
}

pub async fn handle_daily_answer(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let user = match current_user(&req, state).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };
    let body: DailyAnswer = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };

    respond(state.engine.daily.submit_at(&user, &body.answer, Utc::now()).await)
}
