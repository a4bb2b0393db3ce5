//! Liveness and status

use hyper::{Response, StatusCode};
use serde::Serialize;

use super::{json_response, respond, BoxBody};
use crate::server::AppState;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    dev_mode: bool,
}

/// Liveness only; never touches the store
pub fn health_check(state: &AppState) -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        &Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            dev_mode: state.args.dev_mode,
        },
    )
}

/// Corpus and player counts with the game rules
pub async fn status_check(state: &AppState) -> Response<BoxBody> {
    respond(state.engine.catalog.status().await)
}
