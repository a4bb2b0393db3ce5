//! Multiplayer room routes
//!
//! - POST /multiplayer/create
//! - POST /multiplayer/join
//! - GET  /multiplayer/room/{id}
//! - GET  /multiplayer/rooms

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{current_user, error_response, json_response, parse_json_body, respond, BoxBody};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub room_name: String,
    #[serde(default)]
    pub max_players: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub room_id: String,
}

pub async fn handle_create(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let user = match current_user(&req, state).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };
    let body: CreateRoomRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };

    respond(
        state
            .engine
            .rooms
            .create(&user, &body.room_name, body.max_players)
            .await,
    )
}

pub async fn handle_join(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let user = match current_user(&req, state).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };
    let body: JoinRoomRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };

    respond(state.engine.rooms.join(&user, &body.room_id).await)
}

pub async fn handle_get_room(
    req: Request<Incoming>,
    room_id: &str,
    state: &AppState,
) -> Response<BoxBody> {
    if let Err(e) = current_user(&req, state).await {
        return error_response(e);
    }

    respond(state.engine.rooms.get(room_id).await)
}

pub async fn handle_list_rooms(state: &AppState) -> Response<BoxBody> {
    match state.engine.rooms.lobby().await {
        Ok(rooms) => json_response(StatusCode::OK, &json!({ "rooms": rooms })),
        Err(e) => error_response(e),
    }
}
