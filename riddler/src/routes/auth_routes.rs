//! Account routes
//!
//! - POST /signup - create an account and return a token
//! - POST /login - exchange credentials for a token

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};

use super::{error_response, json_response, parse_json_body, BoxBody};
use crate::auth::{LoginRequest, SignupRequest};
use crate::server::AppState;

pub async fn handle_signup(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let request: SignupRequest = match parse_json_body(req).await {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };

    match state.accounts.signup(request).await {
        Ok(created) => json_response(StatusCode::OK, &created),
        Err(e) => error_response(e),
    }
}

pub async fn handle_login(req: Request<Incoming>, state: &AppState) -> Response<BoxBody> {
    let request: LoginRequest = match parse_json_body(req).await {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };

    match state.accounts.login(request).await {
        Ok(session) => json_response(StatusCode::OK, &session),
        Err(e) => error_response(e),
    }
}
