//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo; one task per connection, manual
//! `(Method, path)` routing.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::Accounts;
use crate::config::Args;
use crate::db::ContentStore;
use crate::engine::GameEngine;
use crate::routes::{
    self, auth_routes, daily_routes, player_routes, riddle_routes, room_routes, BoxBody,
};
use crate::types::RiddlerError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub store: Arc<dyn ContentStore>,
    pub engine: GameEngine,
    pub accounts: Accounts,
}

impl AppState {
    pub fn new(args: Args, store: Arc<dyn ContentStore>, engine: GameEngine, accounts: Accounts) -> Self {
        Self {
            args,
            store,
            engine,
            accounts,
        }
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), RiddlerError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Riddler listening on {}", state.args.listen);
    if state.args.dev_mode {
        warn!("Development mode enabled");
    }
    if state.args.strict_answers {
        info!("Strict answer matching enabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route a request to its handler
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        (Method::OPTIONS, _) => routes::cors_preflight(),

        // Service
        (Method::GET, "/health") => routes::health_check(&state),
        (Method::GET, "/") | (Method::GET, "/status") => routes::status_check(&state).await,

        // Accounts
        (Method::POST, "/signup") => auth_routes::handle_signup(req, &state).await,
        (Method::POST, "/login") => auth_routes::handle_login(req, &state).await,

        // Riddles
        (Method::GET, "/riddle") => riddle_routes::handle_get_riddle(req, &state).await,
        (Method::POST, "/check") => riddle_routes::handle_check(req, &state).await,
        (Method::POST, "/share") => riddle_routes::handle_share(req, &state).await,
        (Method::POST, "/like") => riddle_routes::handle_like(req, &state).await,
        (Method::GET, "/categories") => riddle_routes::handle_categories(&state).await,
        (Method::GET, p) if p.starts_with("/riddle/shared/") => {
            match path_param(p, "/riddle/shared/") {
                Some(id) => riddle_routes::handle_shared(id, &state).await,
                None => routes::not_found_response(p),
            }
        }

        // Daily challenge
        (Method::GET, "/daily-challenge") => daily_routes::handle_get_daily(req, &state).await,
        (Method::POST, "/daily-challenge/answer") => {
            daily_routes::handle_daily_answer(req, &state).await
        }

        // Players
        (Method::GET, "/achievements") => player_routes::handle_achievements(req, &state).await,
        (Method::GET, "/leaderboard") => player_routes::handle_leaderboard(req, &state).await,
        (Method::GET, "/profile") => player_routes::handle_profile(req, &state).await,
        (Method::POST, "/reset-history") => {
            player_routes::handle_reset_history(req, &state).await
        }

        // Multiplayer
        (Method::POST, "/multiplayer/create") => room_routes::handle_create(req, &state).await,
        (Method::POST, "/multiplayer/join") => room_routes::handle_join(req, &state).await,
        (Method::GET, "/multiplayer/rooms") => room_routes::handle_list_rooms(&state).await,
        (Method::GET, p) if p.starts_with("/multiplayer/room/") => {
            match path_param(p, "/multiplayer/room/") {
                Some(id) => room_routes::handle_get_room(req, id, &state).await,
                None => routes::not_found_response(p),
            }
        }

        (_, p) if is_known_path(p) => routes::method_not_allowed(),
        (_, p) => routes::not_found_response(p),
    };

    Ok(response)
}

/// Single trailing path segment after `prefix`
fn path_param<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn is_known_path(path: &str) -> bool {
    matches!(
        path,
        "/" | "/health"
            | "/status"
            | "/signup"
            | "/login"
            | "/riddle"
            | "/check"
            | "/share"
            | "/like"
            | "/categories"
            | "/daily-challenge"
            | "/daily-challenge/answer"
            | "/achievements"
            | "/leaderboard"
            | "/profile"
            | "/reset-history"
            | "/multiplayer/create"
            | "/multiplayer/join"
            | "/multiplayer/rooms"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_param() {
        assert_eq!(path_param("/riddle/shared/abc", "/riddle/shared/"), Some("abc"));
        assert_eq!(path_param("/riddle/shared/", "/riddle/shared/"), None);
        assert_eq!(path_param("/riddle/shared/a/b", "/riddle/shared/"), None);
    }

    #[test]
    fn test_known_paths() {
        assert!(is_known_path("/check"));
        assert!(!is_known_path("/nope"));
    }
}
