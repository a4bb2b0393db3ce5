//! Riddler - riddle game backend
//!
//! "Two guesses, then the answer"
//!
//! Riddler serves AI-generated riddles that a player has never seen before,
//! deduplicated across the whole corpus by a normalized content hash.
//!
//! ## Services
//!
//! - **Delivery**: unseen riddle per player, generated on demand when the pool runs dry
//! - **Scoring**: two attempts per riddle, difficulty points, streaks and ranks
//! - **Daily**: one shared riddle per UTC date with a bonus
//! - **Rooms**: multiplayer room bookkeeping
//! - **Catalog**: categories, shares, likes and service status

pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, RiddlerError};
