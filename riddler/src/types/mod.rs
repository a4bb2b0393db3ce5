//! Shared types for Riddler

pub mod error;

pub use error::{ErrorBody, Result, RiddlerError};
