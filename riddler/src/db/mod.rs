//! Persistence for Riddler
//!
//! A [`ContentStore`] trait with a MongoDB implementation for production and
//! an in-memory one for dev mode and tests.

pub mod memory;
pub mod mongo;
pub mod mongo_store;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::{MongoClient, MongoCollection};
pub use mongo_store::MongoStore;
pub use store::{AttemptOutcome, ContentStore, RiddleCounter, StreakChange};
