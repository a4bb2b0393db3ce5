//! Game engine
//!
//! Everything between the HTTP handlers and the store:
//!
//! ```text
//!            ┌──────────── GameEngine ────────────┐
//!            │                                    │
//!   Delivery ──► FreshnessEngine ──► Generator ──► LlmBackend
//!      │              │
//!      │              └──► Translator
//!      ▼
//!   ContentStore ◄── DailyChallenges, Players, Rooms, Catalog
//! ```

pub mod catalog;
pub mod daily;
pub mod delivery;
pub mod freshness;
pub mod generator;
pub mod players;
pub mod prompts;
pub mod rooms;
pub mod scoring;
pub mod text;

use std::sync::Arc;

use riddler_agent::{LlmBackend, Translator};

use crate::db::ContentStore;

pub use catalog::Catalog;
pub use daily::DailyChallenges;
pub use delivery::{Delivery, RiddleView, Verdict};
pub use freshness::{FreshnessEngine, ServedFrom};
pub use generator::{GenerationState, Generator};
pub use players::Players;
pub use rooms::Rooms;

/// Engine settings taken from configuration
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub strict_answers: bool,
    pub share_base_url: String,
}

/// All game services wired over one store and one set of providers
#[derive(Clone)]
pub struct GameEngine {
    pub delivery: Delivery,
    pub daily: DailyChallenges,
    pub players: Players,
    pub rooms: Rooms,
    pub catalog: Catalog,
}

impl GameEngine {
    pub fn new(
        store: Arc<dyn ContentStore>,
        backend: Arc<dyn LlmBackend>,
        translator: Arc<dyn Translator>,
        options: EngineOptions,
    ) -> Self {
        let generator = Generator::new(store.clone(), backend);
        let freshness = FreshnessEngine::new(store.clone(), generator.clone(), translator);

        Self {
            delivery: Delivery::new(store.clone(), freshness, options.strict_answers),
            daily: DailyChallenges::new(store.clone(), generator),
            players: Players::new(store.clone()),
            rooms: Rooms::new(store.clone()),
            catalog: Catalog::new(store, options.share_base_url),
        }
    }
}
