//! Riddler binary entry point

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use riddler::auth::{Accounts, JwtValidator};
use riddler::db::{ContentStore, MemoryStore, MongoClient, MongoStore};
use riddler::engine::{EngineOptions, GameEngine};
use riddler::{server, AppState, Args};
use riddler_agent::{LibreTranslator, LlmBackend, MockBackend, OpenAiBackend, Translator};

/// Reply served by the dev-mode backend when no generation key is configured
const DEV_RIDDLE: &str = r#"{"question": "What has keys but can't open locks?", "answer": "piano", "hint": "It makes music", "difficulty": "easy"}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("riddler={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Riddler - riddle game backend");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} / {}", args.mongodb_uri, args.mongodb_db);
    info!("Generation: {} @ {}", args.llm_model, args.llm_base_url);
    info!("Translation: {}", args.translate_url);
    info!("======================================");

    let store: Arc<dyn ContentStore> = match connect_store(&args).await {
        Ok(store) => {
            info!("MongoDB connected successfully");
            Arc::new(store)
        }
        Err(e) => {
            if args.dev_mode {
                warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                Arc::new(MemoryStore::new())
            } else {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    match store.backfill_content_hashes().await {
        Ok(0) => {}
        Ok(n) => info!("Backfilled content hashes on {} riddles", n),
        Err(e) => warn!("Content hash backfill failed: {}", e),
    }

    let backend: Arc<dyn LlmBackend> = match &args.llm_api_key {
        Some(key) => Arc::new(OpenAiBackend::new(
            args.llm_base_url.clone(),
            args.llm_model.clone(),
            Some(key.clone()),
            args.request_timeout(),
        )?),
        None => {
            warn!("LLM_API_KEY not set (dev mode), generating from a fixed mock reply");
            Arc::new(MockBackend::new("dev-mock").with_response(DEV_RIDDLE))
        }
    };

    let translator: Arc<dyn Translator> = Arc::new(LibreTranslator::new(
        args.translate_url.clone(),
        args.translate_api_key.clone(),
        args.request_timeout(),
    )?);

    let secret = args
        .jwt_secret()
        .ok_or_else(|| anyhow::anyhow!("JWT_SECRET is required"))?;
    let jwt = JwtValidator::new(secret, args.jwt_expiry_seconds)?;

    let engine = GameEngine::new(
        store.clone(),
        backend,
        translator,
        EngineOptions {
            strict_answers: args.strict_answers,
            share_base_url: args.share_base_url.clone(),
        },
    );
    let accounts = Accounts::new(store.clone(), jwt);
    let state = Arc::new(AppState::new(args, store, engine, accounts));

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn connect_store(args: &Args) -> riddler::Result<MongoStore> {
    let client = MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await?;
    MongoStore::new(&client).await
}
