//! Configuration for Riddler
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Fallback JWT secret used only in dev mode.
const DEV_JWT_SECRET: &str = "dev-mode-secret-not-for-production-use-123456";

/// Riddler - riddle game backend
#[derive(Parser, Debug, Clone)]
#[command(name = "riddler")]
#[command(about = "Riddle game backend with AI-generated, deduplicated riddles")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory store fallback, dev JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "riddleapp")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds (30 days)
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "2592000")]
    pub jwt_expiry_seconds: u64,

    /// Base URL of the OpenAI-compatible generation API
    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.groq.com/openai/v1")]
    pub llm_base_url: String,

    /// Model used for riddle generation
    #[arg(long, env = "LLM_MODEL", default_value = "llama-3.1-8b-instant")]
    pub llm_model: String,

    /// API key for the generation API (required in production)
    #[arg(long, env = "LLM_API_KEY")]
    pub llm_api_key: Option<String>,

    /// LibreTranslate-compatible translation endpoint
    #[arg(long, env = "TRANSLATE_URL", default_value = "https://libretranslate.com")]
    pub translate_url: String,

    /// API key for the translation endpoint
    #[arg(long, env = "TRANSLATE_API_KEY")]
    pub translate_api_key: Option<String>,

    /// Base URL used to build share links
    #[arg(long, env = "SHARE_BASE_URL", default_value = "https://riddleapp.com/riddle")]
    pub share_base_url: String,

    /// Require exact answers (disables the short-sentence substring tolerance)
    #[arg(long, env = "STRICT_ANSWERS", default_value = "false")]
    pub strict_answers: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Timeout for outbound provider requests in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,
}

impl Args {
    /// Get effective JWT secret (uses a fixed secret in dev mode when unset)
    pub fn jwt_secret(&self) -> Option<String> {
        match &self.jwt_secret {
            Some(secret) => Some(secret.clone()),
            None if self.dev_mode => Some(DEV_JWT_SECRET.to_string()),
            None => None,
        }
    }

    /// Outbound request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            if self.jwt_secret.is_none() {
                return Err("JWT_SECRET is required in production mode".to_string());
            }
            if self.llm_api_key.is_none() {
                return Err("LLM_API_KEY is required in production mode".to_string());
            }
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["riddler"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_production_requires_secrets() {
        let args = parse(&[]);
        assert!(args.validate().is_err());

        let args = parse(&["--jwt-secret", "s", "--llm-api-key", "k"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_dev_mode_secret_fallback() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.jwt_secret().as_deref(), Some(DEV_JWT_SECRET));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let args = parse(&["--dev-mode", "--request-timeout-ms", "0"]);
        assert!(args.validate().is_err());
        assert_eq!(parse(&["--dev-mode"]).request_timeout(), Duration::from_secs(30));
    }
}
