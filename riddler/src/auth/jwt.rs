//! JWT token handling
//!
//! Tokens are HS256-signed and carry the user id as `sub`.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::RiddlerError;

/// Minimum accepted secret length
const MIN_SECRET_LEN: usize = 32;

/// Payload stored in JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// JWT validator and generator
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
}

impl JwtValidator {
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self, RiddlerError> {
        if secret.is_empty() {
            return Err(RiddlerError::Config("JWT_SECRET is required".into()));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(RiddlerError::Config(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    /// Issue a token for a user
    pub fn generate_token(&self, user_id: &str) -> Result<String, RiddlerError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| RiddlerError::Auth(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.expiry_seconds,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| RiddlerError::Auth(format!("Failed to generate token: {}", e)))
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims, RiddlerError> {
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(data) if data.claims.sub.is_empty() => {
                Err(RiddlerError::Unauthorized("Invalid token payload".into()))
            }
            Ok(data) => Ok(data.claims),
            Err(err) => {
                use jsonwebtoken::errors::ErrorKind;
                let message = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidSignature => "Invalid signature",
                    _ => "Invalid or expired token",
                };
                Err(RiddlerError::Unauthorized(message.into()))
            }
        }
    }
}

/// Extract token from Authorization header
///
/// Supports "Bearer <token>" format
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    #[test]
    fn test_round_trip() {
        let validator = JwtValidator::new(SECRET.into(), 3600).unwrap();
        let token = validator.generate_token("user-1").unwrap();

        let claims = validator.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtValidator::new(SECRET.into(), 3600).unwrap();
        let other = JwtValidator::new(format!("{}-other", SECRET), 3600).unwrap();
        let token = issuer.generate_token("user-1").unwrap();

        assert!(matches!(
            other.verify_token(&token),
            Err(RiddlerError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(JwtValidator::new("short".into(), 60).is_err());
        assert!(JwtValidator::new(String::new(), 60).is_err());
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_token_from_header(Some("Bearer abc")), Some("abc"));
        assert_eq!(extract_token_from_header(Some("Basic abc")), None);
        assert_eq!(extract_token_from_header(Some("Bearer  ")), None);
        assert_eq!(extract_token_from_header(None), None);
    }
}
