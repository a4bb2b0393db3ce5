//! Signup, login and request authentication

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::jwt::{extract_token_from_header, JwtValidator};
use crate::auth::password::{hash_password, verify_password};
use crate::db::schemas::UserDoc;
use crate::db::ContentStore;
use crate::types::{Result, RiddlerError};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub message: String,
}

#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn ContentStore>,
    jwt: JwtValidator,
}

impl Accounts {
    pub fn new(store: Arc<dyn ContentStore>, jwt: JwtValidator) -> Self {
        Self { store, jwt }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse> {
        let username = request.username.trim();
        let email = request.email.trim().to_lowercase();

        if username.is_empty() {
            return Err(RiddlerError::BadRequest("username is required".into()));
        }
        if !email.contains('@') {
            return Err(RiddlerError::BadRequest("A valid email is required".into()));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(RiddlerError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let language = request
            .language
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "en".to_string());

        let user = UserDoc::new(
            username.to_string(),
            email.clone(),
            hash_password(&request.password)?,
            language,
        );
        let user_id = user.id.clone();

        if !self.store.insert_user(user).await? {
            warn!(email = %email, "Signup rejected: email already exists");
            return Err(RiddlerError::DuplicateAccount);
        }

        info!(user_id = %user_id, username, "Account created");
        Ok(AuthResponse {
            token: self.jwt.generate_token(&user_id)?,
            user_id,
            username: username.to_string(),
            message: "Account created successfully!".into(),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .store
            .user_by_email(&email)
            .await?
            .ok_or(RiddlerError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            warn!(email = %email, "Login failed: wrong password");
            return Err(RiddlerError::InvalidCredentials);
        }

        info!(user_id = %user.id, "Login successful");
        Ok(AuthResponse {
            token: self.jwt.generate_token(&user.id)?,
            user_id: user.id,
            username: user.username,
            message: "Login successful!".into(),
        })
    }

    /// Resolve the bearer token in an Authorization header to its user
    pub async fn authenticate(&self, header: Option<&str>) -> Result<UserDoc> {
        let token = extract_token_from_header(header)
            .ok_or_else(|| RiddlerError::Unauthorized("Authorization header missing".into()))?;
        let claims = self.jwt.verify_token(token)?;

        self.store
            .user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| RiddlerError::Unauthorized("User not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn accounts() -> Accounts {
        let jwt = JwtValidator::new("test-secret-that-is-long-enough-for-hs256".into(), 60).unwrap();
        Accounts::new(Arc::new(MemoryStore::new()), jwt)
    }

    fn signup(email: &str) -> SignupRequest {
        SignupRequest {
            username: "ada".into(),
            email: email.into(),
            password: "analytical".into(),
            language: None,
        }
    }

    #[tokio::test]
    async fn test_signup_login_authenticate() {
        let accounts = accounts();
        let created = accounts.signup(signup("Ada@Example.com")).await.unwrap();

        let login = accounts
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "analytical".into(),
            })
            .await
            .unwrap();
        assert_eq!(login.user_id, created.user_id);

        let header = format!("Bearer {}", login.token);
        let user = accounts.authenticate(Some(&header)).await.unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(user.language, "en");
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let accounts = accounts();
        accounts.signup(signup("ada@example.com")).await.unwrap();
        let err = accounts.signup(signup("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, RiddlerError::DuplicateAccount));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let accounts = accounts();
        accounts.signup(signup("ada@example.com")).await.unwrap();

        let err = accounts
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "wrong-pass".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RiddlerError::InvalidCredentials));

        let err = accounts.authenticate(None).await.unwrap_err();
        assert!(matches!(err, RiddlerError::Unauthorized(_)));
    }
}
