//! Authentication for Riddler
//!
//! Provides:
//! - JWT token generation and validation
//! - Password hashing with Argon2
//! - Account signup/login and bearer-token request authentication

pub mod accounts;
pub mod jwt;
pub mod password;

pub use accounts::{Accounts, AuthResponse, LoginRequest, SignupRequest};
pub use jwt::{extract_token_from_header, Claims, JwtValidator};
pub use password::{hash_password, verify_password};
