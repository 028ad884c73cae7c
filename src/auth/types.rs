use std::fmt;

use serde::{Deserialize, Serialize};

pub const AUTH_COOKIE_NAME: &str = "tavern_auth";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: usize,
}

#[derive(Debug)]
pub enum AuthError {
    TokenCreation(String),
    TokenVerification(String),
    InvalidCredentials,
    MissingEnvironmentVar(String),
    HashingError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::TokenCreation(e) => write!(f, "Failed to create token: {}", e),
            AuthError::TokenVerification(e) => write!(f, "Failed to verify token: {}", e),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::MissingEnvironmentVar(var) => {
                write!(f, "Missing environment variable: {}", var)
            }
            AuthError::HashingError(e) => write!(f, "Password hashing error: {}", e),
        }
    }
}

impl From<AuthError> for crate::errors::ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => crate::errors::ApiError::Unauthorized,
            other => crate::errors::ApiError::Internal(other.to_string()),
        }
    }
}
