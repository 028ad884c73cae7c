use axum_extra::extract::cookie::{Cookie, SameSite};
use cookie::time;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::types::{AuthError, AuthResponse, AUTH_COOKIE_NAME};
use crate::models::users::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

pub fn generate_token(user_id: &ObjectId, role: Role) -> Result<AuthResponse, AuthError> {
    let jwt_secret = std::env::var("JWT_SECRET")
        .map_err(|_| AuthError::MissingEnvironmentVar("JWT_SECRET".to_string()))?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let expires_in = 3600;

    let claims = Claims {
        sub: user_id.to_hex(),
        role,
        exp: now + expires_in,
        iat: now,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

    Ok(AuthResponse { token, expires_in })
}

pub fn create_auth_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token.to_owned()))
        .path("/")
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Strict)
        .expires(time::OffsetDateTime::now_utc() + time::Duration::hours(1))
        .build()
}

pub fn clear_auth_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, ""))
        .path("/")
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Strict)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

pub fn verify_token(token: &str) -> Result<Claims, AuthError> {
    let jwt_secret = std::env::var("JWT_SECRET")
        .map_err(|_| AuthError::MissingEnvironmentVar("JWT_SECRET".to_string()))?;

    let validation = Validation::default();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::TokenVerification(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::env;
    use std::sync::Once;
    use tokio::sync::Mutex;

    // global mutex for environment variable operations
    static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
    static INIT: Once = Once::new();

    fn initialize() {
        INIT.call_once(|| {
            env::set_var("JWT_SECRET", "test_secret_for_testing_only");
        });
    }

    #[tokio::test]
    async fn test_generate_token() {
        let _lock = ENV_MUTEX.lock().await;
        initialize();

        let user_id = ObjectId::new();
        let result = generate_token(&user_id, Role::Player);
        assert!(result.is_ok(), "Token generation should succeed");

        let auth_response = result.unwrap();
        assert!(!auth_response.token.is_empty(), "Token should not be empty");
        assert_eq!(auth_response.expires_in, 3600, "Expiration should be 3600 seconds");
    }

    #[tokio::test]
    async fn test_verify_token_round_trip() {
        let _lock = ENV_MUTEX.lock().await;
        initialize();

        let user_id = ObjectId::new();
        let auth_response =
            generate_token(&user_id, Role::Admin).expect("Token generation should succeed");

        let claims = verify_token(&auth_response.token).expect("Token verification should succeed");
        assert_eq!(claims.sub, user_id.to_hex());
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_verify_invalid_token() {
        let _lock = ENV_MUTEX.lock().await;
        initialize();

        let result = verify_token("invalid.token.here");
        assert!(result.is_err(), "Invalid token should fail verification");

        match result {
            Err(AuthError::TokenVerification(_)) => (),
            other => panic!("Expected TokenVerification error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auth_cookie_attributes() {
        let _lock = ENV_MUTEX.lock().await;
        initialize();

        let cookie = create_auth_cookie("some-token");
        assert_eq!(cookie.name(), AUTH_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }
}
