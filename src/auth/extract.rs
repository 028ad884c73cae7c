use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use mongodb::bson::oid::ObjectId;

use super::jwt;
use super::types::AUTH_COOKIE_NAME;
use crate::errors::ApiError;
use crate::models::users::Role;

/// Authenticated caller, extracted from the session cookie. Handlers that take
/// this as an argument reject cookieless requests with 401 before running.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: ObjectId,
    pub role: Role,
}

impl CurrentUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        let token = jar
            .get(AUTH_COOKIE_NAME)
            .map(|cookie| cookie.value().to_owned())
            .ok_or(ApiError::Unauthorized)?;

        let claims = jwt::verify_token(&token).map_err(|_| ApiError::Unauthorized)?;
        let id = ObjectId::parse_str(&claims.sub).map_err(|_| ApiError::Unauthorized)?;

        Ok(CurrentUser {
            id,
            role: claims.role,
        })
    }
}
