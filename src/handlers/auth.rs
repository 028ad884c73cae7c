use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use mongodb::bson::{doc, DateTime};
use serde::Deserialize;

use crate::auth::{jwt, password, types::AuthError};
use crate::database;
use crate::errors::ApiError;
use crate::models::users::{ProfileView, Role, User};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupPayload {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupPayload>,
) -> Result<(StatusCode, CookieJar, Json<ProfileView>), ApiError> {
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if payload.username.trim().is_empty() {
        return Err(ApiError::BadRequest("A username is required".to_string()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let users = database::users(&state.db);
    if users.find_one(doc! { "email": email.as_str() }, None).await?.is_some() {
        return Err(ApiError::Conflict(
            "An account with that email already exists".to_string(),
        ));
    }

    let now = DateTime::now();
    let user = User {
        id: None,
        email,
        password_hash: password::hash_password(&payload.password)?,
        username: payload.username.trim().to_string(),
        bio: None,
        location: None,
        coordinates: None,
        owned_games: vec![],
        favorite_games: vec![],
        role: Role::Player,
        ambassador_until: None,
        stripe_account_id: None,
        created_at: now,
        updated_at: now,
    };

    let inserted = users.insert_one(&user, None).await?;
    let id = inserted
        .inserted_id
        .as_object_id()
        .ok_or_else(|| ApiError::Internal("Insert returned a non-ObjectId id".to_string()))?;

    let auth = jwt::generate_token(&id, Role::Player)?;
    let jar = jar.add(jwt::create_auth_cookie(&auth.token));

    let mut created = user;
    created.id = Some(id);
    log::info!("New account created: {}", created.username);

    Ok((StatusCode::CREATED, jar, Json(created.into())))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<ProfileView>), ApiError> {
    let email = payload.email.trim().to_lowercase();
    let users = database::users(&state.db);

    let user = users
        .find_one(doc! { "email": email.as_str() }, None)
        .await?
        .ok_or(ApiError::from(AuthError::InvalidCredentials))?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let id = user
        .id
        .ok_or_else(|| ApiError::Internal("Stored user has no id".to_string()))?;
    let auth = jwt::generate_token(&id, user.role)?;
    let jar = jar.add(jwt::create_auth_cookie(&auth.token));

    Ok((jar, Json(user.into())))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.add(jwt::clear_auth_cookie()), StatusCode::NO_CONTENT)
}
