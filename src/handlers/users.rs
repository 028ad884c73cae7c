use axum::{
    extract::{Path, Query, State},
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use serde::Deserialize;

use super::GeoQuery;
use crate::auth::CurrentUser;
use crate::database;
use crate::errors::ApiError;
use crate::geo::{self, MissingCoords, DEFAULT_RADIUS_GAMES};
use crate::models::users::{sanitize_favorites, ProfileView, User, UserView};
use crate::state::AppState;

pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ProfileView>, ApiError> {
    let found = database::users(&state.db)
        .find_one(doc! { "_id": user.id }, None)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(found.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfilePayload {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub owned_games: Option<Vec<String>>,
    pub favorite_games: Option<Vec<String>>,
}

pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<ProfileView>, ApiError> {
    let users = database::users(&state.db);
    let mut stored: User = users
        .find_one(doc! { "_id": user.id }, None)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if let Some(username) = payload.username {
        if username.trim().is_empty() {
            return Err(ApiError::BadRequest("Username cannot be empty".to_string()));
        }
        stored.username = username.trim().to_string();
    }
    if let Some(bio) = payload.bio {
        stored.bio = Some(bio);
    }
    if let Some(location) = payload.location {
        if stored.location.as_deref() != Some(location.as_str()) {
            stored.coordinates =
                geo::geocode(&state.http, &state.config.nominatim_url, &location).await;
        }
        stored.location = Some(location);
    }
    if let Some(owned) = payload.owned_games {
        stored.owned_games = owned;
    }
    if let Some(favorites) = payload.favorite_games {
        stored.favorite_games = favorites;
    }
    // enforced on every save, not only when favorites change
    stored.favorite_games = sanitize_favorites(&stored.owned_games, stored.favorite_games);
    stored.updated_at = DateTime::now();

    users
        .replace_one(doc! { "_id": user.id }, &stored, None)
        .await?;

    Ok(Json(stored.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let oid = ObjectId::parse_str(&id)?;
    let found = database::users(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(found.into()))
}

/// Player search. With `near`, results are limited to the radius (default 25
/// miles) and sorted by distance; players without coordinates are dropped.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let mut cursor = database::users(&state.db).find(None, None).await?;
    let mut all = Vec::new();
    while let Some(user) = cursor.try_next().await? {
        all.push(user);
    }

    let origin = match &query.near {
        Some(near) => geo::geocode(&state.http, &state.config.nominatim_url, near).await,
        None => None,
    };

    let views = match origin {
        Some(origin) => {
            let radius = query.radius.unwrap_or(DEFAULT_RADIUS_GAMES);
            geo::filter_by_radius(&origin, radius, all, MissingCoords::Exclude, |u| {
                u.coordinates
            })
            .into_iter()
            .map(|(user, distance)| {
                let mut view = UserView::from(user);
                view.distance_miles = distance;
                view
            })
            .collect()
        }
        None => all.into_iter().map(UserView::from).collect(),
    };

    Ok(Json(views))
}

/// Admin-only: grant or extend a user's ambassador exemption.
#[derive(Debug, Deserialize)]
pub struct AmbassadorPayload {
    pub until: chrono::DateTime<chrono::Utc>,
}

pub async fn set_ambassador(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<AmbassadorPayload>,
) -> Result<Json<UserView>, ApiError> {
    caller.require_admin()?;

    let oid = ObjectId::parse_str(&id)?;
    let users = database::users(&state.db);
    let until = DateTime::from_chrono(payload.until);

    let updated = users
        .find_one_and_update(
            doc! { "_id": oid },
            doc! { "$set": { "ambassador_until": until, "updated_at": DateTime::now() } },
            mongodb::options::FindOneAndUpdateOptions::builder()
                .return_document(mongodb::options::ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(updated.into()))
}
