use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use serde::Deserialize;

use super::GeoQuery;
use crate::auth::CurrentUser;
use crate::database;
use crate::errors::ApiError;
use crate::geo::{self, MissingCoords, DEFAULT_RADIUS_CAMPAIGNS};
use crate::models::listings::{Listing, ListingView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateListingPayload {
    pub title: String,
    pub game_system: Option<String>,
    pub condition: String,
    pub price_cents: i64,
    pub description: String,
}

pub async fn create_listing(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateListingPayload>,
) -> Result<(StatusCode, Json<ListingView>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("A title is required".to_string()));
    }
    if payload.price_cents < 0 {
        return Err(ApiError::BadRequest("price_cents cannot be negative".to_string()));
    }

    // seller coordinates ride along so search never joins against users
    let seller = database::users(&state.db)
        .find_one(doc! { "_id": user.id }, None)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let now = DateTime::now();
    let listing = Listing {
        id: None,
        user_id: user.id,
        title: payload.title.trim().to_string(),
        game_system: payload.game_system,
        condition: payload.condition,
        price_cents: payload.price_cents,
        description: payload.description,
        coordinates: seller.coordinates,
        created_at: now,
        updated_at: now,
    };

    let inserted = database::listings(&state.db).insert_one(&listing, None).await?;
    let mut created = listing;
    created.id = inserted.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListingView>, ApiError> {
    let oid = ObjectId::parse_str(&id)?;
    let listing = database::listings(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("Listing"))?;
    Ok(Json(listing.into()))
}

pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> Result<Json<Vec<ListingView>>, ApiError> {
    let mut cursor = database::listings(&state.db).find(None, None).await?;
    let mut all = Vec::new();
    while let Some(listing) = cursor.try_next().await? {
        all.push(listing);
    }

    let origin = match &query.near {
        Some(near) => geo::geocode(&state.http, &state.config.nominatim_url, near).await,
        None => None,
    };

    let views = match origin {
        Some(origin) => {
            let radius = query.radius.unwrap_or(DEFAULT_RADIUS_CAMPAIGNS);
            geo::filter_by_radius(&origin, radius, all, MissingCoords::Append, |l| {
                l.coordinates
            })
            .into_iter()
            .map(|(listing, distance)| {
                let mut view = ListingView::from(listing);
                view.distance_miles = distance;
                view
            })
            .collect()
        }
        None => all.into_iter().map(ListingView::from).collect(),
    };

    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
pub struct UpdateListingPayload {
    pub title: Option<String>,
    pub game_system: Option<String>,
    pub condition: Option<String>,
    pub price_cents: Option<i64>,
    pub description: Option<String>,
}

pub async fn update_listing(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateListingPayload>,
) -> Result<Json<ListingView>, ApiError> {
    let mut listing = load_owned(&state, &user, &id).await?;

    if let Some(title) = payload.title {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest("A title is required".to_string()));
        }
        listing.title = title.trim().to_string();
    }
    if let Some(game_system) = payload.game_system {
        listing.game_system = Some(game_system);
    }
    if let Some(condition) = payload.condition {
        listing.condition = condition;
    }
    if let Some(price_cents) = payload.price_cents {
        if price_cents < 0 {
            return Err(ApiError::BadRequest("price_cents cannot be negative".to_string()));
        }
        listing.price_cents = price_cents;
    }
    if let Some(description) = payload.description {
        listing.description = description;
    }
    listing.updated_at = DateTime::now();

    let oid = listing.id.ok_or(ApiError::NotFound("Listing"))?;
    database::listings(&state.db)
        .replace_one(doc! { "_id": oid }, &listing, None)
        .await?;

    Ok(Json(listing.into()))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let listing = load_owned(&state, &user, &id).await?;
    let oid = listing.id.ok_or(ApiError::NotFound("Listing"))?;
    database::listings(&state.db)
        .delete_one(doc! { "_id": oid }, None)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_owned(state: &AppState, user: &CurrentUser, id: &str) -> Result<Listing, ApiError> {
    let oid = ObjectId::parse_str(id)?;
    let listing = database::listings(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("Listing"))?;
    if listing.user_id != user.id {
        return Err(ApiError::Forbidden);
    }
    Ok(listing)
}
