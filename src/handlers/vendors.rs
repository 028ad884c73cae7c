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
use crate::models::vendors::{Vendor, VendorView};
use crate::state::AppState;

/// Vendor directory. Default radius 50 miles; vendors without coordinates are
/// appended after the in-radius results.
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> Result<Json<Vec<VendorView>>, ApiError> {
    let mut cursor = database::vendors(&state.db).find(None, None).await?;
    let mut all = Vec::new();
    while let Some(vendor) = cursor.try_next().await? {
        all.push(vendor);
    }

    let origin = match &query.near {
        Some(near) => geo::geocode(&state.http, &state.config.nominatim_url, near).await,
        None => None,
    };

    let views = match origin {
        Some(origin) => {
            let radius = query.radius.unwrap_or(DEFAULT_RADIUS_CAMPAIGNS);
            geo::filter_by_radius(&origin, radius, all, MissingCoords::Append, |v| {
                v.coordinates
            })
            .into_iter()
            .map(|(vendor, distance)| {
                let mut view = VendorView::from(vendor);
                view.distance_miles = distance;
                view
            })
            .collect()
        }
        None => all.into_iter().map(VendorView::from).collect(),
    };

    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
pub struct VendorPayload {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub location: String,
}

pub async fn create_vendor(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<VendorPayload>,
) -> Result<(StatusCode, Json<VendorView>), ApiError> {
    user.require_admin()?;
    validate_name(&payload.name)?;

    let coordinates =
        geo::geocode(&state.http, &state.config.nominatim_url, &payload.location).await;

    let vendor = Vendor {
        id: None,
        name: payload.name.trim().to_string(),
        description: payload.description,
        website: payload.website,
        location: payload.location,
        coordinates,
        created_at: DateTime::now(),
    };

    let inserted = database::vendors(&state.db).insert_one(&vendor, None).await?;
    let mut created = vendor;
    created.id = inserted.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_vendor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<VendorPayload>,
) -> Result<Json<VendorView>, ApiError> {
    user.require_admin()?;
    validate_name(&payload.name)?;

    let oid = ObjectId::parse_str(&id)?;
    let vendors = database::vendors(&state.db);
    let mut vendor = vendors
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("Vendor"))?;

    if vendor.location != payload.location {
        vendor.coordinates =
            geo::geocode(&state.http, &state.config.nominatim_url, &payload.location).await;
    }
    vendor.name = payload.name.trim().to_string();
    vendor.description = payload.description;
    vendor.website = payload.website;
    vendor.location = payload.location;

    vendors.replace_one(doc! { "_id": oid }, &vendor, None).await?;
    Ok(Json(vendor.into()))
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("A name is required".to_string()));
    }
    Ok(())
}

pub async fn delete_vendor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_admin()?;

    let oid = ObjectId::parse_str(&id)?;
    let deleted = database::vendors(&state.db)
        .delete_one(doc! { "_id": oid }, None)
        .await?;
    if deleted.deleted_count == 0 {
        return Err(ApiError::NotFound("Vendor"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_name_rejected_when_blank() {
        assert!(validate_name("").is_err(), "empty name should be rejected");
        assert!(validate_name("   ").is_err(), "whitespace name should be rejected");
        assert!(validate_name("Dragon's Den Games").is_ok());
    }
}
