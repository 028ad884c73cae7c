use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime};
use serde::{Deserialize, Serialize};

use super::messages::notify;
use super::GeoQuery;
use crate::auth::CurrentUser;
use crate::database;
use crate::errors::ApiError;
use crate::geo::{self, MissingCoords, DEFAULT_RADIUS_CAMPAIGNS};
use crate::models::campaigns::{Campaign, CampaignView, PaymentRecord};
use crate::payments::split::PaymentSplit;
use crate::payments::stripe::CheckoutParams;
use crate::roster::Placement;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCampaignPayload {
    pub title: String,
    pub description: String,
    pub game_system: String,
    pub frequency: Option<String>,
    pub location: String,
    pub max_players: u32,
    #[serde(default)]
    pub require_approval: bool,
    #[serde(default)]
    pub price_cents: i64,
}

pub async fn create_campaign(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateCampaignPayload>,
) -> Result<(StatusCode, Json<CampaignView>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("A title is required".to_string()));
    }
    if payload.max_players == 0 {
        return Err(ApiError::BadRequest("max_players must be at least 1".to_string()));
    }
    if payload.price_cents < 0 {
        return Err(ApiError::BadRequest("price_cents cannot be negative".to_string()));
    }

    let coordinates =
        geo::geocode(&state.http, &state.config.nominatim_url, &payload.location).await;

    let now = DateTime::now();
    let campaign = Campaign {
        id: None,
        user_id: user.id,
        title: payload.title.trim().to_string(),
        description: payload.description,
        game_system: payload.game_system,
        frequency: payload.frequency,
        location: payload.location,
        coordinates,
        max_players: payload.max_players,
        require_approval: payload.require_approval,
        price_cents: payload.price_cents,
        roster: Default::default(),
        payment_records: vec![],
        created_at: now,
        updated_at: now,
    };

    let inserted = database::campaigns(&state.db)
        .insert_one(&campaign, None)
        .await?;
    let mut created = campaign;
    created.id = inserted.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CampaignView>, ApiError> {
    let campaign = load_campaign(&state, &id).await?;
    Ok(Json(campaign.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCampaignPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub game_system: Option<String>,
    pub frequency: Option<String>,
    pub location: Option<String>,
    pub max_players: Option<u32>,
    pub require_approval: Option<bool>,
    pub price_cents: Option<i64>,
}

pub async fn update_campaign(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCampaignPayload>,
) -> Result<Json<CampaignView>, ApiError> {
    let mut campaign = load_campaign(&state, &id).await?;
    if !campaign.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    if let Some(title) = payload.title {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest("A title is required".to_string()));
        }
        campaign.title = title.trim().to_string();
    }
    if let Some(description) = payload.description {
        campaign.description = description;
    }
    if let Some(game_system) = payload.game_system {
        campaign.game_system = game_system;
    }
    if let Some(frequency) = payload.frequency {
        campaign.frequency = Some(frequency);
    }
    if let Some(location) = payload.location {
        if campaign.location != location {
            campaign.coordinates =
                geo::geocode(&state.http, &state.config.nominatim_url, &location).await;
        }
        campaign.location = location;
    }
    if let Some(max_players) = payload.max_players {
        if max_players == 0 {
            return Err(ApiError::BadRequest("max_players must be at least 1".to_string()));
        }
        campaign.max_players = max_players;
    }
    if let Some(require_approval) = payload.require_approval {
        campaign.require_approval = require_approval;
    }
    if let Some(price_cents) = payload.price_cents {
        if price_cents < 0 {
            return Err(ApiError::BadRequest("price_cents cannot be negative".to_string()));
        }
        campaign.price_cents = price_cents;
    }
    campaign.updated_at = DateTime::now();

    let oid = campaign.id.ok_or(ApiError::NotFound("Campaign"))?;
    database::campaigns(&state.db)
        .replace_one(doc! { "_id": oid }, &campaign, None)
        .await?;

    Ok(Json(campaign.into()))
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let campaign = load_campaign(&state, &id).await?;
    if !campaign.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    let oid = campaign.id.ok_or(ApiError::NotFound("Campaign"))?;
    database::campaigns(&state.db)
        .delete_one(doc! { "_id": oid }, None)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Campaign search. Default radius 50 miles; campaigns without coordinates are
/// appended after the in-radius results rather than dropped.
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> Result<Json<Vec<CampaignView>>, ApiError> {
    let mut cursor = database::campaigns(&state.db).find(None, None).await?;
    let mut all = Vec::new();
    while let Some(campaign) = cursor.try_next().await? {
        all.push(campaign);
    }

    let origin = match &query.near {
        Some(near) => geo::geocode(&state.http, &state.config.nominatim_url, near).await,
        None => None,
    };

    let views = match origin {
        Some(origin) => {
            let radius = query.radius.unwrap_or(DEFAULT_RADIUS_CAMPAIGNS);
            geo::filter_by_radius(&origin, radius, all, MissingCoords::Append, |c| {
                c.coordinates
            })
            .into_iter()
            .map(|(campaign, distance)| {
                let mut view = CampaignView::from(campaign);
                view.distance_miles = distance;
                view
            })
            .collect()
        }
        None => all.into_iter().map(CampaignView::from).collect(),
    };

    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
pub struct RosterPayload {
    pub user_id: String,
}

pub async fn join_campaign(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CampaignView>, ApiError> {
    let mut campaign = load_campaign(&state, &id).await?;
    campaign
        .roster
        .join(&user.id.to_hex(), campaign.require_approval, campaign.max_players)?;
    save_roster(&state, &campaign).await?;
    Ok(Json(campaign.into()))
}

pub async fn leave_campaign(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CampaignView>, ApiError> {
    let mut campaign = load_campaign(&state, &id).await?;
    let placement = campaign.roster.remove(&user.id.to_hex())?;
    save_roster(&state, &campaign).await?;

    if let Placement::Removed {
        promoted: Some(promoted),
    } = placement
    {
        notify_promoted(&state, &promoted, &campaign.title).await;
    }
    Ok(Json(campaign.into()))
}

pub async fn approve_player(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RosterPayload>,
) -> Result<Json<CampaignView>, ApiError> {
    let mut campaign = load_campaign(&state, &id).await?;
    if !campaign.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    let placement = campaign.roster.approve(&payload.user_id, campaign.max_players)?;
    save_roster(&state, &campaign).await?;

    if let Ok(player) = ObjectId::parse_str(&payload.user_id) {
        let body = match placement {
            Placement::Waitlisted => format!(
                "Your request to join \"{}\" was approved; the campaign is full, so you are on the waitlist.",
                campaign.title
            ),
            _ => format!("Your request to join \"{}\" was approved.", campaign.title),
        };
        notify(&state.db, player, "Request approved", &body).await;
    }
    Ok(Json(campaign.into()))
}

pub async fn deny_player(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RosterPayload>,
) -> Result<Json<CampaignView>, ApiError> {
    let mut campaign = load_campaign(&state, &id).await?;
    if !campaign.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    campaign.roster.deny(&payload.user_id)?;
    save_roster(&state, &campaign).await?;

    if let Ok(player) = ObjectId::parse_str(&payload.user_id) {
        let body = format!("Your request to join \"{}\" was denied.", campaign.title);
        notify(&state.db, player, "Request denied", &body).await;
    }
    Ok(Json(campaign.into()))
}

pub async fn remove_player(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RosterPayload>,
) -> Result<Json<CampaignView>, ApiError> {
    let mut campaign = load_campaign(&state, &id).await?;
    if !campaign.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    let placement = campaign.roster.remove(&payload.user_id)?;
    save_roster(&state, &campaign).await?;

    if let Ok(player) = ObjectId::parse_str(&payload.user_id) {
        let body = format!("You were removed from \"{}\".", campaign.title);
        notify(&state.db, player, "Removed from campaign", &body).await;
    }
    if let Placement::Removed {
        promoted: Some(promoted),
    } = placement
    {
        notify_promoted(&state, &promoted, &campaign.title).await;
    }
    Ok(Json(campaign.into()))
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: Option<String>,
    pub session_id: String,
}

/// Creates a Stripe Checkout Session for a paid campaign, splitting the charge
/// between the platform and the host's connected account.
pub async fn checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let campaign = load_campaign(&state, &id).await?;
    if !campaign.is_paid() {
        return Err(ApiError::BadRequest("This campaign is free to join".to_string()));
    }

    let host = database::users(&state.db)
        .find_one(doc! { "_id": campaign.user_id }, None)
        .await?
        .ok_or(ApiError::NotFound("Host"))?;
    let destination = host.stripe_account_id.clone().ok_or_else(|| {
        ApiError::Conflict("The host has not finished payout onboarding".to_string())
    })?;

    let split = PaymentSplit::compute(
        campaign.price_cents,
        state.config.platform_fee_percent,
        host.is_ambassador(DateTime::now()),
    );

    let session = state
        .stripe
        .create_checkout_session(CheckoutParams {
            product_name: &campaign.title,
            unit_amount_cents: split.gross_cents,
            application_fee_cents: split.platform_fee_cents,
            destination_account: &destination,
            success_url: &state.config.checkout_success_url,
            cancel_url: &state.config.checkout_cancel_url,
        })
        .await?;

    let record = PaymentRecord {
        checkout_session_id: session.id.clone(),
        payer_id: user.id,
        gross_cents: split.gross_cents,
        platform_fee_cents: split.platform_fee_cents,
        created_at: DateTime::now(),
    };
    let oid = campaign.id.ok_or(ApiError::NotFound("Campaign"))?;
    database::campaigns(&state.db)
        .update_one(
            doc! { "_id": oid },
            doc! { "$push": { "payment_records": to_bson(&record).map_err(|e| ApiError::Internal(e.to_string()))? } },
            None,
        )
        .await?;

    log::info!(
        "Checkout session {} created for campaign {} (gross {}, platform fee {})",
        session.id,
        oid.to_hex(),
        split.gross_cents,
        split.platform_fee_cents
    );

    Ok(Json(CheckoutResponse {
        checkout_url: session.url,
        session_id: session.id,
    }))
}

async fn load_campaign(state: &AppState, id: &str) -> Result<Campaign, ApiError> {
    let oid = ObjectId::parse_str(id)?;
    database::campaigns(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("Campaign"))
}

async fn save_roster(state: &AppState, campaign: &Campaign) -> Result<(), ApiError> {
    let oid = campaign.id.ok_or(ApiError::NotFound("Campaign"))?;
    database::campaigns(&state.db)
        .update_one(
            doc! { "_id": oid },
            doc! { "$set": {
                "pending_players": campaign.roster.pending_players.clone(),
                "signed_up_players": campaign.roster.signed_up_players.clone(),
                "waitlist": campaign.roster.waitlist.clone(),
                "updated_at": DateTime::now(),
            }},
            None,
        )
        .await?;
    Ok(())
}

async fn notify_promoted(state: &AppState, promoted: &str, title: &str) {
    if let Ok(player) = ObjectId::parse_str(promoted) {
        let body = format!("A spot opened up in \"{}\" and you are now signed up.", title);
        notify(&state.db, player, "Off the waitlist", &body).await;
    }
}
