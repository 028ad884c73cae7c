use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use serde::Deserialize;

use super::messages::notify;
use super::GeoQuery;
use crate::auth::CurrentUser;
use crate::database;
use crate::errors::ApiError;
use crate::geo::{self, MissingCoords, DEFAULT_RADIUS_GAMES};
use crate::models::games::{GameSession, GameSessionView};
use crate::roster::Placement;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGamePayload {
    pub title: String,
    pub description: String,
    pub game_system: String,
    pub scheduled_for: chrono::DateTime<chrono::Utc>,
    pub location: String,
    pub max_players: u32,
    #[serde(default)]
    pub require_approval: bool,
}

pub async fn create_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateGamePayload>,
) -> Result<(StatusCode, Json<GameSessionView>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("A title is required".to_string()));
    }
    if payload.max_players == 0 {
        return Err(ApiError::BadRequest("max_players must be at least 1".to_string()));
    }

    let coordinates =
        geo::geocode(&state.http, &state.config.nominatim_url, &payload.location).await;

    let now = DateTime::now();
    let game = GameSession {
        id: None,
        user_id: user.id,
        title: payload.title.trim().to_string(),
        description: payload.description,
        game_system: payload.game_system,
        scheduled_for: DateTime::from_chrono(payload.scheduled_for),
        location: payload.location,
        coordinates,
        max_players: payload.max_players,
        require_approval: payload.require_approval,
        roster: Default::default(),
        created_at: now,
        updated_at: now,
    };

    let inserted = database::games(&state.db).insert_one(&game, None).await?;
    let mut created = game;
    created.id = inserted.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameSessionView>, ApiError> {
    let game = load_game(&state, &id).await?;
    Ok(Json(game.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGamePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub game_system: Option<String>,
    pub scheduled_for: Option<chrono::DateTime<chrono::Utc>>,
    pub location: Option<String>,
    pub max_players: Option<u32>,
    pub require_approval: Option<bool>,
}

pub async fn update_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateGamePayload>,
) -> Result<Json<GameSessionView>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    if !game.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    if let Some(title) = payload.title {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest("A title is required".to_string()));
        }
        game.title = title.trim().to_string();
    }
    if let Some(description) = payload.description {
        game.description = description;
    }
    if let Some(game_system) = payload.game_system {
        game.game_system = game_system;
    }
    if let Some(scheduled_for) = payload.scheduled_for {
        game.scheduled_for = DateTime::from_chrono(scheduled_for);
    }
    if let Some(location) = payload.location {
        if game.location != location {
            game.coordinates =
                geo::geocode(&state.http, &state.config.nominatim_url, &location).await;
        }
        game.location = location;
    }
    if let Some(max_players) = payload.max_players {
        if max_players == 0 {
            return Err(ApiError::BadRequest("max_players must be at least 1".to_string()));
        }
        game.max_players = max_players;
    }
    if let Some(require_approval) = payload.require_approval {
        game.require_approval = require_approval;
    }
    game.updated_at = DateTime::now();

    let oid = game.id.ok_or(ApiError::NotFound("Game"))?;
    database::games(&state.db)
        .replace_one(doc! { "_id": oid }, &game, None)
        .await?;

    Ok(Json(game.into()))
}

pub async fn delete_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let game = load_game(&state, &id).await?;
    if !game.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    let oid = game.id.ok_or(ApiError::NotFound("Game"))?;
    database::games(&state.db)
        .delete_one(doc! { "_id": oid }, None)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Session search. Games without coordinates are excluded from `near` queries;
/// default radius 25 miles.
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> Result<Json<Vec<GameSessionView>>, ApiError> {
    let mut cursor = database::games(&state.db).find(None, None).await?;
    let mut all = Vec::new();
    while let Some(game) = cursor.try_next().await? {
        all.push(game);
    }

    let origin = match &query.near {
        Some(near) => geo::geocode(&state.http, &state.config.nominatim_url, near).await,
        None => None,
    };

    let views = match origin {
        Some(origin) => {
            let radius = query.radius.unwrap_or(DEFAULT_RADIUS_GAMES);
            geo::filter_by_radius(&origin, radius, all, MissingCoords::Exclude, |g| {
                g.coordinates
            })
            .into_iter()
            .map(|(game, distance)| {
                let mut view = GameSessionView::from(game);
                view.distance_miles = distance;
                view
            })
            .collect()
        }
        None => all.into_iter().map(GameSessionView::from).collect(),
    };

    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
pub struct RosterPayload {
    pub user_id: String,
}

pub async fn join_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<GameSessionView>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    game.roster
        .join(&user.id.to_hex(), game.require_approval, game.max_players)?;
    save_roster(&state, &game).await?;
    Ok(Json(game.into()))
}

pub async fn leave_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<GameSessionView>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    let placement = game.roster.remove(&user.id.to_hex())?;
    save_roster(&state, &game).await?;

    if let Placement::Removed {
        promoted: Some(promoted),
    } = placement
    {
        notify_promoted(&state, &promoted, &game.title).await;
    }
    Ok(Json(game.into()))
}

pub async fn approve_player(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RosterPayload>,
) -> Result<Json<GameSessionView>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    if !game.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    let placement = game.roster.approve(&payload.user_id, game.max_players)?;
    save_roster(&state, &game).await?;

    if let Ok(player) = ObjectId::parse_str(&payload.user_id) {
        let body = match placement {
            Placement::Waitlisted => {
                format!("Your request to join \"{}\" was approved; the session is full, so you are on the waitlist.", game.title)
            }
            _ => format!("Your request to join \"{}\" was approved.", game.title),
        };
        notify(&state.db, player, "Request approved", &body).await;
    }
    Ok(Json(game.into()))
}

pub async fn deny_player(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RosterPayload>,
) -> Result<Json<GameSessionView>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    if !game.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    game.roster.deny(&payload.user_id)?;
    save_roster(&state, &game).await?;

    if let Ok(player) = ObjectId::parse_str(&payload.user_id) {
        let body = format!("Your request to join \"{}\" was denied.", game.title);
        notify(&state.db, player, "Request denied", &body).await;
    }
    Ok(Json(game.into()))
}

pub async fn remove_player(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RosterPayload>,
) -> Result<Json<GameSessionView>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    if !game.is_hosted_by(&user.id) {
        return Err(ApiError::Forbidden);
    }

    let placement = game.roster.remove(&payload.user_id)?;
    save_roster(&state, &game).await?;

    if let Ok(player) = ObjectId::parse_str(&payload.user_id) {
        let body = format!("You were removed from \"{}\".", game.title);
        notify(&state.db, player, "Removed from session", &body).await;
    }
    if let Placement::Removed {
        promoted: Some(promoted),
    } = placement
    {
        notify_promoted(&state, &promoted, &game.title).await;
    }
    Ok(Json(game.into()))
}

async fn load_game(state: &AppState, id: &str) -> Result<GameSession, ApiError> {
    let oid = ObjectId::parse_str(id)?;
    database::games(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("Game"))
}

/// Persists the three roster arrays. Single-document `$set`, last writer wins.
async fn save_roster(state: &AppState, game: &GameSession) -> Result<(), ApiError> {
    let oid = game.id.ok_or(ApiError::NotFound("Game"))?;
    database::games(&state.db)
        .update_one(
            doc! { "_id": oid },
            doc! { "$set": {
                "pending_players": game.roster.pending_players.clone(),
                "signed_up_players": game.roster.signed_up_players.clone(),
                "waitlist": game.roster.waitlist.clone(),
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
