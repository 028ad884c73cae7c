use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::database;
use crate::errors::ApiError;
use crate::models::characters::{Character, CharacterView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCharacterPayload {
    pub name: String,
    pub game_system: String,
    pub class: Option<String>,
    pub level: Option<u32>,
    #[serde(default)]
    pub sheet: Document,
    pub portrait_url: Option<String>,
}

pub async fn create_character(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateCharacterPayload>,
) -> Result<(StatusCode, Json<CharacterView>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("A name is required".to_string()));
    }

    let now = DateTime::now();
    let character = Character {
        id: None,
        user_id: user.id,
        name: payload.name.trim().to_string(),
        game_system: payload.game_system,
        class: payload.class,
        level: payload.level.unwrap_or(1),
        sheet: payload.sheet,
        portrait_url: payload.portrait_url,
        created_at: now,
        updated_at: now,
    };

    let inserted = database::characters(&state.db)
        .insert_one(&character, None)
        .await?;
    let mut created = character;
    created.id = inserted.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Always scoped to the caller; there is no public character browsing.
pub async fn list_characters(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<CharacterView>>, ApiError> {
    let mut cursor = database::characters(&state.db)
        .find(doc! { "user_id": user.id }, None)
        .await?;

    let mut views = Vec::new();
    while let Some(character) = cursor.try_next().await? {
        views.push(CharacterView::from(character));
    }
    Ok(Json(views))
}

pub async fn get_character(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CharacterView>, ApiError> {
    let character = load_owned(&state, &user, &id).await?;
    Ok(Json(character.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCharacterPayload {
    pub name: Option<String>,
    pub game_system: Option<String>,
    pub class: Option<String>,
    pub level: Option<u32>,
    pub sheet: Option<Document>,
    pub portrait_url: Option<String>,
}

pub async fn update_character(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCharacterPayload>,
) -> Result<Json<CharacterView>, ApiError> {
    let mut character = load_owned(&state, &user, &id).await?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("A name is required".to_string()));
        }
        character.name = name.trim().to_string();
    }
    if let Some(game_system) = payload.game_system {
        character.game_system = game_system;
    }
    if let Some(class) = payload.class {
        character.class = Some(class);
    }
    if let Some(level) = payload.level {
        character.level = level;
    }
    if let Some(sheet) = payload.sheet {
        character.sheet = sheet;
    }
    if let Some(portrait_url) = payload.portrait_url {
        character.portrait_url = Some(portrait_url);
    }
    character.updated_at = DateTime::now();

    let oid = character.id.ok_or(ApiError::NotFound("Character"))?;
    database::characters(&state.db)
        .replace_one(doc! { "_id": oid }, &character, None)
        .await?;

    Ok(Json(character.into()))
}

pub async fn delete_character(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let character = load_owned(&state, &user, &id).await?;
    let oid = character.id.ok_or(ApiError::NotFound("Character"))?;
    database::characters(&state.db)
        .delete_one(doc! { "_id": oid }, None)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_owned(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<Character, ApiError> {
    let oid = ObjectId::parse_str(id)?;
    let character = database::characters(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("Character"))?;
    if character.user_id != user.id {
        return Err(ApiError::Forbidden);
    }
    Ok(character)
}
