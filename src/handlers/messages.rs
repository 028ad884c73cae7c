use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::FindOptions;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::database;
use crate::errors::ApiError;
use crate::models::messages::{Message, MessageView};
use crate::state::AppState;

/// Fire-and-forget system notification. Roster changes and moderation actions
/// call this; a failure must never fail the action that triggered it.
pub async fn notify(db: &mongodb::Database, recipient_id: ObjectId, subject: &str, body: &str) {
    let message = Message {
        id: None,
        sender_id: None,
        recipient_id,
        subject: subject.to_string(),
        body: body.to_string(),
        read: false,
        created_at: DateTime::now(),
    };

    if let Err(e) = database::messages(db).insert_one(&message, None).await {
        log::warn!("Failed to create notification for {}: {}", recipient_id, e);
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessagePayload {
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<SendMessagePayload>,
) -> Result<(StatusCode, Json<MessageView>), ApiError> {
    if payload.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Message body cannot be empty".to_string()));
    }
    let recipient_id = ObjectId::parse_str(&payload.recipient_id)?;

    database::users(&state.db)
        .find_one(doc! { "_id": recipient_id }, None)
        .await?
        .ok_or(ApiError::NotFound("Recipient"))?;

    let message = Message {
        id: None,
        sender_id: Some(user.id),
        recipient_id,
        subject: payload.subject,
        body: payload.body,
        read: false,
        created_at: DateTime::now(),
    };

    let inserted = database::messages(&state.db).insert_one(&message, None).await?;
    let mut created = message;
    created.id = inserted.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn inbox(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
    let mut cursor = database::messages(&state.db)
        .find(doc! { "recipient_id": user.id }, options)
        .await?;

    let mut views = Vec::new();
    while let Some(message) = cursor.try_next().await? {
        views.push(MessageView::from(message));
    }
    Ok(Json(views))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let oid = ObjectId::parse_str(&id)?;
    let messages = database::messages(&state.db);

    let message = messages
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("Message"))?;
    if message.recipient_id != user.id {
        return Err(ApiError::Forbidden);
    }

    messages
        .update_one(doc! { "_id": oid }, doc! { "$set": { "read": true } }, None)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let oid = ObjectId::parse_str(&id)?;
    let messages = database::messages(&state.db);

    let message = messages
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("Message"))?;
    if message.recipient_id != user.id {
        return Err(ApiError::Forbidden);
    }

    messages.delete_one(doc! { "_id": oid }, None).await?;
    Ok(StatusCode::NO_CONTENT)
}
