use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime};
use mongodb::options::FindOptions;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::database;
use crate::errors::ApiError;
use crate::models::flags::{Flag, FlagStatus, FlagTarget, FlagView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateFlagPayload {
    pub target_kind: FlagTarget,
    pub target_id: String,
    pub reason: String,
}

pub async fn create_flag(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateFlagPayload>,
) -> Result<(StatusCode, Json<FlagView>), ApiError> {
    if payload.reason.trim().is_empty() {
        return Err(ApiError::BadRequest("A reason is required".to_string()));
    }
    // target id must at least parse; existence is checked at resolution time
    ObjectId::parse_str(&payload.target_id)?;

    let flag = Flag {
        id: None,
        reporter_id: user.id,
        target_kind: payload.target_kind,
        target_id: payload.target_id,
        reason: payload.reason,
        status: FlagStatus::Open,
        created_at: DateTime::now(),
        resolved_at: None,
        resolved_by: None,
    };

    let inserted = database::flags(&state.db).insert_one(&flag, None).await?;
    let mut created = flag;
    created.id = inserted.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[derive(Debug, Deserialize)]
pub struct FlagListQuery {
    pub status: Option<FlagStatus>,
}

pub async fn list_flags(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<FlagListQuery>,
) -> Result<Json<Vec<FlagView>>, ApiError> {
    user.require_admin()?;

    let filter = match query.status {
        Some(status) => {
            doc! { "status": to_bson(&status).map_err(|e| ApiError::Internal(e.to_string()))? }
        }
        None => doc! {},
    };
    let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();

    let mut cursor = database::flags(&state.db).find(filter, options).await?;
    let mut views = Vec::new();
    while let Some(flag) = cursor.try_next().await? {
        views.push(FlagView::from(flag));
    }
    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveAction {
    Dismiss,
    RemoveContent,
}

#[derive(Debug, Deserialize)]
pub struct ResolveFlagPayload {
    pub action: ResolveAction,
}

pub async fn resolve_flag(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ResolveFlagPayload>,
) -> Result<Json<FlagView>, ApiError> {
    user.require_admin()?;

    let oid = ObjectId::parse_str(&id)?;
    let flags = database::flags(&state.db);
    let mut flag = flags
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("Flag"))?;

    if flag.status != FlagStatus::Open {
        return Err(ApiError::Conflict("Flag is already resolved".to_string()));
    }

    flag.status = match payload.action {
        ResolveAction::Dismiss => FlagStatus::Dismissed,
        ResolveAction::RemoveContent => {
            remove_target(&state, flag.target_kind, &flag.target_id).await?;
            FlagStatus::Resolved
        }
    };
    flag.resolved_at = Some(DateTime::now());
    flag.resolved_by = Some(user.id);

    flags.replace_one(doc! { "_id": oid }, &flag, None).await?;
    Ok(Json(flag.into()))
}

/// Hard-deletes the flagged document. A target that already vanished is logged
/// rather than treated as an error so the flag can still close.
async fn remove_target(
    state: &AppState,
    kind: FlagTarget,
    target_id: &str,
) -> Result<(), ApiError> {
    let oid = ObjectId::parse_str(target_id)?;
    let filter = doc! { "_id": oid };

    let deleted = match kind {
        FlagTarget::User => database::users(&state.db).delete_one(filter, None).await?,
        FlagTarget::Game => database::games(&state.db).delete_one(filter, None).await?,
        FlagTarget::Campaign => {
            database::campaigns(&state.db).delete_one(filter, None).await?
        }
        FlagTarget::Listing => database::listings(&state.db).delete_one(filter, None).await?,
    };

    if deleted.deleted_count == 0 {
        log::warn!("Flagged {:?} {} was already gone", kind, target_id);
    }
    Ok(())
}
