use axum::{extract::State, Json};
use mongodb::bson::{doc, DateTime};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::database;
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub onboarding_url: String,
}

/// Express-account onboarding for hosts of paid campaigns. Creates the account
/// on first call and hands back a fresh account link either way.
pub async fn connect(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ConnectResponse>, ApiError> {
    let users = database::users(&state.db);
    let stored = users
        .find_one(doc! { "_id": user.id }, None)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let account_id = match stored.stripe_account_id {
        Some(account_id) => account_id,
        None => {
            let account = state.stripe.create_express_account(&stored.email).await?;
            users
                .update_one(
                    doc! { "_id": user.id },
                    doc! { "$set": {
                        "stripe_account_id": account.id.as_str(),
                        "updated_at": DateTime::now(),
                    }},
                    None,
                )
                .await?;
            log::info!("Created Connect account {} for user {}", account.id, user.id);
            account.id
        }
    };

    let link = state
        .stripe
        .create_account_link(
            &account_id,
            &state.config.connect_refresh_url,
            &state.config.connect_return_url,
        )
        .await?;

    Ok(Json(ConnectResponse {
        onboarding_url: link.url,
    }))
}
