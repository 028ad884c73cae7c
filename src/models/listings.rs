use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Listing {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub game_system: Option<String>,
    pub condition: String,
    pub price_cents: i64,
    pub description: String,
    /// Copied from the seller's profile at create/update so listing search
    /// does not join against users.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListingView {
    pub id: String,
    pub seller_id: String,
    pub title: String,
    pub game_system: Option<String>,
    pub condition: String,
    pub price_cents: i64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl From<Listing> for ListingView {
    fn from(listing: Listing) -> Self {
        ListingView {
            id: listing.id.map(|id| id.to_hex()).unwrap_or_default(),
            seller_id: listing.user_id.to_hex(),
            title: listing.title,
            game_system: listing.game_system,
            condition: listing.condition,
            price_cents: listing.price_cents,
            description: listing.description,
            distance_miles: None,
        }
    }
}
