use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::roster::Roster;

/// Recorded outcome of a checkout; the payment lifecycle itself lives in
/// Stripe.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentRecord {
    pub checkout_session_id: String,
    pub payer_id: ObjectId,
    pub gross_cents: i64,
    pub platform_fee_cents: i64,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Campaign {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub title: String,
    pub description: String,
    pub game_system: String,
    /// e.g. "weekly", "biweekly"; free-form.
    #[serde(default)]
    pub frequency: Option<String>,
    pub location: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub max_players: u32,
    #[serde(default)]
    pub require_approval: bool,
    /// 0 means a free campaign.
    #[serde(default)]
    pub price_cents: i64,
    #[serde(flatten)]
    pub roster: Roster,
    #[serde(default)]
    pub payment_records: Vec<PaymentRecord>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Campaign {
    pub fn is_hosted_by(&self, user_id: &ObjectId) -> bool {
        self.user_id == *user_id
    }

    pub fn is_paid(&self) -> bool {
        self.price_cents > 0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CampaignView {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub description: String,
    pub game_system: String,
    pub frequency: Option<String>,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub max_players: u32,
    pub require_approval: bool,
    pub price_cents: i64,
    pub pending_players: Vec<String>,
    pub signed_up_players: Vec<String>,
    pub waitlist: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl From<Campaign> for CampaignView {
    fn from(campaign: Campaign) -> Self {
        CampaignView {
            id: campaign.id.map(|id| id.to_hex()).unwrap_or_default(),
            host_id: campaign.user_id.to_hex(),
            title: campaign.title,
            description: campaign.description,
            game_system: campaign.game_system,
            frequency: campaign.frequency,
            location: campaign.location,
            coordinates: campaign.coordinates,
            max_players: campaign.max_players,
            require_approval: campaign.require_approval,
            price_cents: campaign.price_cents,
            pending_players: campaign.roster.pending_players,
            signed_up_players: campaign.roster.signed_up_players,
            waitlist: campaign.roster.waitlist,
            distance_miles: None,
        }
    }
}
