use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::roster::Roster;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GameSession {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Host who created the session and controls its roster.
    pub user_id: ObjectId,
    pub title: String,
    pub description: String,
    pub game_system: String,
    pub scheduled_for: DateTime,
    pub location: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub max_players: u32,
    #[serde(default)]
    pub require_approval: bool,
    #[serde(flatten)]
    pub roster: Roster,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl GameSession {
    pub fn is_hosted_by(&self, user_id: &ObjectId) -> bool {
        self.user_id == *user_id
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GameSessionView {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub description: String,
    pub game_system: String,
    pub scheduled_for: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub max_players: u32,
    pub require_approval: bool,
    pub pending_players: Vec<String>,
    pub signed_up_players: Vec<String>,
    pub waitlist: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl From<GameSession> for GameSessionView {
    fn from(game: GameSession) -> Self {
        GameSessionView {
            id: game.id.map(|id| id.to_hex()).unwrap_or_default(),
            host_id: game.user_id.to_hex(),
            title: game.title,
            description: game.description,
            game_system: game.game_system,
            scheduled_for: game.scheduled_for.to_chrono().to_rfc3339(),
            location: game.location,
            coordinates: game.coordinates,
            max_players: game.max_players,
            require_approval: game.require_approval,
            pending_players: game.roster.pending_players,
            signed_up_players: game.roster.signed_up_players,
            waitlist: game.roster.waitlist,
            distance_miles: None,
        }
    }
}
