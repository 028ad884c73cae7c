use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagTarget {
    User,
    Game,
    Campaign,
    Listing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagStatus {
    Open,
    Dismissed,
    Resolved,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Flag {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reporter_id: ObjectId,
    pub target_kind: FlagTarget,
    pub target_id: String,
    pub reason: String,
    pub status: FlagStatus,
    pub created_at: DateTime,
    #[serde(default)]
    pub resolved_at: Option<DateTime>,
    #[serde(default)]
    pub resolved_by: Option<ObjectId>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FlagView {
    pub id: String,
    pub reporter_id: String,
    pub target_kind: FlagTarget,
    pub target_id: String,
    pub reason: String,
    pub status: FlagStatus,
    pub created_at: String,
}

impl From<Flag> for FlagView {
    fn from(flag: Flag) -> Self {
        FlagView {
            id: flag.id.map(|id| id.to_hex()).unwrap_or_default(),
            reporter_id: flag.reporter_id.to_hex(),
            target_kind: flag.target_kind,
            target_id: flag.target_id,
            reason: flag.reason,
            status: flag.status,
            created_at: flag.created_at.to_chrono().to_rfc3339(),
        }
    }
}
