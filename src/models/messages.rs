use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// None for system notifications (roster changes and the like).
    #[serde(default)]
    pub sender_id: Option<ObjectId>,
    pub recipient_id: ObjectId,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageView {
    pub id: String,
    pub sender_id: Option<String>,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub created_at: String,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        MessageView {
            id: message.id.map(|id| id.to_hex()).unwrap_or_default(),
            sender_id: message.sender_id.map(|id| id.to_hex()),
            subject: message.subject,
            body: message.body,
            read: message.read,
            created_at: message.created_at.to_chrono().to_rfc3339(),
        }
    }
}
