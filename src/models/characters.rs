use mongodb::bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Character {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub name: String,
    pub game_system: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Free-form sheet fields; shape varies by game system.
    #[serde(default)]
    pub sheet: Document,
    #[serde(default)]
    pub portrait_url: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_level() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CharacterView {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub game_system: String,
    pub class: Option<String>,
    pub level: u32,
    pub sheet: Document,
    pub portrait_url: Option<String>,
}

impl From<Character> for CharacterView {
    fn from(character: Character) -> Self {
        CharacterView {
            id: character.id.map(|id| id.to_hex()).unwrap_or_default(),
            owner_id: character.user_id.to_hex(),
            name: character.name,
            game_system: character.game_system,
            class: character.class,
            level: character.level,
            sheet: character.sheet,
            portrait_url: character.portrait_url,
        }
    }
}
