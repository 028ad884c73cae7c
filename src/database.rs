use mongodb::{Client, Collection, Database};

use crate::models::{
    campaigns::Campaign, characters::Character, flags::Flag, games::GameSession,
    listings::Listing, messages::Message, users::User, vendors::Vendor,
};

pub async fn connect(uri: &str, database: &str) -> Result<Database, mongodb::error::Error> {
    let client = Client::with_uri_str(uri).await?;
    Ok(client.database(database))
}

pub fn users(db: &Database) -> Collection<User> {
    db.collection("users")
}

pub fn games(db: &Database) -> Collection<GameSession> {
    db.collection("games")
}

pub fn campaigns(db: &Database) -> Collection<Campaign> {
    db.collection("campaigns")
}

pub fn characters(db: &Database) -> Collection<Character> {
    db.collection("characters")
}

pub fn messages(db: &Database) -> Collection<Message> {
    db.collection("messages")
}

pub fn listings(db: &Database) -> Collection<Listing> {
    db.collection("listings")
}

pub fn vendors(db: &Database) -> Collection<Vendor> {
    db.collection("vendors")
}

pub fn flags(db: &Database) -> Collection<Flag> {
    db.collection("flags")
}
