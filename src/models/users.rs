use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::Player
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub owned_games: Vec<String>,
    #[serde(default)]
    pub favorite_games: Vec<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub ambassador_until: Option<DateTime>,
    #[serde(default)]
    pub stripe_account_id: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    /// Ambassadors are exempt from the platform fee until their expiration.
    pub fn is_ambassador(&self, now: DateTime) -> bool {
        self.ambassador_until.map(|until| until > now).unwrap_or(false)
    }
}

/// Favorites must be a subset of owned games; anything else is dropped on save.
pub fn sanitize_favorites(owned_games: &[String], favorites: Vec<String>) -> Vec<String> {
    favorites
        .into_iter()
        .filter(|title| owned_games.contains(title))
        .collect()
}

/// Public profile as other users see it. No email, no payment identifiers.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub owned_games: Vec<String>,
    pub favorite_games: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

/// The caller's own profile.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProfileView {
    pub id: String,
    pub email: String,
    pub username: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub owned_games: Vec<String>,
    pub favorite_games: Vec<String>,
    pub role: Role,
    pub ambassador_until: Option<String>,
    pub payouts_connected: bool,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username,
            bio: user.bio,
            location: user.location,
            coordinates: user.coordinates,
            owned_games: user.owned_games,
            favorite_games: user.favorite_games,
            distance_miles: None,
        }
    }
}

impl From<User> for ProfileView {
    fn from(user: User) -> Self {
        ProfileView {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email,
            username: user.username,
            bio: user.bio,
            location: user.location,
            owned_games: user.owned_games,
            favorite_games: user.favorite_games,
            role: user.role,
            ambassador_until: user
                .ambassador_until
                .map(|t| t.to_chrono().to_rfc3339()),
            payouts_connected: user.stripe_account_id.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorites_subset_of_owned() {
        let owned = vec!["Gloomhaven".to_string(), "Catan".to_string()];
        let favorites = vec![
            "Catan".to_string(),
            "Root".to_string(),
            "Gloomhaven".to_string(),
        ];

        let sanitized = sanitize_favorites(&owned, favorites);
        assert_eq!(sanitized, vec!["Catan", "Gloomhaven"]);
    }

    #[test]
    fn test_ambassador_expiry() {
        let mut user = User {
            id: Some(ObjectId::new()),
            email: "gm@example.com".to_string(),
            password_hash: "hash".to_string(),
            username: "gm".to_string(),
            bio: None,
            location: None,
            coordinates: None,
            owned_games: vec![],
            favorite_games: vec![],
            role: Role::Player,
            ambassador_until: None,
            stripe_account_id: None,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        };
        let now = DateTime::now();

        assert!(!user.is_ambassador(now), "no expiry set means not an ambassador");

        user.ambassador_until = Some(DateTime::from_millis(now.timestamp_millis() + 86_400_000));
        assert!(user.is_ambassador(now), "future expiry means ambassador");

        user.ambassador_until = Some(DateTime::from_millis(now.timestamp_millis() - 1));
        assert!(!user.is_ambassador(now), "past expiry means exemption lapsed");
    }

    #[test]
    fn test_profile_view_formats_ambassador_expiry() {
        let until = DateTime::from_millis(1_924_992_000_000); // 2031-01-01T00:00:00Z
        let user = User {
            id: Some(ObjectId::new()),
            email: "gm@example.com".to_string(),
            password_hash: "hash".to_string(),
            username: "gm".to_string(),
            bio: None,
            location: None,
            coordinates: None,
            owned_games: vec![],
            favorite_games: vec![],
            role: Role::Player,
            ambassador_until: Some(until),
            stripe_account_id: None,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        };

        let view = ProfileView::from(user);
        let rendered = view.ambassador_until.expect("expiry should be rendered");
        assert_eq!(rendered, until.to_chrono().to_rfc3339());
        assert!(rendered.starts_with("2031-01-01T00:00:00"), "got {}", rendered);
    }

    #[test]
    fn test_public_view_hides_private_fields() {
        let user = User {
            id: Some(ObjectId::new()),
            email: "secret@example.com".to_string(),
            password_hash: "hash".to_string(),
            username: "gm".to_string(),
            bio: None,
            location: None,
            coordinates: None,
            owned_games: vec![],
            favorite_games: vec![],
            role: Role::Player,
            ambassador_until: None,
            stripe_account_id: Some("acct_123".to_string()),
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        };

        let json = serde_json::to_string(&UserView::from(user)).unwrap();
        assert!(!json.contains("secret@example.com"));
        assert!(!json.contains("acct_123"));
        assert!(!json.contains("hash"));
    }
}
