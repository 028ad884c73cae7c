use serde::Deserialize;

pub mod auth;
pub mod campaigns;
pub mod characters;
pub mod flags;
pub mod games;
pub mod listings;
pub mod messages;
pub mod payments;
pub mod users;
pub mod vendors;

/// Query string shared by every distance-search endpoint.
#[derive(Debug, Deserialize)]
pub struct GeoQuery {
    /// Zip or city string, geocoded per request.
    pub near: Option<String>,
    /// Radius in miles; each endpoint has its own default.
    pub radius: Option<f64>,
}
