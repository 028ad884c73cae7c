use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vendor {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    pub location: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VendorView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl From<Vendor> for VendorView {
    fn from(vendor: Vendor) -> Self {
        VendorView {
            id: vendor.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: vendor.name,
            description: vendor.description,
            website: vendor.website,
            location: vendor.location,
            distance_miles: None,
        }
    }
}
