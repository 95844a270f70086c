use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::location::Location;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub country: String,
    pub description: String,
    pub short_description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub rating: f64,
    pub review_count: u32,
    // Smallest currency unit (VND)
    pub price: i64,
    pub duration: String,
    pub category: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub popular: bool,
    pub location: Location,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}
