use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Owner placeholder left on bookings created by early seed and test data.
pub const DUMMY_USER_ID: &str = "dummy-user-id";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,
    pub status: String, // PENDING, CONFIRMED, CANCELLED, COMPLETED
    pub booking_date: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_date: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_travelers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>, // PENDING, PAID, FAILED, REFUNDED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default)]
    pub special_requests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}
