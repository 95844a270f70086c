use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Database,
};

use crate::db::collections;
use crate::error::AdminError;
use crate::models::bookings::DUMMY_USER_ID;

/// Value the legacy migration script shipped with, meant to be hand-edited.
pub const PLACEHOLDER_USER_ID: &str = "YOUR_USER_ID_HERE";

/// A user id that has been checked to be present and not a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealUserId(String);

impl RealUserId {
    pub fn parse(raw: Option<&str>) -> Result<Self, AdminError> {
        let value = match raw.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => return Err(AdminError::MissingUserId),
        };

        if value == PLACEHOLDER_USER_ID {
            return Err(AdminError::PlaceholderUserId(value.to_string()));
        }
        if value == DUMMY_USER_ID {
            return Err(AdminError::SentinelUserId);
        }

        Ok(RealUserId(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RealUserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapReport {
    pub matched: u64,
    pub modified: u64,
    /// Bookings owned by the new user once the update has run.
    pub now_owned: u64,
}

/// Bookings still owned by the placeholder user.
pub async fn count_dummy_bookings(db: &Database) -> Result<u64, AdminError> {
    let bookings = db.collection::<Document>(collections::BOOKINGS);
    Ok(bookings
        .count_documents(doc! { "userId": DUMMY_USER_ID })
        .await?)
}

/// Accepts either an ObjectId in hex form or a plain string `_id`.
pub async fn user_exists(db: &Database, user_id: &RealUserId) -> Result<bool, AdminError> {
    let users = db.collection::<Document>(collections::USERS);

    let filter = match ObjectId::parse_str(user_id.as_str()) {
        Ok(oid) => doc! { "_id": { "$in": [oid, user_id.as_str()] } },
        Err(_) => doc! { "_id": user_id.as_str() },
    };

    Ok(users.count_documents(filter).limit(1).await? > 0)
}

/// Moves every placeholder-owned booking to `user_id`. Bookings that already
/// belong to someone else are not touched.
pub async fn remap_dummy_bookings(
    db: &Database,
    user_id: &RealUserId,
) -> Result<RemapReport, AdminError> {
    let bookings = db.collection::<Document>(collections::BOOKINGS);

    let result = bookings
        .update_many(
            doc! { "userId": DUMMY_USER_ID },
            doc! { "$set": { "userId": user_id.as_str() } },
        )
        .await?;

    log::info!(
        "Remapped bookings from '{}' to '{}': matched {}, modified {}",
        DUMMY_USER_ID,
        user_id,
        result.matched_count,
        result.modified_count
    );

    let now_owned = bookings
        .count_documents(doc! { "userId": user_id.as_str() })
        .await?;

    Ok(RemapReport {
        matched: result.matched_count,
        modified: result.modified_count,
        now_owned,
    })
}
