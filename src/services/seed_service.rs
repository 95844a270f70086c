use chrono::NaiveDate;
use mongodb::{
    bson::{doc, Bson, DateTime, Document},
    Collection, Database,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::db::collections;
use crate::error::AdminError;
use crate::models::{
    bookings::{Booking, ContactInfo},
    destination::Destination,
    favorite::Favorite,
    midnight,
    review::Review,
    user::User,
};

pub const SAMPLE_DATASET: &str = include_str!("../../data/seed/sample.json");
pub const WORLD_DATASET: &str = include_str!("../../data/seed/world.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinDataset {
    /// Five destinations and one sample user.
    Sample,
    /// The full world catalog with users, bookings, reviews and favorites.
    World,
}

impl BuiltinDataset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sample" => Some(BuiltinDataset::Sample),
            "world" => Some(BuiltinDataset::World),
            _ => None,
        }
    }

    pub fn load(self) -> Result<SeedDataset, AdminError> {
        match self {
            BuiltinDataset::Sample => SeedDataset::from_json(SAMPLE_DATASET),
            BuiltinDataset::World => SeedDataset::from_json(WORLD_DATASET),
        }
    }
}

/// How records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Plain inserts. Rerunning duplicates destinations and fails on the
    /// first user whose email already exists.
    Insert,
    /// Insert or update keyed by each collection's natural key, so reruns
    /// leave the data set unchanged. `createdAt` is kept from the first run.
    Upsert,
}

// Linked records point at users and destinations by their position in the dataset.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedBooking {
    pub user: usize,
    pub destination: usize,
    pub status: String,
    pub booking_date: NaiveDate,
    pub travel_date: Option<NaiveDate>,
    pub number_of_travelers: Option<u32>,
    pub total_price: Option<i64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub contact_info: Option<ContactInfo>,
    #[serde(default)]
    pub special_requests: Vec<String>,
    pub created_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReview {
    pub user: usize,
    pub destination: usize,
    pub rating: u8,
    pub comment: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedFavorite {
    pub user: usize,
    pub destination: usize,
    pub created_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedDataset {
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub bookings: Vec<SeedBooking>,
    #[serde(default)]
    pub reviews: Vec<SeedReview>,
    #[serde(default)]
    pub favorites: Vec<SeedFavorite>,
}

impl SeedDataset {
    pub fn from_json(source: &str) -> Result<Self, AdminError> {
        let dataset: SeedDataset =
            serde_json::from_str(source).map_err(|e| AdminError::SeedFormat(e.to_string()))?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_path(path: &Path) -> Result<Self, AdminError> {
        let source = std::fs::read_to_string(path).map_err(|source| AdminError::SeedFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source)
    }

    /// Checks the dataset before anything is written.
    pub fn validate(&self) -> Result<(), AdminError> {
        for (i, destination) in self.destinations.iter().enumerate() {
            if destination.name.trim().is_empty() {
                return Err(invalid(format!("destination #{} has no name", i)));
            }
            if !(0.0..=5.0).contains(&destination.rating) {
                return Err(invalid(format!(
                    "destination '{}' has rating {} outside 0-5",
                    destination.name, destination.rating
                )));
            }
            if destination.price <= 0 {
                return Err(invalid(format!(
                    "destination '{}' must have a positive price",
                    destination.name
                )));
            }
        }

        let mut emails = HashSet::new();
        for user in &self.users {
            let email = user.email.trim().to_lowercase();
            if email.is_empty() {
                return Err(invalid("user without email".to_string()));
            }
            if !emails.insert(email) {
                return Err(invalid(format!("email '{}' appears twice", user.email)));
            }
        }

        for booking in &self.bookings {
            self.check_link("booking", booking.user, booking.destination)?;
        }

        let mut reviewed = HashSet::new();
        for review in &self.reviews {
            self.check_link("review", review.user, review.destination)?;
            if !(1..=5).contains(&review.rating) {
                return Err(invalid(format!("review rating {} outside 1-5", review.rating)));
            }
            if !reviewed.insert((review.user, review.destination)) {
                return Err(invalid(format!(
                    "user #{} reviews destination #{} twice",
                    review.user, review.destination
                )));
            }
        }

        let mut favorited = HashSet::new();
        for favorite in &self.favorites {
            self.check_link("favorite", favorite.user, favorite.destination)?;
            if !favorited.insert((favorite.user, favorite.destination)) {
                return Err(invalid(format!(
                    "user #{} favorites destination #{} twice",
                    favorite.user, favorite.destination
                )));
            }
        }

        Ok(())
    }

    fn check_link(&self, kind: &str, user: usize, destination: usize) -> Result<(), AdminError> {
        if user >= self.users.len() {
            return Err(invalid(format!(
                "{} refers to user #{} but the dataset has {} users",
                kind,
                user,
                self.users.len()
            )));
        }
        if destination >= self.destinations.len() {
            return Err(invalid(format!(
                "{} refers to destination #{} but the dataset has {} destinations",
                kind,
                destination,
                self.destinations.len()
            )));
        }
        Ok(())
    }

    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for destination in &self.destinations {
            *counts.entry(destination.category.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

fn invalid(message: String) -> AdminError {
    AdminError::SeedFormat(message)
}

/// Fields of an existing user that a reseed leaves alone: live credentials
/// and the lists the app maintains.
pub const SEEDED_USER_INSERT_ONLY: [&str; 3] = ["password", "favorites", "bookings"];

#[derive(Debug, Default)]
pub struct SeedReport {
    pub destinations: usize,
    pub users: usize,
    pub bookings: usize,
    pub reviews: usize,
    pub favorites: usize,
}

/// Writes `records` into `collection` and returns their `_id`s in input order.
///
/// For `LoadStrategy::Upsert`, `natural_key` names the fields that identify a
/// record and `insert_only` the fields written only when the record is new.
/// `createdAt` is always insert-only.
pub async fn load_records<T: Serialize>(
    collection: &Collection<Document>,
    records: &[T],
    strategy: LoadStrategy,
    natural_key: &[&str],
    insert_only: &[&str],
) -> Result<Vec<Bson>, AdminError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let mut documents = Vec::with_capacity(records.len());
    for record in records {
        documents.push(bson::to_document(record)?);
    }

    match strategy {
        LoadStrategy::Insert => {
            let result = collection
                .insert_many(documents)
                .await
                .map_err(|e| AdminError::from_write(collection.name(), e))?;

            (0..records.len())
                .map(|i| {
                    result.inserted_ids.get(&i).cloned().ok_or_else(|| {
                        AdminError::SeedFormat(format!("no id returned for record #{}", i))
                    })
                })
                .collect()
        }
        LoadStrategy::Upsert => {
            let mut ids = Vec::with_capacity(documents.len());
            for document in documents {
                ids.push(upsert_document(collection, document, natural_key, insert_only).await?);
            }
            Ok(ids)
        }
    }
}

async fn upsert_document(
    collection: &Collection<Document>,
    document: Document,
    natural_key: &[&str],
    insert_only: &[&str],
) -> Result<Bson, AdminError> {
    let mut filter = Document::new();
    for field in natural_key {
        let value = document.get(*field).cloned().ok_or_else(|| {
            AdminError::SeedFormat(format!(
                "record for '{}' has no '{}' field",
                collection.name(),
                field
            ))
        })?;
        filter.insert(*field, value);
    }

    let result = collection
        .update_one(filter.clone(), upsert_update(document, insert_only))
        .upsert(true)
        .await
        .map_err(|e| AdminError::from_write(collection.name(), e))?;

    if let Some(id) = result.upserted_id {
        return Ok(id);
    }

    collection
        .find_one(filter)
        .projection(doc! { "_id": 1 })
        .await?
        .and_then(|found| found.get("_id").cloned())
        .ok_or_else(|| {
            AdminError::SeedFormat(format!(
                "upserted record in '{}' could not be read back",
                collection.name()
            ))
        })
}

/// Splits `document` into `$set` and `$setOnInsert` halves.
fn upsert_update(mut document: Document, insert_only: &[&str]) -> Document {
    let mut set_on_insert = Document::new();
    for field in std::iter::once("createdAt").chain(insert_only.iter().copied()) {
        if let Some(value) = document.remove(field) {
            set_on_insert.insert(field, value);
        }
    }

    let mut update = doc! { "$set": document };
    if !set_on_insert.is_empty() {
        update.insert("$setOnInsert", set_on_insert);
    }
    update
}

/// Loads a dataset. Destinations and users go first so that bookings,
/// reviews and favorites can reference their ids.
pub async fn seed(
    db: &Database,
    dataset: &SeedDataset,
    strategy: LoadStrategy,
) -> Result<SeedReport, AdminError> {
    dataset.validate()?;
    let now = DateTime::now();

    let destinations: Vec<Destination> = dataset
        .destinations
        .iter()
        .cloned()
        .map(|mut destination| {
            destination.id = None;
            destination.created_at = Some(now);
            destination.updated_at = Some(now);
            destination
        })
        .collect();
    let destination_ids = load_records(
        &db.collection(collections::DESTINATIONS),
        &destinations,
        strategy,
        &["name"],
        &[],
    )
    .await?;
    let destination_ids: Vec<String> = destination_ids.iter().map(id_string).collect();
    println!("Loaded {} destinations", destination_ids.len());

    let users: Vec<User> = dataset
        .users
        .iter()
        .cloned()
        .map(|mut user| {
            user.id = None;
            user.created_at = Some(now);
            user.updated_at = Some(now);
            user
        })
        .collect();
    let user_ids = load_records(
        &db.collection(collections::USERS),
        &users,
        strategy,
        &["email"],
        &SEEDED_USER_INSERT_ONLY,
    )
    .await?;
    let user_ids: Vec<String> = user_ids.iter().map(id_string).collect();
    println!("Loaded {} users", user_ids.len());

    let bookings: Vec<Booking> = dataset
        .bookings
        .iter()
        .map(|b| {
            let created_at = b.created_at.map(midnight).unwrap_or(now);
            Booking {
                id: None,
                user_id: user_ids[b.user].clone(),
                destination_id: Some(destination_ids[b.destination].clone()),
                status: b.status.clone(),
                booking_date: Some(midnight(b.booking_date)),
                travel_date: b.travel_date.map(midnight),
                number_of_travelers: b.number_of_travelers,
                total_price: b.total_price,
                payment_method: b.payment_method.clone(),
                payment_status: b.payment_status.clone(),
                contact_info: b.contact_info.clone(),
                special_requests: b.special_requests.clone(),
                created_at: Some(created_at),
                updated_at: Some(created_at),
            }
        })
        .collect();
    let booking_count = load_records(
        &db.collection(collections::BOOKINGS),
        &bookings,
        strategy,
        &["userId", "destinationId", "bookingDate"],
        &[],
    )
    .await?
    .len();
    if booking_count > 0 {
        println!("Loaded {} bookings", booking_count);
    }

    let reviews: Vec<Review> = dataset
        .reviews
        .iter()
        .map(|r| {
            let author = &dataset.users[r.user];
            let created_at = r.created_at.map(midnight).unwrap_or(now);
            Review {
                id: None,
                user_id: user_ids[r.user].clone(),
                destination_id: destination_ids[r.destination].clone(),
                user_name: Some(author.full_name.clone()),
                user_avatar: author.avatar.clone(),
                rating: r.rating,
                comment: r.comment.clone(),
                images: r.images.clone(),
                created_at: Some(created_at),
                updated_at: Some(created_at),
            }
        })
        .collect();
    let review_count = load_records(
        &db.collection(collections::REVIEWS),
        &reviews,
        strategy,
        &["userId", "destinationId"],
        &[],
    )
    .await?
    .len();
    if review_count > 0 {
        println!("Loaded {} reviews", review_count);
    }

    let favorites: Vec<Favorite> = dataset
        .favorites
        .iter()
        .map(|f| Favorite {
            id: None,
            user_id: user_ids[f.user].clone(),
            destination_id: destination_ids[f.destination].clone(),
            created_at: Some(f.created_at.map(midnight).unwrap_or(now)),
        })
        .collect();
    let favorite_count = load_records(
        &db.collection(collections::FAVORITES),
        &favorites,
        strategy,
        &["userId", "destinationId"],
        &[],
    )
    .await?
    .len();
    if favorite_count > 0 {
        println!("Loaded {} favorites", favorite_count);
    }

    Ok(SeedReport {
        destinations: destination_ids.len(),
        users: user_ids.len(),
        bookings: booking_count,
        reviews: review_count,
        favorites: favorite_count,
    })
}

/// String form used for cross-collection references.
pub fn id_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
