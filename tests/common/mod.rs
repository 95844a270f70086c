#![allow(dead_code)]

use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::{Collection, Database};
use std::time::Duration;

use travelling_db_admin::db::mongo;
use travelling_db_admin::AdminConfig;

/// Set to `1` to skip server-backed tests on machines without MongoDB.
pub const SKIP_ENV: &str = "TRAVELLING_SKIP_MONGO_TESTS";

/// A throwaway database on the server named by `MONGODB_URI`.
pub struct TestDb {
    pub db: Database,
}

impl TestDb {
    /// Connects to a fresh database. Returns `None` only when the skip
    /// variable is set; otherwise an unreachable server fails the test.
    pub async fn try_new(label: &str) -> Option<Self> {
        if skip_requested(std::env::var(SKIP_ENV).ok().as_deref()) {
            eprintln!("Skipping {}: {} is set", label, SKIP_ENV);
            return None;
        }

        let mut config = AdminConfig::from_env().expect("invalid MongoDB test configuration");
        config.timeout = Duration::from_secs(2);
        config.database = format!("travelling_test_{}_{}", label, ObjectId::new().to_hex());

        match mongo::connect(&config).await {
            Ok(db) => Some(Self { db }),
            Err(e) => panic!(
                "MongoDB unavailable for {} ({}). Start a server or set {}=1 to skip.",
                label, e, SKIP_ENV
            ),
        }
    }

    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }

    pub async fn count(&self, name: &str, filter: Document) -> u64 {
        self.collection(name).count_documents(filter).await.unwrap()
    }

    pub async fn count_all(&self, name: &str) -> u64 {
        self.count(name, doc! {}).await
    }

    pub async fn cleanup(self) {
        let _ = self.db.drop().await;
    }
}

pub fn test_user(email: &str) -> Document {
    doc! {
        "email": email,
        "password": "testpassword123",
        "fullName": "Test Traveller",
        "role": "USER",
    }
}

pub fn skip_requested(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}
