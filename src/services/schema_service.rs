use mongodb::{
    bson::Document,
    options::IndexOptions,
    Database, IndexModel,
};

use crate::db::collections;
use crate::error::{is_namespace_exists, AdminError};
use crate::services::DestructiveConfirmation;

/// One index the application relies on. Keys are ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub fields: &'static [&'static str],
    pub unique: bool,
}

impl IndexSpec {
    pub fn keys(&self) -> Document {
        let mut keys = Document::new();
        for field in self.fields {
            keys.insert(*field, 1);
        }
        keys
    }

    /// Name the server assigns when none is given, e.g. `userId_1_destinationId_1`.
    pub fn default_name(&self) -> String {
        self.fields
            .iter()
            .map(|field| format!("{}_1", field))
            .collect::<Vec<_>>()
            .join("_")
    }

    fn model(&self) -> IndexModel {
        let options = self
            .unique
            .then(|| IndexOptions::builder().unique(true).build());

        IndexModel::builder()
            .keys(self.keys())
            .options(options)
            .build()
    }
}

const fn index(
    collection: &'static str,
    fields: &'static [&'static str],
    unique: bool,
) -> IndexSpec {
    IndexSpec {
        collection,
        fields,
        unique,
    }
}

const INDEX_PLAN: &[IndexSpec] = &[
    // Catalog filtering and sorting
    index(collections::DESTINATIONS, &["name"], false),
    index(collections::DESTINATIONS, &["category"], false),
    index(collections::DESTINATIONS, &["country"], false),
    index(collections::DESTINATIONS, &["featured"], false),
    index(collections::DESTINATIONS, &["popular"], false),
    index(collections::DESTINATIONS, &["rating"], false),
    index(collections::DESTINATIONS, &["price"], false),
    index(collections::USERS, &["email"], true),
    index(collections::BOOKINGS, &["userId"], false),
    index(collections::BOOKINGS, &["status"], false),
    index(collections::BOOKINGS, &["bookingDate"], false),
    index(collections::REVIEWS, &["destinationId"], false),
    index(collections::REVIEWS, &["userId"], false),
    index(collections::REVIEWS, &["userId", "destinationId"], true),
    index(collections::FAVORITES, &["userId"], false),
    index(collections::FAVORITES, &["userId", "destinationId"], true),
];

pub fn index_plan() -> &'static [IndexSpec] {
    INDEX_PLAN
}

#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub created_collections: Vec<String>,
    pub existing_collections: Vec<String>,
    pub indexes_ensured: usize,
}

/// Makes sure every collection and index exists. Safe to run repeatedly;
/// a run interrupted halfway is completed by the next one.
pub async fn provision(db: &Database) -> Result<ProvisionReport, AdminError> {
    let mut report = ProvisionReport::default();

    let existing = db.list_collection_names().await?;

    for name in collections::ALL {
        if existing.iter().any(|c| c == name) {
            report.existing_collections.push(name.to_string());
            continue;
        }

        match db.create_collection(name).await {
            Ok(()) => {
                log::info!("Created collection '{}'", name);
                report.created_collections.push(name.to_string());
            }
            Err(e) if is_namespace_exists(&e) => {
                log::debug!("Collection '{}' appeared while provisioning", name);
                report.existing_collections.push(name.to_string());
            }
            Err(e) => return Err(AdminError::Database(e)),
        }
    }

    for spec in INDEX_PLAN {
        db.collection::<Document>(spec.collection)
            .create_index(spec.model())
            .await
            .map_err(|e| AdminError::from_write(spec.collection, e))?;

        log::debug!(
            "Ensured index {} on '{}'{}",
            spec.default_name(),
            spec.collection,
            if spec.unique { " (unique)" } else { "" }
        );
        report.indexes_ensured += 1;
    }

    Ok(report)
}

/// Drops all application collections, indexes included.
pub async fn reset(db: &Database, _confirmation: &DestructiveConfirmation) -> Result<(), AdminError> {
    for name in collections::ALL {
        log::warn!("Dropping collection '{}' in '{}'", name, db.name());
        db.collection::<Document>(name).drop().await?;
    }
    Ok(())
}
