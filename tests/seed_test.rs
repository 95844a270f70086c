mod common;

use mongodb::bson::{doc, oid::ObjectId};
use serial_test::serial;

use common::TestDb;
use travelling_db_admin::db::collections;
use travelling_db_admin::services::schema_service;
use travelling_db_admin::services::seed_service::{self, BuiltinDataset, LoadStrategy};
use travelling_db_admin::AdminError;

#[tokio::test]
#[serial]
async fn test_sample_seed_on_empty_database() {
    let Some(test_db) = TestDb::try_new("seed").await else {
        return;
    };
    schema_service::provision(&test_db.db).await.unwrap();

    let dataset = BuiltinDataset::Sample.load().unwrap();
    let report = seed_service::seed(&test_db.db, &dataset, LoadStrategy::Insert)
        .await
        .unwrap();

    assert_eq!(report.destinations, 5);
    assert_eq!(report.users, 1);
    assert_eq!(test_db.count_all(collections::DESTINATIONS).await, 5);
    assert_eq!(test_db.count_all(collections::USERS).await, 1);
    assert_eq!(
        test_db
            .count(collections::DESTINATIONS, doc! { "category": "Beach" })
            .await,
        2
    );

    let paris = test_db
        .collection(collections::DESTINATIONS)
        .find_one(doc! { "name": "Paris, France" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paris.get_document("location").unwrap().get_str("city").unwrap(), "Paris");
    assert!(paris.get_datetime("createdAt").is_ok());

    test_db.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_insert_rerun_duplicates_destinations_and_fails_on_user() {
    let Some(test_db) = TestDb::try_new("reseed").await else {
        return;
    };
    schema_service::provision(&test_db.db).await.unwrap();
    let dataset = BuiltinDataset::Sample.load().unwrap();

    seed_service::seed(&test_db.db, &dataset, LoadStrategy::Insert)
        .await
        .unwrap();
    let err = seed_service::seed(&test_db.db, &dataset, LoadStrategy::Insert)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::DuplicateKey { ref collection, .. } if collection == "users"));
    assert_eq!(test_db.count_all(collections::DESTINATIONS).await, 10);
    assert_eq!(test_db.count_all(collections::USERS).await, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_upsert_rerun_is_idempotent() {
    let Some(test_db) = TestDb::try_new("upsert").await else {
        return;
    };
    schema_service::provision(&test_db.db).await.unwrap();
    let dataset = BuiltinDataset::World.load().unwrap();

    seed_service::seed(&test_db.db, &dataset, LoadStrategy::Upsert)
        .await
        .unwrap();
    let first_created = test_db
        .collection(collections::DESTINATIONS)
        .find_one(doc! { "name": "Rome, Italy" })
        .await
        .unwrap()
        .unwrap()
        .get_datetime("createdAt")
        .unwrap()
        .clone();

    seed_service::seed(&test_db.db, &dataset, LoadStrategy::Upsert)
        .await
        .unwrap();

    assert_eq!(test_db.count_all(collections::DESTINATIONS).await, 29);
    assert_eq!(test_db.count_all(collections::USERS).await, 3);
    assert_eq!(test_db.count_all(collections::BOOKINGS).await, 2);
    assert_eq!(test_db.count_all(collections::REVIEWS).await, 3);
    assert_eq!(test_db.count_all(collections::FAVORITES).await, 5);

    let rome = test_db
        .collection(collections::DESTINATIONS)
        .find_one(doc! { "name": "Rome, Italy" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rome.get_datetime("createdAt").unwrap(), &first_created);

    test_db.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_world_links_reference_inserted_documents() {
    let Some(test_db) = TestDb::try_new("world").await else {
        return;
    };
    schema_service::provision(&test_db.db).await.unwrap();
    let dataset = BuiltinDataset::World.load().unwrap();

    seed_service::seed(&test_db.db, &dataset, LoadStrategy::Insert)
        .await
        .unwrap();

    let user = test_db
        .collection(collections::USERS)
        .find_one(doc! { "email": "user1@example.com" })
        .await
        .unwrap()
        .unwrap();
    let user_id = user.get_object_id("_id").unwrap().to_hex();

    // user1 favorites Paris, Tokyo and Phuket
    assert_eq!(
        test_db
            .count(collections::FAVORITES, doc! { "userId": user_id.as_str() })
            .await,
        3
    );

    let booking = test_db
        .collection(collections::BOOKINGS)
        .find_one(doc! { "userId": user_id.as_str() })
        .await
        .unwrap()
        .unwrap();
    let destination_id = ObjectId::parse_str(booking.get_str("destinationId").unwrap()).unwrap();
    let destination = test_db
        .collection(collections::DESTINATIONS)
        .find_one(doc! { "_id": destination_id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(destination.get_str("name").unwrap(), "Paris, France");
    assert_eq!(booking.get_str("status").unwrap(), "CONFIRMED");

    let review = test_db
        .collection(collections::REVIEWS)
        .find_one(doc! { "userId": user_id.as_str(), "rating": 4 })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(review.get_str("userName").unwrap(), "Nguyễn Văn A");

    test_db.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_upsert_reseed_keeps_live_user_state() {
    let Some(test_db) = TestDb::try_new("reseedlive").await else {
        return;
    };
    schema_service::provision(&test_db.db).await.unwrap();
    let dataset = BuiltinDataset::Sample.load().unwrap();
    let users = test_db.collection(collections::USERS);

    seed_service::seed(&test_db.db, &dataset, LoadStrategy::Upsert)
        .await
        .unwrap();
    users
        .update_one(
            doc! { "email": "test@example.com" },
            doc! { "$set": {
                "password": "$2b$12$changedByTheBackend",
                "favorites": ["6710f3c2a9b1e2d3c4b5a697"],
            } },
        )
        .await
        .unwrap();

    seed_service::seed(&test_db.db, &dataset, LoadStrategy::Upsert)
        .await
        .unwrap();

    let user = users
        .find_one(doc! { "email": "test@example.com" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.get_str("password").unwrap(), "$2b$12$changedByTheBackend");
    assert_eq!(user.get_array("favorites").unwrap().len(), 1);
    assert!(user.get_datetime("dateOfBirth").is_ok());

    test_db.cleanup().await;
}
