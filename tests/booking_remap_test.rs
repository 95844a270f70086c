mod common;

use mongodb::bson::{doc, Document};
use serial_test::serial;

use common::{test_user, TestDb};
use travelling_db_admin::db::collections;
use travelling_db_admin::models::bookings::DUMMY_USER_ID;
use travelling_db_admin::services::booking_service::{self, RealUserId, PLACEHOLDER_USER_ID};
use travelling_db_admin::services::schema_service;
use travelling_db_admin::AdminError;

fn booking(user_id: &str, status: &str) -> Document {
    doc! {
        "userId": user_id,
        "status": status,
        "bookingDate": mongodb::bson::DateTime::now(),
    }
}

async fn seed_bookings(test_db: &TestDb) {
    let bookings = test_db.collection(collections::BOOKINGS);
    bookings
        .insert_many(vec![
            booking(DUMMY_USER_ID, "PENDING"),
            booking(DUMMY_USER_ID, "CONFIRMED"),
            booking(DUMMY_USER_ID, "CANCELLED"),
            booking("U777", "CONFIRMED"),
            booking("U888", "PENDING"),
        ])
        .await
        .unwrap();
}

#[tokio::test]
#[serial]
async fn test_remap_moves_only_dummy_bookings() {
    let Some(test_db) = TestDb::try_new("remap").await else {
        return;
    };
    schema_service::provision(&test_db.db).await.unwrap();
    seed_bookings(&test_db).await;

    let user_id = RealUserId::parse(Some("U123")).unwrap();
    assert_eq!(booking_service::count_dummy_bookings(&test_db.db).await.unwrap(), 3);

    let report = booking_service::remap_dummy_bookings(&test_db.db, &user_id)
        .await
        .unwrap();

    assert_eq!(report.matched, 3);
    assert_eq!(report.modified, 3);
    assert_eq!(report.now_owned, 3);
    assert_eq!(
        test_db.count(collections::BOOKINGS, doc! { "userId": "U123" }).await,
        3
    );
    assert_eq!(
        test_db.count(collections::BOOKINGS, doc! { "userId": DUMMY_USER_ID }).await,
        0
    );
    assert_eq!(
        test_db.count(collections::BOOKINGS, doc! { "userId": "U777" }).await,
        1
    );
    assert_eq!(
        test_db.count(collections::BOOKINGS, doc! { "userId": "U888" }).await,
        1
    );

    // Nothing left to move on a second run, the owned count stays
    let again = booking_service::remap_dummy_bookings(&test_db.db, &user_id)
        .await
        .unwrap();
    assert_eq!(again.modified, 0);
    assert_eq!(again.now_owned, 3);

    test_db.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_owned_count_includes_existing_bookings() {
    let Some(test_db) = TestDb::try_new("remapown").await else {
        return;
    };
    seed_bookings(&test_db).await;

    let user_id = RealUserId::parse(Some("U777")).unwrap();
    let report = booking_service::remap_dummy_bookings(&test_db.db, &user_id)
        .await
        .unwrap();

    assert_eq!(report.modified, 3);
    assert_eq!(report.now_owned, 4);

    test_db.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_placeholder_fails_before_any_write() {
    let Some(test_db) = TestDb::try_new("remapbad").await else {
        return;
    };
    seed_bookings(&test_db).await;

    let before: Vec<Document> = {
        use futures::TryStreamExt;
        test_db
            .collection(collections::BOOKINGS)
            .find(doc! {})
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap()
    };

    let result = RealUserId::parse(Some(PLACEHOLDER_USER_ID));
    assert!(matches!(result, Err(AdminError::PlaceholderUserId(_))));
    let result = RealUserId::parse(None);
    assert!(matches!(result, Err(AdminError::MissingUserId)));

    assert_eq!(
        test_db.count(collections::BOOKINGS, doc! { "userId": DUMMY_USER_ID }).await,
        3
    );
    let after: Vec<Document> = {
        use futures::TryStreamExt;
        test_db
            .collection(collections::BOOKINGS)
            .find(doc! {})
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap()
    };
    assert_eq!(before, after);

    test_db.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_user_exists_accepts_object_id() {
    let Some(test_db) = TestDb::try_new("remapuser").await else {
        return;
    };

    let inserted = test_db
        .collection(collections::USERS)
        .insert_one(test_user("owner@example.com"))
        .await
        .unwrap();
    let hex = inserted.inserted_id.as_object_id().unwrap().to_hex();

    let known = RealUserId::parse(Some(hex.as_str())).unwrap();
    assert!(booking_service::user_exists(&test_db.db, &known).await.unwrap());

    let unknown = RealUserId::parse(Some("U404")).unwrap();
    assert!(!booking_service::user_exists(&test_db.db, &unknown).await.unwrap());

    test_db.cleanup().await;
}
