// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set); otherwise they are skipped.

use yourverse::db::{FirestoreDb, ProfileStore};
use yourverse::models::ProfileUpdate;

mod common;
use common::test_db;

/// Generate a unique uid for test isolation.
fn unique_uid() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-uid-{nanos}")
}

#[tokio::test]
async fn test_missing_profile_is_none() {
    require_emulator!();

    let db = test_db().await;
    let profile = db.get_profile(&unique_uid()).await.unwrap();
    assert!(profile.is_none());
}

#[tokio::test]
async fn test_merge_keeps_absent_fields() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid();

    let first = ProfileUpdate {
        age: Some("36".to_string()),
        hobbies: Some("poetry".to_string()),
        skills: Some(String::new()),
        photo_url: Some("https://cdn.test/me.png".to_string()),
        voice_url: None,
    };
    db.merge_profile(&uid, &first).await.unwrap();

    // Voice-only save: the photo URL must survive
    let second = ProfileUpdate {
        age: Some("37".to_string()),
        hobbies: Some("poetry".to_string()),
        skills: Some("math".to_string()),
        photo_url: None,
        voice_url: Some("https://cdn.test/intro.webm".to_string()),
    };
    db.merge_profile(&uid, &second).await.unwrap();

    let record = db.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(record.age, "37");
    assert_eq!(record.skills, "math");
    assert_eq!(record.photo_url.as_deref(), Some("https://cdn.test/me.png"));
    assert_eq!(
        record.voice_url.as_deref(),
        Some("https://cdn.test/intro.webm")
    );
}

#[tokio::test]
async fn test_delete_profile() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid();

    let update = ProfileUpdate {
        age: Some("20".to_string()),
        ..Default::default()
    };
    db.merge_profile(&uid, &update).await.unwrap();
    assert!(db.get_profile(&uid).await.unwrap().is_some());

    db.delete_profile(&uid).await.unwrap();
    assert!(db.get_profile(&uid).await.unwrap().is_none());

    // Deleting again is not an error
    db.delete_profile(&uid).await.unwrap();
}

#[tokio::test]
async fn test_offline_client_reports_database_error() {
    let db = FirestoreDb::new_mock();
    let err = db.get_profile("anyone").await.unwrap_err();
    assert!(err.to_string().contains("offline"));
}
