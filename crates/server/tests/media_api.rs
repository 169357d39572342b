//! Integration tests for the media endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};

const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const TORRENT_HASH: &str = "55af51b9883b2e29e02fc728113747c706e480e3";

#[tokio::test]
async fn test_list_media_excludes_soft_deleted() {
    let fixture = TestFixture::new();
    fixture
        .store
        .insert_media(&fixtures::media_record(HASH_A, "tt0000001"))
        .unwrap();
    fixture
        .store
        .insert_media(&fixtures::media_record(HASH_B, "tt0000002"))
        .unwrap();

    let response = fixture
        .patch_empty(&format!("/media/{}/soft_delete", HASH_A))
        .await;
    assert_status!(response, StatusCode::OK);

    let listing = fixture.get("/media").await;
    assert_status!(listing, StatusCode::OK);
    assert_eq!(listing.body["pagination"]["total"], 1);
    assert_eq!(listing.body["data"][0]["hash"], HASH_B);
}

#[tokio::test]
async fn test_list_media_filters() {
    let fixture = TestFixture::new();
    let mut errored = fixtures::media_record(HASH_A, "tt0000001");
    errored.error_status = true;
    fixture.store.insert_media(&errored).unwrap();
    fixture
        .store
        .insert_media(&fixtures::media_record(HASH_B, "tt0000002"))
        .unwrap();

    let response = fixture.get("/media?error_status=true").await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["data"][0]["hash"], HASH_A);

    let response = fixture.get(&format!("/media?hash={}", HASH_B)).await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);

    let response = fixture.get("/media?pipeline_status=downloaded").await;
    assert_eq!(response.body["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_list_media_invalid_hash_filter_is_rejected() {
    let fixture = TestFixture::new();
    let response = fixture.get("/media?hash=nothex").await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "ValidationError");
}

#[tokio::test]
async fn test_pipeline_patch_updates_fields() {
    let fixture = TestFixture::new();
    let mut record = fixtures::media_record(HASH_A, "tt0000001");
    record.error_status = true;
    record.error_condition = Some("stalled".to_string());
    fixture.store.insert_media(&record).unwrap();

    let response = fixture
        .patch(
            &format!("/media/{}/pipeline", HASH_A),
            json!({
                "hash": HASH_A,
                "pipeline_status": "complete",
                "error_status": false,
                "clear_error_condition": true
            }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    let listing = fixture.get(&format!("/media?hash={}", HASH_A)).await;
    let record = &listing.body["data"][0];
    assert_eq!(record["pipeline_status"], "complete");
    assert_eq!(record["error_status"], false);
    assert!(record["error_condition"].is_null());
}

#[tokio::test]
async fn test_pipeline_patch_identifier_mismatch() {
    let fixture = TestFixture::new();
    fixture
        .store
        .insert_media(&fixtures::media_record(HASH_A, "tt0000001"))
        .unwrap();

    let response = fixture
        .patch(
            &format!("/media/{}/pipeline", HASH_A),
            json!({ "hash": HASH_B, "error_status": true }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "IdentifierMismatch");
}

#[tokio::test]
async fn test_pipeline_patch_unknown_hash_is_not_found() {
    let fixture = TestFixture::new();
    let response = fixture
        .patch(
            &format!("/media/{}/pipeline", HASH_A),
            json!({ "hash": HASH_A, "error_status": true }),
        )
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pipeline_patch_no_fields() {
    let fixture = TestFixture::new();
    fixture
        .store
        .insert_media(&fixtures::media_record(HASH_A, "tt0000001"))
        .unwrap();

    let response = fixture
        .patch(
            &format!("/media/{}/pipeline", HASH_A),
            json!({ "hash": HASH_A }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "NoFieldsToUpdate");
}

#[tokio::test]
async fn test_soft_delete_then_conflict() {
    let fixture = TestFixture::new();
    fixture
        .store
        .insert_media(&fixtures::media_record(HASH_A, "tt0000001"))
        .unwrap();
    fixture.downloader.seed_torrent(TORRENT_HASH, "Movie X").await;

    let first = fixture
        .patch_empty(&format!("/media/{}/soft_delete", HASH_A))
        .await;
    assert_status!(first, StatusCode::OK);
    assert_eq!(first.body["success"], true);
    assert_eq!(first.body["torrent_removed"], true);
    assert!(!first.body["deleted_at"].is_null());

    // The soft-delete path removes the daemon's data too.
    let removals = fixture.downloader.removed_torrents().await;
    assert_eq!(removals, vec![(TORRENT_HASH.to_string(), true)]);

    let second = fixture
        .patch_empty(&format!("/media/{}/soft_delete", HASH_A))
        .await;
    assert_status!(second, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "AlreadyDeleted");
}

#[tokio::test]
async fn test_soft_delete_unknown_hash_is_not_found() {
    let fixture = TestFixture::new();
    let response = fixture
        .patch_empty(&format!("/media/{}/soft_delete", HASH_A))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NotFound");
}

#[tokio::test]
async fn test_soft_delete_invalid_hash_is_rejected() {
    let fixture = TestFixture::new();
    let response = fixture.patch_empty("/media/nothex/soft_delete").await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_soft_delete_survives_daemon_failure() {
    let fixture = TestFixture::new();
    fixture
        .store
        .insert_media(&fixtures::media_record(HASH_A, "tt0000001"))
        .unwrap();
    fixture.downloader.fail_next("daemon unreachable").await;

    let response = fixture
        .patch_empty(&format!("/media/{}/soft_delete", HASH_A))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["torrent_removed"], false);
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("torrent removal failed"));
}
