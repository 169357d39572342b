//! End-to-end tests for the reject workflow.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};

const TEST_IMDB_ID: &str = "tt9999901";
const TEST_HASH: &str = "0000000000000000000000000000000099999901";
const TEST_TORRENT_HASH: &str = "55af51b9883b2e29e02fc728113747c706e480e3";

fn seed(fixture: &TestFixture) {
    fixture
        .store
        .insert_training(&fixtures::training_record(TEST_IMDB_ID))
        .unwrap();
    fixture
        .store
        .insert_media(&fixtures::media_record(TEST_HASH, TEST_IMDB_ID))
        .unwrap();
}

async fn training_state(fixture: &TestFixture) -> (String, bool, bool) {
    let listing = fixture
        .get(&format!("/training?imdb_id={}", TEST_IMDB_ID))
        .await;
    let record = &listing.body["data"][0];
    (
        record["label"].as_str().unwrap().to_string(),
        record["human_labeled"].as_bool().unwrap(),
        record["reviewed"].as_bool().unwrap(),
    )
}

#[tokio::test]
async fn test_reject_deletes_file_and_removes_torrent() {
    let fixture = TestFixture::new();
    seed(&fixture);
    fixture
        .downloader
        .seed_torrent(TEST_TORRENT_HASH, "Movie X")
        .await;

    // Place the media payload where the stored path points.
    let movie_dir = fixture.mount_path("library/movies/movie-x");
    std::fs::create_dir_all(&movie_dir).unwrap();
    std::fs::write(movie_dir.join("movie.mkv"), "payload").unwrap();

    let response = fixture
        .patch_empty(&format!("/training/{}/reject", TEST_IMDB_ID))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["file_deleted"], true);
    assert_eq!(response.body["torrent_removed"], true);
    assert!(response.body["file_deletion_warning"].is_null());

    assert!(!movie_dir.exists());

    let (label, human_labeled, reviewed) = training_state(&fixture).await;
    assert_eq!(label, "would_not_watch");
    assert!(human_labeled);
    assert!(reviewed);

    // The reject path leaves the daemon's payload to the library teardown.
    let removals = fixture.downloader.removed_torrents().await;
    assert_eq!(removals, vec![(TEST_TORRENT_HASH.to_string(), false)]);
}

#[tokio::test]
async fn test_reject_with_missing_file_still_commits_label() {
    let fixture = TestFixture::new();
    seed(&fixture);

    let response = fixture
        .patch_empty(&format!("/training/{}/reject", TEST_IMDB_ID))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["file_deleted"], false);
    // Nothing on disk is informational, not a warning.
    assert!(response.body["file_deletion_warning"].is_null());

    let (label, _, _) = training_state(&fixture).await;
    assert_eq!(label, "would_not_watch");
}

#[tokio::test]
async fn test_reject_survives_daemon_failure() {
    let fixture = TestFixture::new();
    seed(&fixture);
    fixture.downloader.fail_next("connection refused").await;

    let response = fixture
        .patch_empty(&format!("/training/{}/reject", TEST_IMDB_ID))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["torrent_removed"], false);

    let (label, _, _) = training_state(&fixture).await;
    assert_eq!(label, "would_not_watch");
}

#[tokio::test]
async fn test_reject_without_media_row_warns() {
    let fixture = TestFixture::new();
    fixture
        .store
        .insert_training(&fixtures::training_record(TEST_IMDB_ID))
        .unwrap();

    let response = fixture
        .patch_empty(&format!("/training/{}/reject", TEST_IMDB_ID))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["file_deleted"], false);
    assert!(response.body["file_deletion_warning"]
        .as_str()
        .unwrap()
        .contains(TEST_IMDB_ID));
}

#[tokio::test]
async fn test_reject_unknown_id_is_not_found() {
    let fixture = TestFixture::new();
    let response = fixture.patch_empty("/training/tt7777777/reject").await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NotFound");
}

#[tokio::test]
async fn test_reject_invalid_id_is_rejected_before_store() {
    let fixture = TestFixture::new();
    let response = fixture.patch_empty("/training/not-an-id/reject").await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "ValidationError");
}

#[tokio::test]
async fn test_reject_twice_is_idempotent() {
    let fixture = TestFixture::new();
    seed(&fixture);
    fixture
        .downloader
        .seed_torrent(TEST_TORRENT_HASH, "Movie X")
        .await;

    let first = fixture
        .patch_empty(&format!("/training/{}/reject", TEST_IMDB_ID))
        .await;
    assert_status!(first, StatusCode::OK);
    assert_eq!(first.body["success"], true);

    let second = fixture
        .patch_empty(&format!("/training/{}/reject", TEST_IMDB_ID))
        .await;
    assert_status!(second, StatusCode::OK);
    assert_eq!(second.body["success"], true);
    // Nothing left to remove the second time.
    assert_eq!(second.body["torrent_removed"], false);

    let (label, _, _) = training_state(&fixture).await;
    assert_eq!(label, "would_not_watch");
}

#[tokio::test]
async fn test_reject_label_update_survives_patch_interplay() {
    // A label set through the plain patch endpoint and a subsequent reject
    // agree on the final state.
    let fixture = TestFixture::new();
    seed(&fixture);

    let response = fixture
        .patch(
            &format!("/training/{}", TEST_IMDB_ID),
            json!({ "imdb_id": TEST_IMDB_ID, "label": "would_watch" }),
        )
        .await;
    assert_status!(response, StatusCode::OK);

    let response = fixture
        .patch_empty(&format!("/training/{}/reject", TEST_IMDB_ID))
        .await;
    assert_status!(response, StatusCode::OK);

    let (label, human_labeled, reviewed) = training_state(&fixture).await;
    assert_eq!(label, "would_not_watch");
    assert!(human_labeled);
    assert!(reviewed);
}
