//! End-to-end tests for the HTTP command bridge.
//!
//! Each test spins the real router on an ephemeral port and drives it with
//! a plain HTTP client, covering routing, argument validation, suspension,
//! and the documented status mapping.

use serde_json::Value;
use spind::commands;
use spind::dispatch::Dispatcher;
use spind::http::Bridge;
use spind::session::{Library, Playlist, Session, Track};
use std::sync::Arc;

fn track(id: &str, title: &str, artist: &str, album: &str) -> Track {
    Track {
        id: id.into(),
        title: title.into(),
        artist: artist.into(),
        album: album.into(),
        duration_ms: 240_000,
    }
}

fn fixture_library() -> Library {
    Library {
        playlists: vec![
            Playlist {
                name: "chill".into(),
                tracks: vec![
                    track("aa1", "Silhouettes", "Floating Points", "Elaenia"),
                    track("aa2", "Peroration Six", "Floating Points", "Elaenia"),
                ],
            },
            Playlist {
                name: "road".into(),
                tracks: vec![track("bb1", "Autobahn", "Kraftwerk", "Autobahn")],
            },
        ],
    }
}

/// Bind a bridge over a fresh session and return its base URL.
async fn spawn_bridge() -> String {
    let session = Arc::new(Session::new(fixture_library()));
    let dispatcher = Arc::new(Dispatcher::new(commands::catalogue(), session));
    let bridge = Bridge::bind("127.0.0.1:0".parse().unwrap(), dispatcher)
        .await
        .expect("failed to bind bridge");
    let addr = bridge.local_addr().expect("no local addr");
    tokio::spawn(async move {
        let _ = bridge.run().await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_zero_arg_play_responds_immediately() {
    let base = spawn_bridge().await;

    let resp = reqwest::get(format!("{base}/api/play")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let doc: Value = resp.json().await.unwrap();
    // Empty queue: play is a no-op but still reports player state.
    assert_eq!(doc["status"], "stopped");
    assert_eq!(doc["total_tracks"], 0);
}

#[tokio::test]
async fn test_empty_path_is_not_found() {
    let base = spawn_bridge().await;
    for path in ["/api", "/api/"] {
        let resp = reqwest::get(format!("{base}{path}")).await.unwrap();
        assert_eq!(resp.status(), 404, "path {path}");
        assert!(resp.bytes().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_non_get_is_not_implemented() {
    let base = spawn_bridge().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/api/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 501);
}

#[tokio::test]
async fn test_bad_integer_argument_is_bad_request() {
    let base = spawn_bridge().await;
    let resp = reqwest::get(format!("{base}/api/seek/notanumber")).await.unwrap();
    assert_eq!(resp.status(), 400);
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_command_and_wrong_arity_are_not_found() {
    let base = spawn_bridge().await;

    let resp = reqwest::get(format!("{base}/api/unknowncmd/1/2")).await.unwrap();
    assert_eq!(resp.status(), 404);

    // "status" exists only at arity 0.
    let resp = reqwest::get(format!("{base}/api/status/1")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_gated_command_is_forbidden() {
    let base = spawn_bridge().await;
    for cmd in ["bye", "quit"] {
        let resp = reqwest::get(format!("{base}/api/{cmd}")).await.unwrap();
        assert_eq!(resp.status(), 403, "command {cmd}");
    }
}

#[tokio::test]
async fn test_idle_acknowledged_with_empty_payload() {
    let base = spawn_bridge().await;
    let resp = reqwest::get(format!("{base}/api/idle")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_percent_encoded_link_argument() {
    let base = spawn_bridge().await;

    let resp = reqwest::get(format!("{base}/api/uplay/track%3Aaa1")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let doc: Value = resp.json().await.unwrap();
    assert_eq!(doc["status"], "playing");
    assert_eq!(doc["title"], "Silhouettes");
}

#[tokio::test]
async fn test_percent_encoded_search_text() {
    let base = spawn_bridge().await;

    let resp = reqwest::get(format!("{base}/api/search/floating%20points"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let doc: Value = resp.json().await.unwrap();
    assert_eq!(doc["query"], "floating points");
    assert_eq!(doc["tracks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_operation_failure_arrives_as_error_document() {
    let base = spawn_bridge().await;

    // Playlist 9 does not exist: binding succeeds, the operation fails.
    let resp = reqwest::get(format!("{base}/api/ls/9")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let doc: Value = resp.json().await.unwrap();
    assert_eq!(doc["error"], "no playlist at index 9");
}

#[tokio::test]
async fn test_arity_overloads_route_to_distinct_operations() {
    let base = spawn_bridge().await;

    // play/1 plays a playlist; play/0/1 plays one track of a playlist.
    let resp = reqwest::get(format!("{base}/api/play/1")).await.unwrap();
    let doc: Value = resp.json().await.unwrap();
    assert_eq!(doc["title"], "Autobahn");
    assert_eq!(doc["total_tracks"], 1);

    let resp = reqwest::get(format!("{base}/api/play/0/1")).await.unwrap();
    let doc: Value = resp.json().await.unwrap();
    assert_eq!(doc["title"], "Peroration Six");
    assert_eq!(doc["total_tracks"], 1);
}

#[tokio::test]
async fn test_concurrent_requests_get_their_own_replies() {
    let base = spawn_bridge().await;

    // Two in-flight dispatches against different links: whatever order the
    // completions land in, each response carries its own payload.
    let a = reqwest::get(format!("{base}/api/uinfo/track%3Aaa1"));
    let b = reqwest::get(format!("{base}/api/uinfo/track%3Abb1"));
    let (a, b) = tokio::join!(a, b);

    let doc_a: Value = a.unwrap().json().await.unwrap();
    let doc_b: Value = b.unwrap().json().await.unwrap();
    assert_eq!(doc_a["uri"], "track:aa1");
    assert_eq!(doc_a["tracks"][0]["title"], "Silhouettes");
    assert_eq!(doc_b["uri"], "track:bb1");
    assert_eq!(doc_b["tracks"][0]["title"], "Autobahn");
}

#[tokio::test]
async fn test_queue_editing_flow() {
    let base = spawn_bridge().await;

    let doc: Value = reqwest::get(format!("{base}/api/add/0"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["queued"], 2);

    let doc: Value = reqwest::get(format!("{base}/api/add/1/0"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["queued"], 1);
    assert_eq!(doc["track"]["id"], "bb1");

    let doc: Value = reqwest::get(format!("{base}/api/qls"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["tracks"].as_array().unwrap().len(), 3);

    let doc: Value = reqwest::get(format!("{base}/api/qrm/0/1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["removed"], 2);

    let doc: Value = reqwest::get(format!("{base}/api/qclear"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["removed"], 1);
}

#[tokio::test]
async fn test_double_encoded_segment_decodes_once() {
    let base = spawn_bridge().await;

    // %2541 decodes to the literal "%41", not to "A": one decoding pass.
    let resp = reqwest::get(format!("{base}/api/search/%2541")).await.unwrap();
    let doc: Value = resp.json().await.unwrap();
    assert_eq!(doc["query"], "%41");
}
