//! Integration tests for club100-aw API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use club100_aw::catalog::EffectCatalog;
use club100_aw::services::{
    FfmpegClient, ItemProcessor, MediaCache, MixtapePipeline, SongFetcher, SpeechSynthesizer,
    ToolRunner, YoutubeClient,
};
use club100_aw::AppState;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

/// Test helper: create test app with in-memory database and temp directories
async fn create_test_app() -> (axum::Router, tempfile::TempDir) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    club100_common::db::create_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let cache_dir = root.path().join("cache");
    let effects_dir = root.path().join("effects");
    let output_dir = root.path().join("output");
    for dir in [&cache_dir, &effects_dir, &output_dir] {
        std::fs::create_dir_all(dir).expect("Failed to create test dir");
    }

    let runner = ToolRunner::new(Duration::from_secs(5));
    let ffmpeg = FfmpegClient::new(runner.clone());
    let youtube = YoutubeClient::new(runner.clone());
    let cache = MediaCache::new(&cache_dir, Duration::from_secs(3600));
    let catalog = Arc::new(EffectCatalog::new(&effects_dir));

    let fetcher = SongFetcher::new(youtube.clone(), cache.clone(), ffmpeg.clone(), 60);
    let synthesizer = SpeechSynthesizer::new(runner, ffmpeg.clone());
    let processor = ItemProcessor::new(ffmpeg.clone(), synthesizer, catalog.clone());
    let pipeline = Arc::new(MixtapePipeline::new(
        pool.clone(),
        fetcher,
        processor,
        ffmpeg,
        output_dir.clone(),
        "da".to_string(),
        2,
    ));

    let state = AppState {
        db: pool,
        catalog,
        pipeline,
        youtube,
        cache,
        output_dir,
    };

    (club100_aw::build_router(state), root)
}

#[tokio::test]
async fn health_endpoint_reports_module() {
    let (app, _root) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "club100-aw");
}

#[tokio::test]
async fn effects_listing_has_full_catalog() {
    let (app, _root) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/effects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let listing = json.as_array().unwrap();
    assert_eq!(listing.len(), club100_aw::catalog::BUILTIN_EFFECTS.len());
    assert!(listing.iter().any(|e| e["id"] == "vine_boom"));
    assert!(listing
        .iter()
        .all(|e| e["audioUrl"].as_str().unwrap().starts_with("/effects/")));
}

#[tokio::test]
async fn effect_file_served_from_effects_dir() {
    let (app, root) = create_test_app().await;
    std::fs::write(root.path().join("effects/vine-boom.mp3"), b"fake_mp3").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/effects/vine-boom.mp3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"fake_mp3");
}

#[tokio::test]
async fn effect_file_outside_catalog_is_not_found() {
    let (app, root) = create_test_app().await;
    std::fs::write(root.path().join("effects/secret.mp3"), b"secret").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/effects/secret.mp3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn effect_data_returns_base64_payload() {
    let (app, root) = create_test_app().await;
    std::fs::write(root.path().join("effects/fart.mp3"), b"toot").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/effects/fart/data")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let data_url = json["dataUrl"].as_str().unwrap();
    assert!(data_url.starts_with("data:audio/mpeg;base64,"));
}

#[tokio::test]
async fn jobs_listing_starts_empty() {
    let (app, _root) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/jobs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn download_rejects_malformed_job_id() {
    let (app, _root) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/download/../../etc/passwd")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Either the router or the id parse rejects it, never the filesystem
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn download_unknown_job_is_not_found() {
    let (app, _root) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/download/0c6bbd27-4b65-4c21-9bd2-29ae1e9a3201")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_serves_finished_mixtape() {
    let (app, root) = create_test_app().await;
    let job_id = "7d2f3a90-1111-4222-8333-444455556666";
    std::fs::write(
        root.path().join(format!("output/club100_{job_id}.mp3")),
        b"mixtape",
    )
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/download/{job_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains(job_id));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"mixtape");
}

#[tokio::test]
async fn ytsearch_requires_query() {
    let (app, _root) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ytsearch")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "query": "" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn generate_with_empty_timeline_is_bad_request() {
    let (app, _root) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/generate")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "timeline": [] }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_failure_is_recorded_in_job_list() {
    let (app, _root) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/generate")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "timeline": [] }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/jobs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let jobs = json.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["status"], "failed");
    assert!(jobs[0]["output_path"].is_null());
}

#[tokio::test]
async fn cache_clear_reports_removed_count() {
    let (app, root) = create_test_app().await;
    std::fs::write(root.path().join("cache/abc12345678.full.m4a"), b"audio").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cache/clear")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["removed"], 1);
    assert!(!root.path().join("cache/abc12345678.full.m4a").exists());
}
