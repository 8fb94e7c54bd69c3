use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use search_core::persist::{save_index, IndexPaths};
use search_core::{Document, InvertedIndex};
use serde_json::Value;
use server::{build_app, ServerOptions};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

const MOVIES: &str = r#"{"movies": [
    {"id": 1, "title": "The Cat", "description": "A cat sits."},
    {"id": 2, "title": "Dog House", "description": "A dog barks."},
    {"id": 3, "title": "Category Seven", "description": "A dog and a storm.", "year": 1999}
]}"#;

fn build_tiny_index(dir: &Path) -> ServerOptions {
    fs::write(dir.join("movies.json"), MOVIES).unwrap();
    fs::write(dir.join("stopwords.txt"), "a\nthe\nand\n").unwrap();
    let docs = vec![
        Document::new(1, "The Cat", "A cat sits."),
        Document::new(2, "Dog House", "A dog barks."),
    ];
    save_index(&IndexPaths::new(dir.join("cache")), &InvertedIndex::build(&docs)).unwrap();
    ServerOptions {
        index_dir: dir.join("cache"),
        corpus: dir.join("movies.json"),
        stopwords: dir.join("stopwords.txt"),
        admin_token: Some("secret".into()),
        cors_allow_origin: None,
    }
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::post(uri);
    if let Some(token) = token {
        req = req.header("X-ADMIN-TOKEN", token);
    }
    call(app, req.body(Body::empty()).unwrap()).await
}

fn ids(json: &Value) -> Vec<u64> {
    json["results"].as_array().unwrap().iter().map(|h| h["doc_id"].as_u64().unwrap()).collect()
}

#[tokio::test]
async fn search_modes_return_their_own_orderings() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_index(dir.path())).unwrap();

    let (status, json) = get(&app, "/search?q=cat+dog&limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec![1, 2]);
    assert!(json["results"][0].get("score").is_none());

    let (_, json) = get(&app, "/search?q=dog&mode=bm25").await;
    assert_eq!(ids(&json), vec![2]);
    assert!(json["results"][0]["score"].as_f64().unwrap() > 0.0);

    let (_, json) = get(&app, "/search?q=ous&mode=substring").await;
    assert_eq!(ids(&json), vec![2]);
    assert_eq!(json["results"][0]["document"]["title"], "Dog House");
    assert_eq!(json["results"][0]["document"]["description"], "A dog barks.");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_rebuilds_leave_a_loadable_cache() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_index(dir.path())).unwrap();

    let (first, second, during) = tokio::join!(
        post(&app, "/index/rebuild", Some("secret")),
        post(&app, "/index/rebuild", Some("secret")),
        get(&app, "/health"),
    );
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);
    assert_eq!(during.0, StatusCode::OK);
    assert_eq!(first.1["num_docs"].as_u64().unwrap(), 3);
    assert_eq!(second.1["num_docs"].as_u64().unwrap(), 3);
    assert!(!dir.path().join("cache/index.bin.tmp").exists());

    let (status, json) = post(&app, "/index/reload", Some("secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["num_docs"].as_u64().unwrap(), 3);
}

#[tokio::test]
async fn stats_map_errors_to_status_codes() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_index(dir.path())).unwrap();

    let (status, json) = get(&app, "/stats/tf?doc_id=1&term=cats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"].as_f64().unwrap(), 2.0);

    let (status, json) = get(&app, "/stats/idf?term=cat").await;
    assert_eq!(status, StatusCode::OK);
    assert!((json["value"].as_f64().unwrap() - 1.5f64.ln()).abs() < 1e-9);

    assert_eq!(get(&app, "/stats/idf?term=zzz").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/stats/idf?term=big+cat").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, "/stats/tfidf?term=cat").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, "/stats/median?term=cat").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/doc/42").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rebuild_swaps_the_snapshot() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_index(dir.path())).unwrap();

    assert_eq!(get(&app, "/doc/3").await.0, StatusCode::NOT_FOUND);
    assert_eq!(post(&app, "/index/rebuild", None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(post(&app, "/index/rebuild", Some("wrong")).await.0, StatusCode::UNAUTHORIZED);

    let (status, json) = post(&app, "/index/rebuild", Some("secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["num_docs"].as_u64().unwrap(), 3);

    let (status, json) = get(&app, "/doc/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Category Seven");
    assert_eq!(json["year"], 1999);

    let (_, json) = get(&app, "/search?q=dog").await;
    assert_eq!(ids(&json), vec![2, 3]);

    // the rebuilt index was persisted too
    let (status, json) = post(&app, "/index/reload", Some("secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["num_docs"].as_u64().unwrap(), 3);
}

#[test]
fn startup_without_index_fails() {
    let dir = tempdir().unwrap();
    let opts = ServerOptions {
        index_dir: dir.path().join("cache"),
        corpus: dir.path().join("movies.json"),
        stopwords: dir.path().join("stopwords.txt"),
        admin_token: None,
        cors_allow_origin: None,
    };
    let err = build_app(opts).unwrap_err();
    assert!(err.to_string().contains("run `build` first"));
}
