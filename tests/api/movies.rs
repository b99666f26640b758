use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::{header, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use crate::support::{test_config, TestApp};

/// Stand-in for the TMDB API that echoes the query string back.
async fn fake_tmdb() -> String {
    let app = Router::new()
        .route(
            "/discover/movie",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!({ "page": 1, "results": [], "query": q }))
            }),
        )
        .route(
            "/search/movie",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!({ "results": [{ "title": q.get("query") }] }))
            }),
        )
        .route(
            "/movie/:id",
            get(|Path(id): Path<String>| async move {
                if id == "404" {
                    (StatusCode::NOT_FOUND, Json(json!({ "status_message": "missing" })))
                } else {
                    (StatusCode::OK, Json(json!({ "id": id, "title": "Some Movie" })))
                }
            }),
        )
        .route(
            "/movie/:id/videos",
            get(|Path(id): Path<String>| async move { Json(json!({ "id": id, "results": [] })) }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn app_with_upstream() -> TestApp {
    let mut config = test_config();
    config.tmdb.api_key = Some("test-key".to_string());
    config.tmdb.base_url = fake_tmdb().await;
    TestApp::with_config(config)
}

#[tokio::test]
async fn discover_passes_genre_and_locale() {
    let app = app_with_upstream().await;

    let (status, body) = app.get("/movies?page=2&genre=Sci-Fi", None).await;
    assert_eq!(status, StatusCode::OK);
    let query = &body["query"];
    assert_eq!(query["api_key"], "test-key");
    assert_eq!(query["language"], "ko-KR");
    assert_eq!(query["region"], "KR");
    assert_eq!(query["page"], "2");
    assert_eq!(query["with_genres"], "878");

    let (_, body) = app.get("/movies?genre=opera", None).await;
    assert!(body["query"].get("with_genres").is_none());
    assert_eq!(body["query"]["page"], "1");
}

#[tokio::test]
async fn search_requires_query() {
    let app = app_with_upstream().await;

    assert_eq!(app.get("/movies/search", None).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(app.get("/movies/search?query=%20", None).await.0, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/movies/search?query=matrix", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["title"], "matrix");
}

#[tokio::test]
async fn details_are_not_cached() {
    let app = app_with_upstream().await;

    let (status, headers, body) = app.call_raw(Method::GET, "/movies/603", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "603");
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );

    let (status, body) = app.get("/movies/603/videos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "603");
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let app = app_with_upstream().await;

    let (status, body) = app.get("/movies/404", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["message"].is_string());

    // No API key configured at all.
    let app = TestApp::new();
    assert_eq!(app.get("/movies", None).await.0, StatusCode::BAD_GATEWAY);
}
