use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::support::{str_list, TestApp};

async fn bookmark(app: &TestApp, token: &str, movie_id: i64) -> Value {
    let (status, body) = app
        .post(
            "/bookmarks",
            Some(token),
            json!({ "movieId": movie_id, "movieTitle": format!("Movie {}", movie_id) }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn duplicate_bookmark_returns_existing_id() {
    let app = TestApp::new();
    let token = app.token("U");

    let first = bookmark(&app, &token, 42).await;
    assert_eq!(first["movieId"], 42);
    assert_eq!(first["isWatched"], false);
    assert!(first["createdAt"].is_string());

    let (status, body) = app
        .post("/bookmarks", Some(&token), json!({ "movieId": 42, "movieTitle": "again" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["id"], first["id"]);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn bookmarks_require_auth_and_fields() {
    let app = TestApp::new();
    let token = app.token("U");

    assert_eq!(app.get("/bookmarks", None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.post("/bookmarks", Some(&token), json!({ "movieId": 1 })).await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.post("/bookmarks", Some(&token), json!({ "movieTitle": "x" })).await.0,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn list_is_paginated_newest_first() {
    let app = TestApp::new();
    let token = app.token("U");
    for movie_id in 1..=12 {
        bookmark(&app, &token, movie_id).await;
    }
    bookmark(&app, &app.token("someone-else"), 99).await;

    let (status, body) = app.get("/bookmarks?page=2&limit=5", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 12);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 5);
    let movies: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["movieId"].as_i64().unwrap())
        .collect();
    assert_eq!(movies, [7, 6, 5, 4, 3]);

    let (_, body) = app.get("/bookmarks?page=50", Some(&token)).await;
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 12);

    let (_, body) = app.get("/bookmarks?limit=1000", Some(&token)).await;
    assert_eq!(body["limit"], 100);
}

#[tokio::test]
async fn update_watched_tags_and_status() {
    let app = TestApp::new();
    let token = app.token("U");
    let first = bookmark(&app, &token, 1).await;
    bookmark(&app, &token, 2).await;
    let uri = format!("/bookmarks/{}", first["id"].as_str().unwrap());

    let (status, body) = app
        .put(&uri, Some(&token), json!({ "isWatched": true, "tags": ["sf", "noir"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isWatched"], true);

    // Only real booleans change the watched flag.
    let (_, body) = app.put(&uri, Some(&token), json!({ "isWatched": "no" })).await;
    assert_eq!(body["isWatched"], true);

    let (_, body) = app.get("/bookmarks/watched", Some(&token)).await;
    assert_eq!(body["total"], 1);

    let (_, body) = app.get("/bookmarks/tags", Some(&token)).await;
    assert_eq!(str_list(&body), ["sf", "noir"]);

    let (_, body) = app.get("/bookmarks/status/1", Some(&token)).await;
    assert_eq!(body["bookmarked"], true);
    assert_eq!(body["id"], first["id"]);

    let (_, body) = app.get("/bookmarks/status/3", Some(&token)).await;
    assert_eq!(body, json!({ "bookmarked": false, "id": null }));

    let (_, body) = app.get("/bookmarks/status?movieIds=2,3,2,x,-1", Some(&token)).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["movieId"], 2);
    assert_eq!(items[0]["bookmarked"], true);
    assert_eq!(items[1]["movieId"], 3);
    assert_eq!(items[1]["bookmarked"], false);

    let (_, body) = app.get("/bookmarks/status", Some(&token)).await;
    assert_eq!(body, json!({ "items": [] }));
}

#[tokio::test]
async fn other_users_bookmark_is_forbidden() {
    let app = TestApp::new();
    let owner = app.token("owner");
    let other = app.token("other");
    let b = bookmark(&app, &owner, 1).await;
    let uri = format!("/bookmarks/{}", b["id"].as_str().unwrap());

    assert_eq!(app.get(&uri, Some(&other)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(
        app.put(&uri, Some(&other), json!({ "isWatched": true })).await.0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(app.delete(&uri, Some(&other)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/bookmarks/nope", Some(&other)).await.0, StatusCode::NOT_FOUND);

    let (status, body) = app.delete(&uri, Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["id"], b["id"]);

    // Free to bookmark the same movie again.
    bookmark(&app, &owner, 1).await;
}
