use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::support::TestApp;

async fn create_post(app: &TestApp, token: &str, title: &str) -> Value {
    let (status, body) = app
        .post(
            "/posts",
            Some(token),
            json!({
                "title": title,
                "content": "body",
                "movieId": 603,
                "movieTitle": "The Matrix",
                "rating": 7,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn create_and_list_posts() {
    let app = TestApp::new();
    let token = app.token("u1");

    let post = create_post(&app, &token, "first").await;
    assert_eq!(post["rating"], 5.0);
    assert_eq!(post["likes"], 0);
    assert_eq!(post["commentCount"], 0);
    create_post(&app, &token, "second").await;

    let id = post["id"].as_str().unwrap();
    app.post(&format!("/posts/{}/comments", id), Some(&token), json!({ "content": "nice" }))
        .await;

    let (status, body) = app.get("/posts?limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["title"], "second");
    assert_eq!(body["items"][1]["commentCount"], 1);

    assert_eq!(
        app.post("/posts", Some(&token), json!({ "title": "no body" })).await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.post("/posts", None, json!({ "title": "t" })).await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn post_like_toggle_and_ownership() {
    let app = TestApp::new();
    let owner = app.token("owner");
    let other = app.token("other");
    let post = create_post(&app, &owner, "mine").await;
    let uri = format!("/posts/{}", post["id"].as_str().unwrap());

    let (_, body) = app.post_empty(&format!("{}/like", uri), Some(&other)).await;
    assert_eq!(body["likes"], 1);
    let (_, body) = app.post_empty(&format!("{}/like", uri), Some(&other)).await;
    assert_eq!(body["likes"], 0);

    assert_eq!(
        app.put(&uri, Some(&other), json!({ "title": "hijack" })).await.0,
        StatusCode::FORBIDDEN
    );
    let (status, body) = app.put(&uri, Some(&owner), json!({ "title": "renamed" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "renamed");
    assert_eq!(body["content"], "body");

    assert_eq!(app.delete(&uri, Some(&other)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, Some(&owner)).await.0, StatusCode::OK);
    assert_eq!(app.get(&uri, None).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_post_removes_its_comments() {
    let app = TestApp::new();
    let owner = app.token("owner");
    let reader = app.token("reader");
    let post = create_post(&app, &owner, "doomed").await;
    let keep = create_post(&app, &owner, "kept").await;
    let uri = format!("/posts/{}", post["id"].as_str().unwrap());
    let keep_uri = format!("/posts/{}", keep["id"].as_str().unwrap());

    let (status, root) = app
        .post(&format!("{}/comments", uri), Some(&reader), json!({ "content": "first" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, reply) = app
        .post(
            &format!("{}/comments", uri),
            Some(&owner),
            json!({ "content": "thanks", "parentCommentId": root["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["parentId"], root["id"]);
    app.post(&format!("{}/comments", keep_uri), Some(&reader), json!({ "content": "other" }))
        .await;

    let (status, body) = app.delete(&uri, Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], post["id"]);

    let (_, body) = app.get(&format!("{}/comments", uri), None).await;
    assert_eq!(body["total"], 0);
    let (_, body) = app
        .get(&format!("{}/comments?parentId={}", uri, root["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(body["total"], 0);

    let (_, body) = app.get(&format!("{}/comments", keep_uri), None).await;
    assert_eq!(body["total"], 1);

    // The post is gone, so new comments on it are refused.
    assert_eq!(
        app.post(&format!("{}/comments", uri), Some(&reader), json!({ "content": "late" }))
            .await
            .0,
        StatusCode::NOT_FOUND
    );
}
