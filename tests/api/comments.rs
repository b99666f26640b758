use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::support::{str_list, TestApp};

async fn review_id(app: &TestApp, token: &str) -> String {
    let (status, body) = app
        .post(
            "/reviews",
            Some(token),
            json!({ "movieId": 1, "rating": 4, "content": "text" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["_id"].as_str().unwrap().to_string()
}

async fn add_comment(app: &TestApp, uri: &str, token: &str, body: Value) -> Value {
    let (status, body) = app.post(uri, Some(token), body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn replies_attach_to_the_root() {
    let app = TestApp::new();
    let token = app.token("u1");
    let review = review_id(&app, &token).await;
    let uri = format!("/reviews/{}/comments", review);

    let a = add_comment(&app, &uri, &token, json!({ "content": "A" })).await;
    assert!(a["parentId"].is_null());
    assert_eq!(a["reviewId"], review);

    let b = add_comment(&app, &uri, &token, json!({ "content": "B", "parentCommentId": a["id"] })).await;
    assert_eq!(b["parentId"], a["id"]);

    let c = add_comment(&app, &uri, &token, json!({ "content": "C", "parentCommentId": b["id"] })).await;
    assert_eq!(c["parentId"], a["id"]);

    let (_, roots) = app.get(&uri, None).await;
    assert_eq!(roots["total"], 1);
    assert_eq!(roots["items"][0]["id"], a["id"]);
    assert_eq!(roots["items"][0]["repliesCount"], 2);

    let (_, replies) = app
        .get(&format!("{}?parentId={}", uri, a["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(replies["total"], 2);
    assert!(replies["items"][0].get("repliesCount").is_none());
}

#[tokio::test]
async fn unknown_parent_becomes_root() {
    let app = TestApp::new();
    let token = app.token("u1");
    let uri = format!("/reviews/{}/comments", review_id(&app, &token).await);

    let orphan = add_comment(&app, &uri, &token, json!({ "content": "x", "parentCommentId": "nope" })).await;
    assert!(orphan["parentId"].is_null());
}

#[tokio::test]
async fn parent_on_another_target_is_ignored() {
    let app = TestApp::new();
    let token = app.token("u1");

    let movie_root = add_comment(&app, "/movies/603/comments", &token, json!({ "content": "m" })).await;
    assert_eq!(movie_root["movieId"], 603);

    let uri = format!("/reviews/{}/comments", review_id(&app, &token).await);
    let reply = add_comment(
        &app,
        &uri,
        &token,
        json!({ "content": "r", "parentCommentId": movie_root["id"] }),
    )
    .await;
    assert!(reply["parentId"].is_null());
}

#[tokio::test]
async fn delete_root_removes_direct_replies_only() {
    let app = TestApp::new();
    let token = app.token("u1");
    let uri = format!("/reviews/{}/comments", review_id(&app, &token).await);

    let a = add_comment(&app, &uri, &token, json!({ "content": "A" })).await;
    add_comment(&app, &uri, &token, json!({ "content": "B", "parentCommentId": a["id"] })).await;
    let other = add_comment(&app, &uri, &token, json!({ "content": "other" })).await;

    let (status, body) = app
        .delete(&format!("{}/{}", uri, a["id"].as_str().unwrap()), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], a["id"]);

    let (_, roots) = app.get(&uri, None).await;
    assert_eq!(roots["total"], 1);
    assert_eq!(roots["items"][0]["id"], other["id"]);
    assert_eq!(roots["items"][0]["repliesCount"], 0);
}

#[tokio::test]
async fn comment_ownership_and_target_checks() {
    let app = TestApp::new();
    let owner = app.token("owner");
    let other = app.token("other");
    let review = review_id(&app, &owner).await;
    let uri = format!("/reviews/{}/comments", review);

    let c = add_comment(&app, &uri, &owner, json!({ "content": "mine" })).await;
    let comment_uri = format!("{}/{}", uri, c["id"].as_str().unwrap());

    assert_eq!(
        app.put(&comment_uri, None, json!({ "content": "x" })).await.0,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.put(&comment_uri, Some(&other), json!({ "content": "x" })).await.0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(app.delete(&comment_uri, Some(&other)).await.0, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(&comment_uri, Some(&owner), json!({ "content": "edited", "isSpoiler": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "edited");
    assert_eq!(body["isSpoiler"], true);

    // Same comment id under a different review.
    let elsewhere = format!("/reviews/{}/comments/{}", "other-review", c["id"].as_str().unwrap());
    assert_eq!(
        app.put(&elsewhere, Some(&owner), json!({ "content": "x" })).await.0,
        StatusCode::NOT_FOUND
    );

    // Commenting on a review that does not exist.
    assert_eq!(
        app.post("/reviews/missing/comments", Some(&owner), json!({ "content": "x" })).await.0,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post(&uri, Some(&owner), json!({ "content": "" })).await.0,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn comment_like_toggle() {
    let app = TestApp::new();
    let token = app.token("u1");
    let c = add_comment(&app, "/movies/11/comments", &token, json!({ "content": "c" })).await;
    let base = format!("/movies/11/comments/{}", c["id"].as_str().unwrap());

    let (status, body) = app.post_empty(&format!("{}/react", base), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(str_list(&body["likesBy"]), ["u1"]);

    let (_, body) = app.get(&format!("{}/reaction", base), Some(&token)).await;
    assert_eq!(body, json!({ "liked": true }));

    let (_, body) = app.post_empty(&format!("{}/react", base), Some(&token)).await;
    assert!(str_list(&body["likesBy"]).is_empty());

    assert_eq!(
        app.get(&format!("{}/reaction", base), None).await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn comment_list_sort_and_pagination() {
    let app = TestApp::new();
    let token = app.token("u1");
    let uri = "/movies/5/comments";

    let mut ids = Vec::new();
    for i in 0..6 {
        let c = add_comment(&app, uri, &token, json!({ "content": format!("c{}", i) })).await;
        ids.push(c["id"].as_str().unwrap().to_string());
    }
    app.post_empty(&format!("{}/{}/react", uri, ids[0]), Some(&app.token("x"))).await;

    let (_, body) = app.get(&format!("{}?sort=likes&limit=2", uri), None).await;
    assert_eq!(body["items"][0]["id"], ids[0].as_str());
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["total"], 6);
    assert_eq!(body["limit"], 2);

    let (_, body) = app.get(&format!("{}?page=2&limit=4", uri), None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    assert_eq!(app.get("/movies/abc/comments", None).await.0, StatusCode::BAD_REQUEST);
}
