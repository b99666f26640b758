use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::support::{str_list, TestApp};

async fn create_review(app: &TestApp, token: &str, movie_id: i64, rating: f64) -> Value {
    let (status, body) = app
        .post(
            "/reviews",
            Some(token),
            json!({ "movieId": movie_id, "rating": rating, "content": "review text" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn create_clamps_rating_and_caps_tags() {
    let app = TestApp::new();
    let token = app.token("u1");
    let tags: Vec<String> = (0..25).map(|i| format!("t{}", i)).collect();

    let (status, body) = app
        .post(
            "/reviews",
            Some(&token),
            json!({ "movieId": "603", "rating": 9, "content": "wow", "tags": tags, "isSpoiler": true }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["movieId"], 603);
    assert_eq!(body["rating"], 5.0);
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["tags"].as_array().unwrap().len(), 20);
    assert_eq!(body["isSpoiler"], true);
    assert_eq!(body["likes"], 0);
    assert!(body["_id"].is_string());
}

#[tokio::test]
async fn create_requires_fields_and_auth() {
    let app = TestApp::new();
    let token = app.token("u1");
    let body = json!({ "movieId": 1, "rating": 3, "content": "x" });

    assert_eq!(app.post("/reviews", None, body).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.post("/reviews", Some(&token), json!({ "movieId": 1, "content": "x" })).await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.post("/reviews", Some(&token), json!({ "movieId": 1, "rating": 0, "content": "x" }))
            .await
            .0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.post("/reviews", Some(&token), json!({ "rating": 3, "content": "x" })).await.0,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn one_review_per_user_and_movie() {
    let app = TestApp::new();
    let u1 = app.token("u1");
    let u2 = app.token("u2");

    let first = create_review(&app, &u1, 42, 4.0).await;
    let (status, body) = app
        .post("/reviews", Some(&u1), json!({ "movieId": 42, "rating": 2, "content": "again" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["id"], first["_id"]);

    // Another user or another movie is fine.
    create_review(&app, &u2, 42, 3.0).await;
    create_review(&app, &u1, 43, 3.0).await;
}

#[tokio::test]
async fn like_then_dislike_moves_the_reaction() {
    let app = TestApp::new();
    let owner = app.token("owner");
    let u1 = app.token("U1");
    let review = create_review(&app, &owner, 1, 4.0).await;
    let id = review["_id"].as_str().unwrap();

    let (status, body) = app.post_empty(&format!("/reviews/{}/like", id), Some(&u1)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(str_list(&body["likedBy"]), ["U1"]);

    let (_, body) = app.post_empty(&format!("/reviews/{}/dislike", id), Some(&u1)).await;
    assert!(str_list(&body["likedBy"]).is_empty());
    assert_eq!(str_list(&body["dislikedBy"]), ["U1"]);
    assert_eq!(body["likes"], 0);
    assert_eq!(body["dislikes"], 1);

    let (_, body) = app.get(&format!("/reviews/{}/reaction", id), Some(&u1)).await;
    assert_eq!(body, json!({ "isLiked": false, "isDisliked": true }));

    // Same reaction twice removes it.
    let (_, body) = app.post_empty(&format!("/reviews/{}/dislike", id), Some(&u1)).await;
    assert!(str_list(&body["dislikedBy"]).is_empty());
}

#[tokio::test]
async fn newest_reactor_first() {
    let app = TestApp::new();
    let owner = app.token("owner");
    let review = create_review(&app, &owner, 1, 4.0).await;
    let uri = format!("/reviews/{}/like", review["_id"].as_str().unwrap());

    app.post_empty(&uri, Some(&app.token("a"))).await;
    let (_, body) = app.post_empty(&uri, Some(&app.token("b"))).await;
    assert_eq!(str_list(&body["likedBy"]), ["b", "a"]);
}

#[tokio::test]
async fn unauthenticated_beats_missing_beats_forbidden() {
    let app = TestApp::new();
    let owner = app.token("owner");
    let other = app.token("other");
    let review = create_review(&app, &owner, 1, 4.0).await;
    let uri = format!("/reviews/{}", review["_id"].as_str().unwrap());

    let body = json!({ "content": "edited" });
    assert_eq!(app.put("/reviews/missing", None, body.clone()).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.put("/reviews/missing", Some(&other), body.clone()).await.0,
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.put(&uri, Some(&other), body.clone()).await.0, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, Some(&other)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(
        app.post_empty("/reviews/missing/like", Some(&other)).await.0,
        StatusCode::NOT_FOUND
    );

    let (status, body) = app.put(&uri, Some(&owner), json!({ "content": "edited", "rating": -3 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "edited");
    assert_eq!(body["rating"], 1.0);
}

#[tokio::test]
async fn list_by_movie_paginates_and_filters() {
    let app = TestApp::new();
    for i in 0..12 {
        let token = app.token(&format!("user{}", i));
        create_review(&app, &token, 7, (i % 5 + 1) as f64).await;
    }
    create_review(&app, &app.token("user0"), 8, 5.0).await;

    let (status, body) = app.get("/reviews/movie/7?page=2&limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reviews"].as_array().unwrap().len(), 5);
    assert_eq!(body["total"], 12);
    assert_eq!(body["page"], 2);
    assert_eq!(body["totalPages"], 3);

    let (_, body) = app.get("/reviews/movie/7?page=9&limit=5", None).await;
    assert!(body["reviews"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 12);

    let (_, body) = app.get("/reviews/movie/7?limit=500", None).await;
    assert_eq!(body["reviews"].as_array().unwrap().len(), 12);

    let (_, body) = app.get("/reviews/movie/7?ratingFilter=5", None).await;
    assert_eq!(body["total"], 2);

    let (_, body) = app.get("/reviews/movie/7?sort=rating&limit=1", None).await;
    assert_eq!(body["reviews"][0]["rating"], 5.0);

    let (_, body) = app.get("/reviews/movie/7?hasSpoiler=true", None).await;
    assert_eq!(body["total"], 0);

    let (_, body) = app.get("/reviews/movie/999", None).await;
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn stats_and_my_reviews() {
    let app = TestApp::new();
    let u1 = app.token("u1");
    create_review(&app, &u1, 5, 5.0).await;
    create_review(&app, &app.token("u2"), 5, 4.0).await;
    create_review(&app, &app.token("u3"), 5, 4.0).await;
    create_review(&app, &u1, 6, 2.0).await;

    let (_, body) = app.get("/reviews/movie/5/stats", None).await;
    assert_eq!(body, json!({ "averageRating": 4.33, "totalReviews": 3 }));

    let (_, body) = app.get("/reviews/movie/77/stats", None).await;
    assert_eq!(body["averageRating"], 0.0);

    let (status, body) = app.get("/reviews/user/me", Some(&u1)).await;
    assert_eq!(status, StatusCode::OK);
    let movies: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["movieId"].as_i64().unwrap())
        .collect();
    assert_eq!(movies, [6, 5]);

    assert_eq!(app.get("/reviews/user/me", None).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_review_removes_its_comments() {
    let app = TestApp::new();
    let owner = app.token("owner");
    let review = create_review(&app, &owner, 1, 4.0).await;
    let id = review["_id"].as_str().unwrap();
    let comments = format!("/reviews/{}/comments", id);

    app.post(&comments, Some(&owner), json!({ "content": "first" })).await;

    let (status, body) = app.delete(&format!("/reviews/{}", id), Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    assert_eq!(app.get(&format!("/reviews/{}", id), None).await.0, StatusCode::NOT_FOUND);
    let (_, body) = app.get(&comments, None).await;
    assert_eq!(body["total"], 0);
}
