use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::auth::AuthUser;
use super::error::{ApiError, ApiJson};
use super::types::*;
use crate::db::{clamp_rating, new_id, Comment, CommentTarget, DbError, Post};
use crate::server::AppState;
use crate::social::{assert_owner, paginate, toggle_like, Page, PageRequest, POST_PAGE_CAP};
use crate::util::QueryParams;

async fn get_post(state: &AppState, id: &str) -> Result<Post, ApiError> {
    match state.db.get_post(id).await {
        Ok(post) => Ok(post),
        Err(DbError::NotFound(_)) => Err(ApiError::not_found("Post")),
        Err(e) => Err(e.into()),
    }
}

async fn comment_count(state: &AppState, post_id: &str) -> Result<usize, ApiError> {
    let target = CommentTarget::Post(post_id.to_string());
    Ok(state
        .db
        .find_comments(&|c: &Comment| c.target == target)
        .await?
        .len())
}

async fn to_dto(state: &AppState, post: Post) -> Result<PostDto, ApiError> {
    let count = comment_count(state, &post.id).await?;
    Ok(PostDto::new(post, count))
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Page<PostDto>>, ApiError> {
    let req = PageRequest::from_params(&params, POST_PAGE_CAP);
    let posts = state.db.find_posts(&|_: &Post| true).await?;
    let page = paginate(posts, req);

    let comments = state
        .db
        .find_comments(&|c: &Comment| matches!(c.target, CommentTarget::Post(_)))
        .await?;
    Ok(Json(page.map(|post| {
        let count = comments
            .iter()
            .filter(|c| matches!(&c.target, CommentTarget::Post(id) if *id == post.id))
            .count();
        PostDto::new(post, count)
    })))
}

pub async fn get_post_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostDto>, ApiError> {
    let post = get_post(&state, &id).await?;
    Ok(Json(to_dto(&state, post).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostDto>), ApiError> {
    let title = non_empty(req.title);
    let content = non_empty(req.content);
    let movie_id = movie_id(req.movie_id);
    let movie_title = non_empty(req.movie_title);
    let rating = req.rating.filter(|r| *r != 0.0);
    let (Some(title), Some(content), Some(movie_id), Some(movie_title), Some(rating)) =
        (title, content, movie_id, movie_title, rating)
    else {
        return Err(ApiError::validation(
            "title, content, movieId, movieTitle and rating are required",
        ));
    };

    let now = Utc::now();
    let post = Post {
        id: new_id(),
        user_id,
        title,
        content,
        movie_id,
        movie_title,
        movie_poster: non_empty(req.movie_poster),
        rating: clamp_rating(rating),
        liked_by: Vec::new(),
        created: now,
        updated: now,
    };
    state.db.insert_post(post.clone()).await?;

    info!(post = %post.id, movie = movie_id, "Post created");
    Ok((StatusCode::CREATED, Json(PostDto::new(post, 0))))
}

pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdatePostRequest>,
) -> Result<Json<PostDto>, ApiError> {
    let post = get_post(&state, &id).await?;
    assert_owner(&post, &user_id)?;

    let post = state
        .db
        .update_post(
            &id,
            Box::new(move |p| {
                if let Some(title) = non_empty(req.title) {
                    p.title = title;
                }
                if let Some(content) = non_empty(req.content) {
                    p.content = content;
                }
                if let Some(rating) = req.rating {
                    p.rating = clamp_rating(rating);
                }
                p.updated = Utc::now();
            }),
        )
        .await?;
    Ok(Json(to_dto(&state, post).await?))
}

pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let post = get_post(&state, &id).await?;
    assert_owner(&post, &user_id)?;

    let (post, removed) = state.db.delete_post_with_comments(&id).await?;

    info!(post = %post.id, comments = removed, "Post deleted");
    Ok(Json(DeletedResponse {
        message: "Post deleted".to_string(),
        id: post.id,
    }))
}

pub async fn like_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PostDto>, ApiError> {
    get_post(&state, &id).await?;
    let post = state
        .db
        .update_post(
            &id,
            Box::new(move |p| {
                toggle_like(&mut p.liked_by, &user_id);
            }),
        )
        .await?;
    Ok(Json(to_dto(&state, post).await?))
}
