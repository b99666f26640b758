use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::auth::AuthUser;
use super::error::{ApiError, ApiJson};
use super::movie_id_param;
use super::types::*;
use crate::db::{new_id, Bookmark, DbError};
use crate::server::AppState;
use crate::social::{assert_owner, paginate, Page, PageRequest, BOOKMARK_PAGE_CAP};
use crate::util::QueryParams;

/// Comma separated movie ids, deduplicated in first-seen order. Blank,
/// non-numeric and non-positive entries are dropped.
pub fn parse_movie_ids(raw: &str) -> Vec<i64> {
    let mut seen = BTreeSet::new();
    raw.split(',')
        .filter_map(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n > 0.0 && n.fract() == 0.0)
        .map(|n| n as i64)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Distinct tags in first-seen order.
pub fn distinct_tags(bookmarks: &[Bookmark]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    bookmarks
        .iter()
        .flat_map(|b| b.tags.iter())
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

async fn owned_bookmark(state: &AppState, id: &str, user_id: &str) -> Result<Bookmark, ApiError> {
    let bookmark = match state.db.get_bookmark(id).await {
        Ok(bookmark) => bookmark,
        Err(DbError::NotFound(_)) => return Err(ApiError::not_found("Bookmark")),
        Err(e) => return Err(e.into()),
    };
    assert_owner(&bookmark, user_id)?;
    Ok(bookmark)
}

async fn find_for_user(state: &AppState, user_id: &str, movie_id: i64) -> Result<Option<Bookmark>, ApiError> {
    let found = state
        .db
        .find_bookmarks(&|b: &Bookmark| b.user_id == user_id && b.movie_id == movie_id)
        .await?;
    Ok(found.into_iter().next())
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<Bookmark>), ApiError> {
    let movie_id = movie_id(req.movie_id);
    let movie_title = req.movie_title.filter(|t| !t.is_empty());
    let (Some(movie_id), Some(movie_title)) = (movie_id, movie_title) else {
        return Err(ApiError::validation("movieId and movieTitle are required"));
    };

    let now = Utc::now();
    let bookmark = Bookmark {
        id: new_id(),
        user_id,
        movie_id,
        movie_title,
        movie_poster: non_empty(req.movie_poster),
        movie_release_date: non_empty(req.movie_release_date),
        tags: req.tags.unwrap_or_default(),
        is_watched: req.is_watched.unwrap_or(false),
        created: now,
        updated: now,
    };

    state.db.insert_bookmark(bookmark.clone()).await.map_err(|e| match e {
        DbError::AlreadyExists { existing_id, .. } => ApiError::Conflict {
            message: "Movie is already bookmarked".to_string(),
            id: existing_id,
        },
        e => e.into(),
    })?;

    info!(bookmark = %bookmark.id, movie = movie_id, "Bookmark created");
    Ok((StatusCode::CREATED, Json(bookmark)))
}

pub async fn list_bookmarks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<QueryParams>,
) -> Result<Json<Page<Bookmark>>, ApiError> {
    let req = PageRequest::from_params(&params, BOOKMARK_PAGE_CAP);
    let bookmarks = state
        .db
        .find_bookmarks(&|b: &Bookmark| b.user_id == user_id)
        .await?;
    Ok(Json(paginate(bookmarks, req)))
}

pub async fn list_watched(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<QueryParams>,
) -> Result<Json<Page<Bookmark>>, ApiError> {
    let req = PageRequest::from_params(&params, BOOKMARK_PAGE_CAP);
    let bookmarks = state
        .db
        .find_bookmarks(&|b: &Bookmark| b.user_id == user_id && b.is_watched)
        .await?;
    Ok(Json(paginate(bookmarks, req)))
}

pub async fn list_tags(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<String>>, ApiError> {
    let bookmarks = state
        .db
        .find_bookmarks(&|b: &Bookmark| b.user_id == user_id)
        .await?;
    Ok(Json(distinct_tags(&bookmarks)))
}

pub async fn status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(movie_id): Path<String>,
) -> Result<Json<BookmarkStatus>, ApiError> {
    let movie_id = movie_id_param(&movie_id)?;
    let found = find_for_user(&state, &user_id, movie_id).await?;
    Ok(Json(BookmarkStatus {
        movie_id: None,
        bookmarked: found.is_some(),
        id: found.map(|b| b.id),
    }))
}

pub async fn bulk_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<QueryParams>,
) -> Result<Json<BookmarkStatusList>, ApiError> {
    let ids = params.get("movieIds").map(parse_movie_ids).unwrap_or_default();
    if ids.is_empty() {
        return Ok(Json(BookmarkStatusList { items: Vec::new() }));
    }

    let bookmarks = state
        .db
        .find_bookmarks(&|b: &Bookmark| b.user_id == user_id)
        .await?;
    let items = ids
        .into_iter()
        .map(|movie_id| {
            let found = bookmarks.iter().find(|b| b.movie_id == movie_id);
            BookmarkStatus {
                movie_id: Some(movie_id),
                bookmarked: found.is_some(),
                id: found.map(|b| b.id.clone()),
            }
        })
        .collect();
    Ok(Json(BookmarkStatusList { items }))
}

pub async fn get_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Bookmark>, ApiError> {
    Ok(Json(owned_bookmark(&state, &id, &user_id).await?))
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateBookmarkRequest>,
) -> Result<Json<Bookmark>, ApiError> {
    owned_bookmark(&state, &id, &user_id).await?;

    let bookmark = state
        .db
        .update_bookmark(
            &id,
            Box::new(move |b| {
                if let Some(tags) = req.tags {
                    b.tags = tags;
                }
                if let Some(is_watched) = req.is_watched {
                    b.is_watched = is_watched;
                }
                b.updated = Utc::now();
            }),
        )
        .await?;
    Ok(Json(bookmark))
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<BookmarkDeletedResponse>, ApiError> {
    owned_bookmark(&state, &id, &user_id).await?;
    let bookmark = state.db.delete_bookmark(&id).await?;
    info!(bookmark = %bookmark.id, "Bookmark deleted");
    Ok(Json(BookmarkDeletedResponse {
        id: bookmark.id,
        ok: true,
    }))
}
