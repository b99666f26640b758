//! Comment endpoints, shared by every commentable entity. The `CommentScope`
//! type parameter says which entity the path key names.

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
use crate::db::{new_id, Comment, CommentTarget, DbError};
use crate::server::AppState;
use crate::social::{assert_owner, paginate, thread, toggle_like, Page, PageRequest, COMMENT_PAGE_CAP};
use crate::util::QueryParams;

pub trait CommentScope: Send + Sync + 'static {
    fn target(key: &str) -> Result<CommentTarget, ApiError>;
}

pub struct OnReview;
pub struct OnMovie;
pub struct OnPost;

impl CommentScope for OnReview {
    fn target(key: &str) -> Result<CommentTarget, ApiError> {
        Ok(CommentTarget::Review(key.to_string()))
    }
}

impl CommentScope for OnMovie {
    fn target(key: &str) -> Result<CommentTarget, ApiError> {
        Ok(CommentTarget::Movie(movie_id_param(key)?))
    }
}

impl CommentScope for OnPost {
    fn target(key: &str) -> Result<CommentTarget, ApiError> {
        Ok(CommentTarget::Post(key.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSort {
    Recent,
    Likes,
}

impl CommentSort {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("likes") => CommentSort::Likes,
            _ => CommentSort::Recent,
        }
    }
}

pub fn sort_comments(comments: &mut [Comment], sort: CommentSort) {
    match sort {
        CommentSort::Recent => comments.sort_by(|a, b| b.created.cmp(&a.created)),
        CommentSort::Likes => comments.sort_by(|a, b| {
            b.liked_by
                .len()
                .cmp(&a.liked_by.len())
                .then_with(|| b.created.cmp(&a.created))
        }),
    }
}

fn target_label(target: &CommentTarget) -> &'static str {
    match target {
        CommentTarget::Review(_) => "Review",
        CommentTarget::Post(_) => "Post",
        CommentTarget::Movie(_) => "Movie",
    }
}

/// The comment, provided it hangs off `target`. A comment on some other
/// entity is reported as missing.
async fn comment_on(state: &AppState, target: &CommentTarget, id: &str) -> Result<Comment, ApiError> {
    match state.db.get_comment(id).await {
        Ok(comment) if &comment.target == target => Ok(comment),
        Ok(_) | Err(DbError::NotFound(_)) => Err(ApiError::not_found("Comment")),
        Err(e) => Err(e.into()),
    }
}

async fn owned_comment(
    state: &AppState,
    target: &CommentTarget,
    id: &str,
    user_id: &str,
) -> Result<Comment, ApiError> {
    let comment = comment_on(state, target, id).await?;
    assert_owner(&comment, user_id)?;
    Ok(comment)
}

/// Without `parentId` lists root comments, each with its reply count;
/// with it, lists the replies of that root.
pub async fn list<S: CommentScope>(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Page<CommentDto>>, ApiError> {
    let target = S::target(&key)?;
    let req = PageRequest::from_params(&params, COMMENT_PAGE_CAP);
    let sort = CommentSort::parse(params.get("sort"));
    let parent_id = params.get("parentId").map(str::to_string);

    let all = state
        .db
        .find_comments(&|c: &Comment| c.target == target)
        .await?;

    let mut selected: Vec<Comment> = all
        .iter()
        .filter(|c| c.parent_id == parent_id)
        .cloned()
        .collect();
    sort_comments(&mut selected, sort);

    let page = paginate(selected, req);
    let page = if parent_id.is_none() {
        let counts = thread::reply_counts(&all);
        page.map(|c| {
            let replies = counts.get(&c.id).copied().unwrap_or(0);
            CommentDto {
                replies_count: Some(replies),
                ..CommentDto::from(c)
            }
        })
    } else {
        page.map(CommentDto::from)
    };
    Ok(Json(page))
}

pub async fn add<S: CommentScope>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(key): Path<String>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentDto>), ApiError> {
    let target = S::target(&key)?;
    let label = target_label(&target);
    let content = req
        .content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::validation("content is required"))?;

    let now = Utc::now();
    let comment = Comment {
        id: new_id(),
        target,
        user_id,
        content,
        is_spoiler: req.is_spoiler.unwrap_or(false),
        parent_id: None,
        liked_by: Vec::new(),
        created: now,
        updated: now,
    };

    // Reviews and posts must exist; the store checks under its locks.
    // Movies live upstream and are taken on trust.
    let reply_to = non_empty(req.parent_comment_id);
    let stored = match state.db.insert_comment(comment, reply_to.as_deref()).await {
        Ok(stored) => stored,
        Err(DbError::NotFound(_)) => return Err(ApiError::not_found(label)),
        Err(e) => return Err(e.into()),
    };

    info!(comment = %stored.id, parent = ?stored.parent_id, "Comment added");
    Ok((StatusCode::CREATED, Json(stored.into())))
}

pub async fn update<S: CommentScope>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((key, comment_id)): Path<(String, String)>,
    ApiJson(req): ApiJson<UpdateCommentRequest>,
) -> Result<Json<CommentDto>, ApiError> {
    let target = S::target(&key)?;
    owned_comment(&state, &target, &comment_id, &user_id).await?;

    let comment = state
        .db
        .update_comment(
            &comment_id,
            Box::new(move |c| {
                if let Some(content) = req.content {
                    c.content = content;
                }
                if let Some(is_spoiler) = req.is_spoiler {
                    c.is_spoiler = is_spoiler;
                }
                c.updated = Utc::now();
            }),
        )
        .await?;
    Ok(Json(comment.into()))
}

pub async fn delete<S: CommentScope>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((key, comment_id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let target = S::target(&key)?;
    owned_comment(&state, &target, &comment_id, &user_id).await?;

    let removed = state.db.delete_comment_thread(&comment_id).await?;
    info!(comment = %comment_id, removed = removed.len(), "Comment deleted");

    Ok(Json(DeletedResponse {
        message: "Comment deleted".to_string(),
        id: comment_id,
    }))
}

pub async fn react<S: CommentScope>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((key, comment_id)): Path<(String, String)>,
) -> Result<Json<CommentDto>, ApiError> {
    let target = S::target(&key)?;
    comment_on(&state, &target, &comment_id).await?;

    let comment = state
        .db
        .update_comment(
            &comment_id,
            Box::new(move |c| {
                toggle_like(&mut c.liked_by, &user_id);
            }),
        )
        .await?;
    Ok(Json(comment.into()))
}

pub async fn reaction<S: CommentScope>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((key, comment_id)): Path<(String, String)>,
) -> Result<Json<CommentReactionResponse>, ApiError> {
    let target = S::target(&key)?;
    let comment = comment_on(&state, &target, &comment_id).await?;
    Ok(Json(CommentReactionResponse {
        liked: comment.liked_by.iter().any(|u| *u == user_id),
    }))
}
