use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{Comment, CommentTarget, Post, Review, User};
use crate::util::lenient::{opt_number, opt_strict_bool, opt_tags, opt_text, opt_truthy};

// Accounts

#[derive(Debug, Deserialize)]
pub struct CheckIdRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub current_pw: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub new_pw: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    #[serde(rename = "_id")]
    pub object_id: String,
    pub id: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for SignupResponse {
    fn from(user: &User) -> Self {
        Self {
            object_id: user.id.clone(),
            id: user.id.clone(),
            nickname: user.nickname.clone(),
            created_at: user.created,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub id: String,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `{message, id}` returned by deletes.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
    pub id: String,
}

// Legacy /users bodies.

#[derive(Debug, Deserialize)]
pub struct LegacySignupRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub pw: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub nick: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LegacyLoginRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub pw: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyUpdateRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub nick: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub pw: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub current_pw: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LegacyTokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LegacyAccountResponse {
    pub message: String,
    pub id: String,
    pub nick: String,
}

// Reviews

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[serde(default, deserialize_with = "opt_number")]
    pub movie_id: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "opt_text")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "opt_tags")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "opt_truthy")]
    pub is_spoiler: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[serde(default, deserialize_with = "opt_number")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "opt_text")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "opt_tags")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "opt_truthy")]
    pub is_spoiler: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub movie_id: i64,
    pub rating: f64,
    pub content: String,
    pub likes: usize,
    pub dislikes: usize,
    pub liked_by: Vec<String>,
    pub disliked_by: Vec<String>,
    pub tags: Vec<String>,
    pub is_spoiler: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewDto {
    fn from(r: Review) -> Self {
        Self {
            likes: r.reactions.likes(),
            dislikes: r.reactions.dislikes(),
            id: r.id,
            user_id: r.user_id,
            movie_id: r.movie_id,
            rating: r.rating,
            content: r.content,
            liked_by: r.reactions.liked_by,
            disliked_by: r.reactions.disliked_by,
            tags: r.tags,
            is_spoiler: r.is_spoiler,
            created_at: r.created,
            updated_at: r.updated,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewDto>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatsResponse {
    pub average_rating: f64,
    pub total_reviews: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReactionResponse {
    pub is_liked: bool,
    pub is_disliked: bool,
}

// Comments

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "opt_truthy")]
    pub is_spoiler: Option<bool>,
    #[serde(default, deserialize_with = "opt_text")]
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "opt_truthy")]
    pub is_spoiler: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    pub user_id: String,
    pub content: String,
    pub is_spoiler: bool,
    pub parent_id: Option<String>,
    pub likes_by: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies_count: Option<usize>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(c: Comment) -> Self {
        let (review_id, movie_id, post_id) = match c.target {
            CommentTarget::Review(id) => (Some(id), None, None),
            CommentTarget::Movie(id) => (None, Some(id), None),
            CommentTarget::Post(id) => (None, None, Some(id)),
        };
        Self {
            id: c.id,
            review_id,
            movie_id,
            post_id,
            user_id: c.user_id,
            content: c.content,
            is_spoiler: c.is_spoiler,
            parent_id: c.parent_id,
            likes_by: c.liked_by,
            replies_count: None,
            created_at: c.created,
            updated_at: c.updated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentReactionResponse {
    pub liked: bool,
}

// Bookmarks

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmarkRequest {
    #[serde(default, deserialize_with = "opt_number")]
    pub movie_id: Option<f64>,
    #[serde(default, deserialize_with = "opt_text")]
    pub movie_title: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub movie_poster: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub movie_release_date: Option<String>,
    #[serde(default, deserialize_with = "opt_tags")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "opt_truthy")]
    pub is_watched: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookmarkRequest {
    #[serde(default, deserialize_with = "opt_tags")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "opt_strict_bool")]
    pub is_watched: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<i64>,
    pub bookmarked: bool,
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookmarkStatusList {
    pub items: Vec<BookmarkStatus>,
}

#[derive(Debug, Serialize)]
pub struct BookmarkDeletedResponse {
    pub id: String,
    pub ok: bool,
}

// Posts

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub movie_id: Option<f64>,
    #[serde(default, deserialize_with = "opt_text")]
    pub movie_title: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub movie_poster: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default, deserialize_with = "opt_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub rating: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub movie_id: i64,
    pub movie_title: String,
    pub movie_poster: Option<String>,
    pub rating: f64,
    pub likes: usize,
    pub liked_by: Vec<String>,
    pub comment_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostDto {
    pub fn new(p: Post, comment_count: usize) -> Self {
        Self {
            likes: p.liked_by.len(),
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            content: p.content,
            movie_id: p.movie_id,
            movie_title: p.movie_title,
            movie_poster: p.movie_poster,
            rating: p.rating,
            liked_by: p.liked_by,
            comment_count,
            created_at: p.created,
            updated_at: p.updated,
        }
    }
}

// Misc

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Non-empty after trimming, otherwise None.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Movie ids are positive or negative integers, never zero.
pub fn movie_id(value: Option<f64>) -> Option<i64> {
    value
        .filter(|n| *n != 0.0 && n.fract() == 0.0 && n.abs() < i64::MAX as f64)
        .map(|n| n as i64)
}
