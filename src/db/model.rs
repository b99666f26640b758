use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::social::{Owned, Reactions};

/// Upper bound on the number of tags kept on a review or bookmark.
pub const MAX_TAGS: usize = 20;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Out-of-range ratings are clamped, never rejected.
pub fn clamp_rating(rating: f64) -> f64 {
    rating.clamp(MIN_RATING, MAX_RATING)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub nickname: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub movie_id: i64,
    pub rating: f64,
    pub content: String,
    pub tags: Vec<String>,
    pub is_spoiler: bool,
    pub reactions: Reactions,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// What a comment hangs off.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentTarget {
    Review(String),
    Movie(i64),
    Post(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub target: CommentTarget,
    pub user_id: String,
    pub content: String,
    pub is_spoiler: bool,
    /// None for a root comment, otherwise the id of a root comment.
    pub parent_id: Option<String>,
    pub liked_by: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub movie_id: i64,
    pub movie_title: String,
    pub movie_poster: Option<String>,
    pub movie_release_date: Option<String>,
    pub tags: Vec<String>,
    pub is_watched: bool,
    #[serde(rename = "createdAt")]
    pub created: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub movie_id: i64,
    pub movie_title: String,
    pub movie_poster: Option<String>,
    pub rating: f64,
    pub liked_by: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Owned for Review {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Owned for Bookmark {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Owned for Post {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {entity}")]
    AlreadyExists {
        entity: &'static str,
        existing_id: Option<String>,
    },
}

pub type DbResult<T> = Result<T, DbError>;
