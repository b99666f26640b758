pub mod auth;
pub mod bookmarks;
pub mod comments;
pub mod error;
pub mod movies;
pub mod posts;
pub mod reviews;
pub mod types;
pub mod users;

pub use auth::{auth_middleware, AuthUser, CallerId};
pub use error::{ApiError, ApiJson};

/// Movie id from a path segment. Zero and non-integers are rejected.
pub fn movie_id_param(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| ApiError::validation(format!("Invalid movie id: {}", raw)))
}
