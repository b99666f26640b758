//! HTTP integration tests. Each test drives a fresh router with an empty
//! in-memory store through `tower::ServiceExt::oneshot`.

mod bookmarks;
mod comments;
mod movies;
mod posts;
mod reviews;
