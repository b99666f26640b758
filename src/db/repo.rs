use async_trait::async_trait;

use super::model::*;

/// In-place edit applied while the store holds its write lock.
pub type Mutation<'a, T> = Box<dyn FnOnce(&mut T) + Send + 'a>;

/// Linear-scan filter.
pub type Predicate<'a, T> = &'a (dyn Fn(&T) -> bool + Send + Sync);

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_user(&self, id: &str) -> DbResult<User>;
    async fn user_exists(&self, id: &str) -> DbResult<bool>;
    /// Fails with `AlreadyExists` when the login id is taken.
    async fn insert_user(&self, user: User) -> DbResult<()>;
    async fn update_user(&self, id: &str, f: Mutation<'_, User>) -> DbResult<User>;
    async fn delete_user(&self, id: &str) -> DbResult<User>;
}

#[async_trait]
pub trait ReviewRepo: Send + Sync {
    async fn get_review(&self, id: &str) -> DbResult<Review>;
    /// Matching reviews, newest insert first.
    async fn find_reviews(&self, pred: Predicate<'_, Review>) -> DbResult<Vec<Review>>;
    /// Fails with `AlreadyExists` when the user already reviewed the movie.
    async fn insert_review(&self, review: Review) -> DbResult<()>;
    async fn update_review(&self, id: &str, f: Mutation<'_, Review>) -> DbResult<Review>;
    /// Removes the review and every comment on it in one step. Returns the
    /// review and the number of comments removed.
    async fn delete_review_with_comments(&self, id: &str) -> DbResult<(Review, usize)>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn get_comment(&self, id: &str) -> DbResult<Comment>;
    /// Matching comments, newest insert first.
    async fn find_comments(&self, pred: Predicate<'_, Comment>) -> DbResult<Vec<Comment>>;
    /// Stores `comment`, attaching it to the root of `reply_to` when that
    /// resolves to a root comment on the same target. Returns what was stored.
    /// Fails with `NotFound` when a review or post target does not exist.
    async fn insert_comment(&self, comment: Comment, reply_to: Option<&str>) -> DbResult<Comment>;
    async fn update_comment(&self, id: &str, f: Mutation<'_, Comment>) -> DbResult<Comment>;
    /// Removes the comment and its direct replies. Returns the removed ids.
    async fn delete_comment_thread(&self, id: &str) -> DbResult<Vec<String>>;
}

#[async_trait]
pub trait BookmarkRepo: Send + Sync {
    async fn get_bookmark(&self, id: &str) -> DbResult<Bookmark>;
    /// Matching bookmarks, newest insert first.
    async fn find_bookmarks(&self, pred: Predicate<'_, Bookmark>) -> DbResult<Vec<Bookmark>>;
    /// Fails with `AlreadyExists` carrying the existing bookmark id when the
    /// user already bookmarked the movie.
    async fn insert_bookmark(&self, bookmark: Bookmark) -> DbResult<()>;
    async fn update_bookmark(&self, id: &str, f: Mutation<'_, Bookmark>) -> DbResult<Bookmark>;
    async fn delete_bookmark(&self, id: &str) -> DbResult<Bookmark>;
}

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn get_post(&self, id: &str) -> DbResult<Post>;
    /// Matching posts, newest insert first.
    async fn find_posts(&self, pred: Predicate<'_, Post>) -> DbResult<Vec<Post>>;
    async fn insert_post(&self, post: Post) -> DbResult<()>;
    async fn update_post(&self, id: &str, f: Mutation<'_, Post>) -> DbResult<Post>;
    /// Removes the post and every comment on it in one step.
    async fn delete_post_with_comments(&self, id: &str) -> DbResult<(Post, usize)>;
}

pub trait Repository: UserRepo + ReviewRepo + CommentRepo + BookmarkRepo + PostRepo + Send + Sync {}

impl<T> Repository for T where T: UserRepo + ReviewRepo + CommentRepo + BookmarkRepo + PostRepo + Send + Sync {}
