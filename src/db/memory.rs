use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::model::*;
use super::repo::*;
use crate::social::thread;

/// Process-memory store. One ordered table per entity type; lookups are
/// linear scans. Every check-then-write runs under the table's write lock,
/// so uniqueness holds with concurrent requests.
///
/// Operations spanning two tables lock `reviews` or `posts` before
/// `comments`, never the other way round.
#[derive(Default)]
pub struct MemoryRepository {
    users: RwLock<Vec<User>>,
    reviews: RwLock<Vec<Review>>,
    comments: RwLock<Vec<Comment>>,
    bookmarks: RwLock<Vec<Bookmark>>,
    posts: RwLock<Vec<Post>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_newest_first<T: Clone>(table: &[T], pred: Predicate<'_, T>) -> Vec<T> {
    table.iter().rev().filter(|t| pred(t)).cloned().collect()
}

fn position<T>(table: &[T], what: &str, id: &str, key: impl Fn(&T) -> &str) -> DbResult<usize> {
    table
        .iter()
        .position(|t| key(t) == id)
        .ok_or_else(|| DbError::NotFound(format!("{} not found: {}", what, id)))
}

fn remove_comments_on(comments: &mut Vec<Comment>, target: &CommentTarget) -> usize {
    let before = comments.len();
    comments.retain(|c| &c.target != target);
    before - comments.len()
}

#[async_trait]
impl UserRepo for MemoryRepository {
    async fn get_user(&self, id: &str) -> DbResult<User> {
        let users = self.users.read().await;
        let idx = position(users.as_slice(), "user", id, |u| &u.id)?;
        Ok(users[idx].clone())
    }

    async fn user_exists(&self, id: &str) -> DbResult<bool> {
        Ok(self.users.read().await.iter().any(|u| u.id == id))
    }

    async fn insert_user(&self, user: User) -> DbResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id == user.id) {
            return Err(DbError::AlreadyExists {
                entity: "user",
                existing_id: Some(user.id),
            });
        }
        users.push(user);
        Ok(())
    }

    async fn update_user(&self, id: &str, f: Mutation<'_, User>) -> DbResult<User> {
        let mut users = self.users.write().await;
        let idx = position(users.as_slice(), "user", id, |u| &u.id)?;
        f(&mut users[idx]);
        Ok(users[idx].clone())
    }

    async fn delete_user(&self, id: &str) -> DbResult<User> {
        let mut users = self.users.write().await;
        let idx = position(users.as_slice(), "user", id, |u| &u.id)?;
        Ok(users.remove(idx))
    }
}

#[async_trait]
impl ReviewRepo for MemoryRepository {
    async fn get_review(&self, id: &str) -> DbResult<Review> {
        let reviews = self.reviews.read().await;
        let idx = position(reviews.as_slice(), "review", id, |r| &r.id)?;
        Ok(reviews[idx].clone())
    }

    async fn find_reviews(&self, pred: Predicate<'_, Review>) -> DbResult<Vec<Review>> {
        Ok(find_newest_first(self.reviews.read().await.as_slice(), pred))
    }

    async fn insert_review(&self, review: Review) -> DbResult<()> {
        let mut reviews = self.reviews.write().await;
        if let Some(existing) = reviews
            .iter()
            .find(|r| r.user_id == review.user_id && r.movie_id == review.movie_id)
        {
            return Err(DbError::AlreadyExists {
                entity: "review",
                existing_id: Some(existing.id.clone()),
            });
        }
        reviews.push(review);
        Ok(())
    }

    async fn update_review(&self, id: &str, f: Mutation<'_, Review>) -> DbResult<Review> {
        let mut reviews = self.reviews.write().await;
        let idx = position(reviews.as_slice(), "review", id, |r| &r.id)?;
        f(&mut reviews[idx]);
        Ok(reviews[idx].clone())
    }

    async fn delete_review_with_comments(&self, id: &str) -> DbResult<(Review, usize)> {
        let mut reviews = self.reviews.write().await;
        let idx = position(reviews.as_slice(), "review", id, |r| &r.id)?;
        let mut comments = self.comments.write().await;

        let removed = remove_comments_on(&mut comments, &CommentTarget::Review(id.to_string()));
        Ok((reviews.remove(idx), removed))
    }
}

#[async_trait]
impl CommentRepo for MemoryRepository {
    async fn get_comment(&self, id: &str) -> DbResult<Comment> {
        let comments = self.comments.read().await;
        let idx = position(comments.as_slice(), "comment", id, |c| &c.id)?;
        Ok(comments[idx].clone())
    }

    async fn find_comments(&self, pred: Predicate<'_, Comment>) -> DbResult<Vec<Comment>> {
        Ok(find_newest_first(self.comments.read().await.as_slice(), pred))
    }

    async fn insert_comment(&self, mut comment: Comment, reply_to: Option<&str>) -> DbResult<Comment> {
        // Target guards stay alive until the comment is pushed.
        let _reviews;
        let _posts;
        match &comment.target {
            CommentTarget::Review(id) => {
                let reviews = self.reviews.read().await;
                position(reviews.as_slice(), "review", id, |r| &r.id)?;
                _reviews = reviews;
            }
            CommentTarget::Post(id) => {
                let posts = self.posts.read().await;
                position(posts.as_slice(), "post", id, |p| &p.id)?;
                _posts = posts;
            }
            CommentTarget::Movie(_) => {}
        }

        let mut comments = self.comments.write().await;
        thread::attach_to_root(&comments, &mut comment, reply_to);
        if reply_to.is_some() && comment.parent_id.is_none() {
            debug!(
                comment_id = %comment.id,
                reply_to = reply_to.unwrap_or_default(),
                "Reply target did not resolve, storing as root comment"
            );
        }
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, id: &str, f: Mutation<'_, Comment>) -> DbResult<Comment> {
        let mut comments = self.comments.write().await;
        let idx = position(comments.as_slice(), "comment", id, |c| &c.id)?;
        f(&mut comments[idx]);
        Ok(comments[idx].clone())
    }

    async fn delete_comment_thread(&self, id: &str) -> DbResult<Vec<String>> {
        let mut comments = self.comments.write().await;
        position(comments.as_slice(), "comment", id, |c| &c.id)?;

        let doomed = thread::cascade_ids(&comments, id);
        let mut removed = Vec::with_capacity(doomed.len());
        comments.retain(|c| {
            if doomed.contains(&c.id) {
                removed.push(c.id.clone());
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}

#[async_trait]
impl BookmarkRepo for MemoryRepository {
    async fn get_bookmark(&self, id: &str) -> DbResult<Bookmark> {
        let bookmarks = self.bookmarks.read().await;
        let idx = position(bookmarks.as_slice(), "bookmark", id, |b| &b.id)?;
        Ok(bookmarks[idx].clone())
    }

    async fn find_bookmarks(&self, pred: Predicate<'_, Bookmark>) -> DbResult<Vec<Bookmark>> {
        Ok(find_newest_first(self.bookmarks.read().await.as_slice(), pred))
    }

    async fn insert_bookmark(&self, bookmark: Bookmark) -> DbResult<()> {
        let mut bookmarks = self.bookmarks.write().await;
        if let Some(existing) = bookmarks
            .iter()
            .find(|b| b.user_id == bookmark.user_id && b.movie_id == bookmark.movie_id)
        {
            return Err(DbError::AlreadyExists {
                entity: "bookmark",
                existing_id: Some(existing.id.clone()),
            });
        }
        bookmarks.push(bookmark);
        Ok(())
    }

    async fn update_bookmark(&self, id: &str, f: Mutation<'_, Bookmark>) -> DbResult<Bookmark> {
        let mut bookmarks = self.bookmarks.write().await;
        let idx = position(bookmarks.as_slice(), "bookmark", id, |b| &b.id)?;
        f(&mut bookmarks[idx]);
        Ok(bookmarks[idx].clone())
    }

    async fn delete_bookmark(&self, id: &str) -> DbResult<Bookmark> {
        let mut bookmarks = self.bookmarks.write().await;
        let idx = position(bookmarks.as_slice(), "bookmark", id, |b| &b.id)?;
        Ok(bookmarks.remove(idx))
    }
}

#[async_trait]
impl PostRepo for MemoryRepository {
    async fn get_post(&self, id: &str) -> DbResult<Post> {
        let posts = self.posts.read().await;
        let idx = position(posts.as_slice(), "post", id, |p| &p.id)?;
        Ok(posts[idx].clone())
    }

    async fn find_posts(&self, pred: Predicate<'_, Post>) -> DbResult<Vec<Post>> {
        Ok(find_newest_first(self.posts.read().await.as_slice(), pred))
    }

    async fn insert_post(&self, post: Post) -> DbResult<()> {
        self.posts.write().await.push(post);
        Ok(())
    }

    async fn update_post(&self, id: &str, f: Mutation<'_, Post>) -> DbResult<Post> {
        let mut posts = self.posts.write().await;
        let idx = position(posts.as_slice(), "post", id, |p| &p.id)?;
        f(&mut posts[idx]);
        Ok(posts[idx].clone())
    }

    async fn delete_post_with_comments(&self, id: &str) -> DbResult<(Post, usize)> {
        let mut posts = self.posts.write().await;
        let idx = position(posts.as_slice(), "post", id, |p| &p.id)?;
        let mut comments = self.comments.write().await;

        let removed = remove_comments_on(&mut comments, &CommentTarget::Post(id.to_string()));
        Ok((posts.remove(idx), removed))
    }
}
