//! One-level comment threads: every reply points at a root comment.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::db::Comment;

/// Parent chains longer than this are treated as corrupt.
const MAX_DEPTH: usize = 64;

/// Walk `parent_id` links up from `comment_id` to the root comment.
/// Returns None when the comment, or any comment on the way up, is missing.
pub fn resolve_root_parent(comments: &[Comment], comment_id: &str) -> Option<String> {
    let find = |id: &str| comments.iter().find(|c| c.id == id);

    let mut current = find(comment_id)?;
    for _ in 0..MAX_DEPTH {
        match current.parent_id.as_deref() {
            None => return Some(current.id.clone()),
            Some(parent) => current = find(parent)?,
        }
    }

    warn!(comment_id, "Parent chain too deep, treating as unresolved");
    None
}

/// Set `comment.parent_id` to the root of `reply_to`. A reference that does
/// not resolve, or resolves to a thread on another target, leaves the
/// comment as a new root.
pub fn attach_to_root(comments: &[Comment], comment: &mut Comment, reply_to: Option<&str>) {
    comment.parent_id = reply_to
        .and_then(|id| resolve_root_parent(comments, id))
        .filter(|root_id| {
            comments
                .iter()
                .any(|c| &c.id == root_id && c.target == comment.target)
        });
}

/// The comment itself plus every comment that names it as parent.
pub fn cascade_ids(comments: &[Comment], comment_id: &str) -> HashSet<String> {
    let mut ids: HashSet<String> = comments
        .iter()
        .filter(|c| c.parent_id.as_deref() == Some(comment_id))
        .map(|c| c.id.clone())
        .collect();
    ids.insert(comment_id.to_string());
    ids
}

/// Reply count per root id.
pub fn reply_counts<'a>(comments: impl IntoIterator<Item = &'a Comment>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for c in comments {
        if let Some(parent) = &c.parent_id {
            *counts.entry(parent.clone()).or_insert(0) += 1;
        }
    }
    counts
}
