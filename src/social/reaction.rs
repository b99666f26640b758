use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

/// Like and dislike sets of one entity. A user id is in at most one of them.
/// Most recent reactor first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    pub liked_by: Vec<String>,
    pub disliked_by: Vec<String>,
}

impl Reactions {
    /// Toggle `kind` for `user_id`. Adding a reaction drops the opposing one;
    /// applying the same kind twice removes it again.
    pub fn apply(&mut self, user_id: &str, kind: ReactionKind) {
        let (target, opposing) = match kind {
            ReactionKind::Like => (&mut self.liked_by, &mut self.disliked_by),
            ReactionKind::Dislike => (&mut self.disliked_by, &mut self.liked_by),
        };

        if target.iter().any(|u| u == user_id) {
            target.retain(|u| u != user_id);
        } else {
            target.insert(0, user_id.to_string());
            opposing.retain(|u| u != user_id);
        }
    }

    pub fn has(&self, user_id: &str, kind: ReactionKind) -> bool {
        let set = match kind {
            ReactionKind::Like => &self.liked_by,
            ReactionKind::Dislike => &self.disliked_by,
        };
        set.iter().any(|u| u == user_id)
    }

    pub fn likes(&self) -> usize {
        self.liked_by.len()
    }

    pub fn dislikes(&self) -> usize {
        self.disliked_by.len()
    }

    /// Likes minus dislikes.
    pub fn helpfulness(&self) -> i64 {
        self.likes() as i64 - self.dislikes() as i64
    }
}

/// Like-only toggle used by comments and posts. Returns whether the user
/// likes the entity afterwards.
pub fn toggle_like(liked_by: &mut Vec<String>, user_id: &str) -> bool {
    if liked_by.iter().any(|u| u == user_id) {
        liked_by.retain(|u| u != user_id);
        false
    } else {
        liked_by.insert(0, user_id.to_string());
        true
    }
}
