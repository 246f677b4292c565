use std::sync::Arc;

use crate::Comment;

/// Pinned comments first, then oldest first, comment id as a tie-break.
///
/// Stable, so comments the comparator considers equal keep their server
/// order.
pub fn sort_top_level(comments: &mut [Arc<Comment>]) {
    comments.sort_by_key(|c| (!c.locked, c.created_at, c.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommentId, CommentStatus, Uuid};
    use chrono::TimeZone;

    fn comment(t: i64, locked: bool) -> Arc<Comment> {
        Arc::new(Comment {
            id: CommentId(Uuid::new_v4()),
            post_id: None,
            parent_id: None,
            author: None,
            content: String::new(),
            created_at: chrono::Utc.timestamp_opt(t, 0).unwrap(),
            likes_count: 0,
            dislikes_count: 0,
            reply_count: 0,
            status: CommentStatus::Active,
            locked,
        })
    }

    #[test]
    fn pinned_sorts_first() {
        let a = comment(1, false);
        let b = comment(2, true);
        let c = comment(3, false);
        let mut list = vec![a.clone(), b.clone(), c.clone()];
        sort_top_level(&mut list);
        assert_eq!(
            list.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![b.id, a.id, c.id],
        );
    }

    #[test]
    fn equal_timestamps_tie_break_on_id() {
        let mut list = vec![comment(5, false), comment(5, false), comment(5, false)];
        sort_top_level(&mut list);
        let mut ids = list.iter().map(|c| c.id).collect::<Vec<_>>();
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
