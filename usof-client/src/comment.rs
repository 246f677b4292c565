use crate::api::{self, CommentId, CommentStatus, PostId, Time, User};

/// A comment as held by the store, with aggregate counters always concrete.
///
/// Built from the wire shape via `From<api::Comment>`; counters the server
/// left out default to zero until enrichment fills them in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: Option<PostId>,
    pub parent_id: Option<CommentId>,
    pub author: Option<User>,
    pub content: String,
    pub created_at: Time,
    pub likes_count: u32,
    pub dislikes_count: u32,
    pub reply_count: u32,
    pub status: CommentStatus,
    pub locked: bool,
}

impl From<api::Comment> for Comment {
    fn from(c: api::Comment) -> Comment {
        Comment {
            id: c.id,
            post_id: c.post_id,
            parent_id: c.parent_id,
            author: c.author,
            content: c.content,
            created_at: c.created_at,
            likes_count: c.likes_count.unwrap_or(0),
            dislikes_count: c.dislikes_count.unwrap_or(0),
            reply_count: c.reply_count.unwrap_or(0),
            status: c.status,
            locked: c.locked,
        }
    }
}
