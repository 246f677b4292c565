use async_trait::async_trait;

use crate::{
    Comment, CommentId, CommentStatus, Error, NewComment, Page, PostId, Reaction, ReactionType,
    User, UserId,
};

/// The REST surface the comment store depends on.
///
/// Implemented over HTTP by `usof-client::RestGateway` and in memory by
/// `usof-mock-server::MockServer`. List results are already normalized to a
/// [`Page`] here, so the array-vs-envelope variability of the backend never
/// leaks past the gateway.
#[async_trait]
pub trait CommentGateway {
    /// Lists all top-level comments of a post, in server order.
    async fn list_comments(&mut self, post: PostId) -> Result<Page<Comment>, Error>;

    /// Lists one page of direct replies under `parent`. `page` is 1-based.
    async fn list_replies(
        &mut self,
        post: PostId,
        parent: CommentId,
        page: u32,
        limit: u32,
    ) -> Result<Page<Comment>, Error>;

    async fn list_reactions(&mut self, comment: CommentId) -> Result<Vec<Reaction>, Error>;

    async fn create_comment(&mut self, post: PostId, new: NewComment) -> Result<Comment, Error>;

    async fn delete_comment(&mut self, comment: CommentId) -> Result<CommentId, Error>;

    async fn set_reaction(&mut self, comment: CommentId, kind: ReactionType) -> Result<(), Error>;

    async fn clear_reaction(&mut self, comment: CommentId) -> Result<(), Error>;

    async fn set_status(
        &mut self,
        comment: CommentId,
        status: CommentStatus,
    ) -> Result<Comment, Error>;

    /// Pins a top-level comment so it sorts first under its post.
    async fn pin_comment(&mut self, post: PostId, comment: CommentId) -> Result<Comment, Error>;

    async fn unpin_comment(&mut self, post: PostId, comment: CommentId) -> Result<Comment, Error>;

    /// Fetches a user snapshot, used to backfill missing comment authors.
    async fn get_user(&mut self, user: UserId) -> Result<User, Error>;
}
