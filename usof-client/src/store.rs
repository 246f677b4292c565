use crate::{
    api::{
        count_reactions, CommentGateway, CommentId, CommentStatus, Error, NewComment, PostId,
        ReactionType, User,
    },
    reaction, Comment, CommentDb,
};

/// Executes comment intents against a gateway and mirrors the results into
/// a [`CommentDb`].
///
/// Every mutation is confirm-then-apply: the gateway call resolves first,
/// then the local bookkeeping lands. A failed call leaves the store exactly
/// as it was.
pub struct CommentStore<G> {
    db: CommentDb,
    gateway: G,
    me: Option<User>,
}

impl<G: CommentGateway> CommentStore<G> {
    /// `me` is the authenticated session user, used to attribute newly
    /// created comments and to recognize our own entry in reaction lists.
    pub fn new(gateway: G, me: Option<User>) -> CommentStore<G> {
        CommentStore {
            db: CommentDb::new(),
            gateway,
            me,
        }
    }

    pub fn db(&self) -> &CommentDb {
        &self.db
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn me(&self) -> Option<&User> {
        self.me.as_ref()
    }

    /// Fetches and replaces the post's top-level comment list.
    ///
    /// Counter and author enrichment is best-effort: an enrichment failure
    /// defaults the missing fields and never fails the load. A failure of
    /// the list request itself leaves any previously stored list untouched.
    pub async fn load_top_level(&mut self, post: PostId) -> Result<(), Error> {
        let page = self.gateway.list_comments(post).await?;
        let mut comments = Vec::with_capacity(page.items.len());
        for raw in page.items {
            comments.push(self.hydrate(raw).await);
        }
        self.db.set_top_level(post, comments);
        Ok(())
    }

    /// Fetches one page of direct replies under `parent`, which must
    /// already be present in the store (the post is resolved through it).
    /// Page 1 replaces the bucket, later pages append.
    pub async fn load_replies(
        &mut self,
        parent: CommentId,
        page: u32,
        limit: u32,
    ) -> Result<(), Error> {
        let post = self.db.post_of(parent).ok_or(Error::NotFound(parent.0))?;
        self.db.begin_reply_fetch(parent);
        match self.gateway.list_replies(post, parent, page, limit).await {
            Ok(fetched) => {
                let total = fetched.total;
                let got_page = fetched.page.unwrap_or(page);
                let got_limit = fetched.limit.unwrap_or(limit);
                let mut items = Vec::with_capacity(fetched.items.len());
                for raw in fetched.items {
                    items.push(self.hydrate(raw).await);
                }
                self.db
                    .finish_reply_fetch(parent, items, total, got_page, got_limit);
                Ok(())
            }
            Err(err) => {
                self.db.fail_reply_fetch(parent, err.to_string());
                Err(err)
            }
        }
    }

    /// Submits a new comment (a reply when `parent` is set) and inserts the
    /// created comment into the store.
    ///
    /// Empty or whitespace-only content is rejected before any network call
    /// and reported as `Ok(None)`.
    pub async fn add_comment(
        &mut self,
        post: PostId,
        content: &str,
        parent: Option<CommentId>,
    ) -> Result<Option<CommentId>, Error> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        let mut created = self
            .gateway
            .create_comment(
                post,
                NewComment {
                    content: content.to_string(),
                    parent_id: parent,
                },
            )
            .await?;
        created.likes_count = Some(0);
        created.dislikes_count = Some(0);
        created.reply_count.get_or_insert(0);
        if created.author.is_none() {
            created.author = self.me.clone();
        }
        if created.post_id.is_none() {
            created.post_id = Some(post);
        }
        if created.parent_id.is_none() {
            created.parent_id = parent;
        }
        let id = created.id;
        let comment = Comment::from(created);
        match parent {
            Some(parent) => self.db.insert_reply(parent, comment),
            None => self.db.insert_top(post, comment),
        }
        Ok(Some(id))
    }

    /// Deletes a comment server-side, then removes it from wherever the
    /// store holds it. A success for an id the store never had is a no-op.
    pub async fn delete_comment(&mut self, comment: CommentId) -> Result<(), Error> {
        let deleted = self.gateway.delete_comment(comment).await?;
        self.db.remove(deleted);
        Ok(())
    }

    /// Toggles the current user's reaction: the reaction already held is
    /// cleared, anything else is set, with exactly one gateway call either
    /// way. Returns the resulting reaction state.
    pub async fn toggle_reaction(
        &mut self,
        comment: CommentId,
        kind: ReactionType,
    ) -> Result<Option<ReactionType>, Error> {
        let prev = self.db.my_reaction(comment);
        let next = reaction::toggle(prev, kind);
        match next {
            Some(kind) => self.gateway.set_reaction(comment, kind).await?,
            None => self.gateway.clear_reaction(comment).await?,
        }
        self.db.apply_reaction(comment, next);
        Ok(next)
    }

    /// Sets the moderation status. Authorization is the gateway's problem;
    /// a rejection surfaces as the returned error.
    pub async fn set_status(
        &mut self,
        comment: CommentId,
        status: CommentStatus,
    ) -> Result<(), Error> {
        self.gateway.set_status(comment, status).await?;
        self.db.patch_status(comment, status);
        Ok(())
    }

    /// Pins or unpins a top-level comment and re-sorts the post's list.
    pub async fn set_pinned(
        &mut self,
        post: PostId,
        comment: CommentId,
        pinned: bool,
    ) -> Result<(), Error> {
        match pinned {
            true => self.gateway.pin_comment(post, comment).await?,
            false => self.gateway.unpin_comment(post, comment).await?,
        };
        self.db.set_locked(post, comment, pinned);
        Ok(())
    }

    /// Forgets everything stored for a post. Purely local.
    pub fn clear_post(&mut self, post: PostId) {
        self.db.clear_post(post);
    }

    /// Converts a wire comment into a stored one, backfilling aggregate
    /// counters (and our own reaction) from the reaction list and the
    /// author snapshot from the user endpoint when the server omits them.
    async fn hydrate(&mut self, mut raw: crate::api::Comment) -> Comment {
        if raw.likes_count.is_none() || raw.dislikes_count.is_none() {
            match self.gateway.list_reactions(raw.id).await {
                Ok(reactions) => {
                    let (likes, dislikes) = count_reactions(&reactions);
                    raw.likes_count = Some(likes);
                    raw.dislikes_count = Some(dislikes);
                    if let Some(me) = &self.me {
                        let mine = reactions
                            .iter()
                            .find(|r| r.user_id == me.id)
                            .map(|r| r.kind);
                        self.db.record_my_reaction(raw.id, mine);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        comment = ?raw.id,
                        %err,
                        "failed to fetch reaction counts, defaulting to zero"
                    );
                    raw.likes_count.get_or_insert(0);
                    raw.dislikes_count.get_or_insert(0);
                }
            }
        }
        if raw.author.is_none() {
            if let Some(author_id) = raw.author_id {
                raw.author = match self.gateway.get_user(author_id).await {
                    Ok(user) => Some(user),
                    Err(err) => {
                        tracing::warn!(user = ?author_id, %err, "failed to fetch comment author");
                        Some(User::anon(author_id))
                    }
                };
            }
        }
        Comment::from(raw)
    }
}
