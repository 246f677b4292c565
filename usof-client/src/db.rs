use std::{collections::HashMap, sync::Arc};

use crate::{
    api::{CommentId, CommentStatus, PostId, ReactionType},
    order, reaction, Comment,
};

// Guard for walks up the parent chain; reply trees are never this deep.
const MAX_REPLY_DEPTH: usize = 64;

/// Where a comment currently lives in the normalized store: either in a
/// post's top-level list or in exactly one parent's reply bucket.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot {
    Top(PostId),
    Reply(CommentId),
}

/// Pagination window over one parent comment's direct replies.
///
/// `page` and `limit` echo the most recent successful fetch; "load more"
/// requests `page + 1`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplyBucket {
    pub items: Vec<Arc<Comment>>,
    pub total: u32,
    pub page: u32,
    pub limit: u32,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ReplyBucket {
    fn default() -> ReplyBucket {
        ReplyBucket {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit: 20,
            loading: false,
            error: None,
        }
    }
}

/// The normalized comment store.
///
/// Every comment id appears in at most one place (a top-level list XOR one
/// reply bucket); `slots` is the index enforcing that, and every mutation
/// resolves its target through it at apply-time.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentDb {
    top_level: HashMap<PostId, Vec<Arc<Comment>>>,
    replies: HashMap<CommentId, ReplyBucket>,
    slots: HashMap<CommentId, Slot>,
    my_reactions: HashMap<CommentId, ReactionType>,
}

impl CommentDb {
    pub fn new() -> CommentDb {
        CommentDb::default()
    }

    pub fn top_level(&self, post: PostId) -> Option<&[Arc<Comment>]> {
        self.top_level.get(&post).map(|list| list.as_slice())
    }

    pub fn bucket(&self, parent: CommentId) -> Option<&ReplyBucket> {
        self.replies.get(&parent)
    }

    pub fn slot_of(&self, id: CommentId) -> Option<Slot> {
        self.slots.get(&id).copied()
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn my_reaction(&self, id: CommentId) -> Option<ReactionType> {
        self.my_reactions.get(&id).copied()
    }

    pub fn comment(&self, id: CommentId) -> Option<&Arc<Comment>> {
        match *self.slots.get(&id)? {
            Slot::Top(post) => self.top_level.get(&post)?.iter().find(|c| c.id == id),
            Slot::Reply(parent) => self.replies.get(&parent)?.items.iter().find(|c| c.id == id),
        }
    }

    /// Post owning `id`, resolved by walking the slot index up to a
    /// top-level comment.
    pub fn post_of(&self, id: CommentId) -> Option<PostId> {
        let mut cur = id;
        for _ in 0..MAX_REPLY_DEPTH {
            match *self.slots.get(&cur)? {
                Slot::Top(post) => return Some(post),
                Slot::Reply(parent) => cur = parent,
            }
        }
        None
    }

    /// Replaces a post's top-level list and sorts it pinned-first, then by
    /// timestamp, then by id. Reply buckets of dropped comments persist.
    pub fn set_top_level(&mut self, post: PostId, comments: Vec<Comment>) {
        if let Some(old) = self.top_level.remove(&post) {
            for c in &old {
                if self.slots.get(&c.id) == Some(&Slot::Top(post)) {
                    self.slots.remove(&c.id);
                }
            }
        }
        let mut list = Vec::with_capacity(comments.len());
        for c in comments {
            self.evict(c.id);
            self.slots.insert(c.id, Slot::Top(post));
            list.push(Arc::new(c));
        }
        order::sort_top_level(&mut list);
        self.top_level.insert(post, list);
    }

    /// Prepends a freshly created top-level comment (newest first).
    pub fn insert_top(&mut self, post: PostId, comment: Comment) {
        self.evict(comment.id);
        self.slots.insert(comment.id, Slot::Top(post));
        self.top_level
            .entry(post)
            .or_insert_with(Vec::new)
            .insert(0, Arc::new(comment));
    }

    /// Appends a freshly created reply (oldest first within a thread),
    /// creating the bucket if needed, and bumps the parent's reply count.
    pub fn insert_reply(&mut self, parent: CommentId, comment: Comment) {
        self.evict(comment.id);
        self.slots.insert(comment.id, Slot::Reply(parent));
        let bucket = self.replies.entry(parent).or_default();
        bucket.items.push(Arc::new(comment));
        bucket.total += 1;
        if let Some(p) = self.comment_arc_mut(parent) {
            let p = Arc::make_mut(p);
            p.reply_count += 1;
        }
    }

    pub fn begin_reply_fetch(&mut self, parent: CommentId) {
        let bucket = self.replies.entry(parent).or_default();
        bucket.loading = true;
        bucket.error = None;
    }

    /// Lands one fetched page of replies. Page 1 replaces the window, later
    /// pages append; the server-reported `total` overwrites the parent's
    /// reply count wholesale.
    pub fn finish_reply_fetch(
        &mut self,
        parent: CommentId,
        items: Vec<Comment>,
        total: u32,
        page: u32,
        limit: u32,
    ) {
        if page <= 1 {
            let old = match self.replies.get_mut(&parent) {
                Some(bucket) => std::mem::take(&mut bucket.items),
                None => Vec::new(),
            };
            for c in old {
                if self.slots.get(&c.id) == Some(&Slot::Reply(parent)) {
                    self.slots.remove(&c.id);
                }
            }
        }
        let mut arcs = Vec::with_capacity(items.len());
        for c in items {
            self.evict(c.id);
            self.slots.insert(c.id, Slot::Reply(parent));
            arcs.push(Arc::new(c));
        }
        let bucket = self.replies.entry(parent).or_default();
        bucket.items.extend(arcs);
        bucket.total = total;
        bucket.page = page;
        bucket.limit = limit;
        bucket.loading = false;
        bucket.error = None;
        if let Some(p) = self.comment_arc_mut(parent) {
            Arc::make_mut(p).reply_count = total;
        }
    }

    pub fn fail_reply_fetch(&mut self, parent: CommentId, error: String) {
        let bucket = self.replies.entry(parent).or_default();
        bucket.loading = false;
        bucket.error = Some(error);
    }

    /// Removes a comment wherever it lives, with reply-count bookkeeping.
    /// Returns false (and changes nothing) if the id was never stored.
    pub fn remove(&mut self, id: CommentId) -> bool {
        let Some(slot) = self.slots.remove(&id) else {
            return false;
        };
        match slot {
            Slot::Top(post) => {
                if let Some(list) = self.top_level.get_mut(&post) {
                    list.retain(|c| c.id != id);
                }
            }
            Slot::Reply(parent) => {
                if let Some(bucket) = self.replies.get_mut(&parent) {
                    bucket.items.retain(|c| c.id != id);
                    bucket.total = bucket.total.saturating_sub(1);
                }
                if let Some(p) = self.comment_arc_mut(parent) {
                    let p = Arc::make_mut(p);
                    p.reply_count = p.reply_count.saturating_sub(1);
                }
            }
        }
        self.my_reactions.remove(&id);
        true
    }

    /// Records the current user's reaction and applies the counter delta to
    /// the comment, if it is present anywhere in the store.
    pub fn apply_reaction(&mut self, id: CommentId, next: Option<ReactionType>) {
        let prev = self.my_reactions.get(&id).copied();
        if let Some(c) = self.comment_arc_mut(id) {
            let c = Arc::make_mut(c);
            reaction::apply(&mut c.likes_count, &mut c.dislikes_count, prev, next);
        }
        self.record_my_reaction(id, next);
    }

    /// Remembers what the current user's reaction is without touching any
    /// counter (used when harvesting reaction lists during enrichment).
    pub fn record_my_reaction(&mut self, id: CommentId, mine: Option<ReactionType>) {
        match mine {
            Some(kind) => {
                self.my_reactions.insert(id, kind);
            }
            None => {
                self.my_reactions.remove(&id);
            }
        }
    }

    pub fn patch_status(&mut self, id: CommentId, status: CommentStatus) -> bool {
        match self.comment_arc_mut(id) {
            Some(c) => {
                Arc::make_mut(c).status = status;
                true
            }
            None => false,
        }
    }

    /// Patches the pin flag and re-sorts the post's top-level list.
    pub fn set_locked(&mut self, post: PostId, id: CommentId, locked: bool) -> bool {
        let found = match self.comment_arc_mut(id) {
            Some(c) => {
                Arc::make_mut(c).locked = locked;
                true
            }
            None => false,
        };
        if let Some(list) = self.top_level.get_mut(&post) {
            order::sort_top_level(list);
        }
        found
    }

    /// Drops a post's top-level list plus every reply bucket rooted under
    /// it, keeping the slot index consistent.
    pub fn clear_post(&mut self, post: PostId) {
        let Some(top) = self.top_level.remove(&post) else {
            return;
        };
        let mut stack: Vec<CommentId> = top.iter().map(|c| c.id).collect();
        while let Some(id) = stack.pop() {
            self.slots.remove(&id);
            self.my_reactions.remove(&id);
            if let Some(bucket) = self.replies.remove(&id) {
                stack.extend(bucket.items.iter().map(|c| c.id));
            }
        }
    }

    fn comment_arc_mut(&mut self, id: CommentId) -> Option<&mut Arc<Comment>> {
        let slot = *self.slots.get(&id)?;
        match slot {
            Slot::Top(post) => self
                .top_level
                .get_mut(&post)?
                .iter_mut()
                .find(|c| c.id == id),
            Slot::Reply(parent) => self
                .replies
                .get_mut(&parent)?
                .items
                .iter_mut()
                .find(|c| c.id == id),
        }
    }

    /// Drops a stale occurrence of `id` before re-inserting it elsewhere.
    /// No counter bookkeeping: this is a re-placement, not a deletion.
    fn evict(&mut self, id: CommentId) {
        let Some(slot) = self.slots.remove(&id) else {
            return;
        };
        match slot {
            Slot::Top(post) => {
                if let Some(list) = self.top_level.get_mut(&post) {
                    list.retain(|c| c.id != id);
                }
            }
            Slot::Reply(parent) => {
                if let Some(bucket) = self.replies.get_mut(&parent) {
                    bucket.items.retain(|c| c.id != id);
                }
            }
        }
    }
}
