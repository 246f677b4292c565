use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use usof_api::{
    Comment, CommentGateway, CommentId, CommentStatus, Error, NewComment, Page, PostId, Reaction,
    ReactionType, Time, User, UserId, Uuid,
};

/// In-memory stand-in for the USOF backend, for driving `CommentStore` in
/// tests without a network.
///
/// `dehydrated` mode strips counters and author snapshots from list
/// responses, the way older backend revisions did, to exercise the client's
/// best-effort enrichment. `failing` makes the list endpoints error.
pub struct MockServer {
    me: Option<UserId>,
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<PostId, Vec<CommentId>>,
    comments: BTreeMap<CommentId, MockComment>,
    dehydrated: bool,
    failing: bool,
    failing_reactions: bool,
}

#[derive(Debug)]
struct MockComment {
    post: PostId,
    parent: Option<CommentId>,
    author: Option<UserId>,
    content: String,
    created_at: Time,
    status: CommentStatus,
    locked: bool,
    children: Vec<CommentId>,
    reactions: HashMap<UserId, ReactionType>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            me: None,
            users: BTreeMap::new(),
            posts: BTreeMap::new(),
            comments: BTreeMap::new(),
            dehydrated: false,
            failing: false,
            failing_reactions: false,
        }
    }

    /// Registers `user` and makes it the acting session user.
    pub fn log_in(&mut self, user: User) {
        self.me = Some(user.id);
        self.users.insert(user.id, user);
    }

    pub fn seed_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn seed_post(&mut self, post: PostId) {
        self.posts.entry(post).or_insert_with(Vec::new);
    }

    /// Panics on a dangling parent; seeding bugs should fail loudly.
    pub fn seed_comment(
        &mut self,
        post: PostId,
        parent: Option<CommentId>,
        author: Option<UserId>,
        content: &str,
        created_at: Time,
    ) -> CommentId {
        let id = CommentId(Uuid::new_v4());
        if let Some(parent) = parent {
            self.comments
                .get_mut(&parent)
                .unwrap_or_else(|| panic!("seeding reply under unknown parent {parent:?}"))
                .children
                .push(id);
        } else {
            self.posts.entry(post).or_insert_with(Vec::new).push(id);
        }
        self.comments.insert(
            id,
            MockComment {
                post,
                parent,
                author,
                content: content.to_string(),
                created_at,
                status: CommentStatus::Active,
                locked: false,
                children: Vec::new(),
                reactions: HashMap::new(),
            },
        );
        id
    }

    pub fn seed_locked(&mut self, comment: CommentId) {
        self.comments
            .get_mut(&comment)
            .unwrap_or_else(|| panic!("locking unknown comment {comment:?}"))
            .locked = true;
    }

    pub fn seed_reaction(&mut self, comment: CommentId, user: UserId, kind: ReactionType) {
        self.comments
            .get_mut(&comment)
            .unwrap_or_else(|| panic!("reacting on unknown comment {comment:?}"))
            .reactions
            .insert(user, kind);
    }

    pub fn set_dehydrated(&mut self, dehydrated: bool) {
        self.dehydrated = dehydrated;
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Only the reaction-list endpoint errors; list endpoints keep working.
    pub fn set_failing_reactions(&mut self, failing: bool) {
        self.failing_reactions = failing;
    }

    /// Number of comments currently stored, cascaded deletes included.
    pub fn test_comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn test_has_comment(&self, comment: CommentId) -> bool {
        self.comments.contains_key(&comment)
    }

    fn wire(&self, id: CommentId) -> Comment {
        let c = &self.comments[&id];
        let (likes, dislikes) = {
            let mut likes = 0;
            let mut dislikes = 0;
            for kind in c.reactions.values() {
                match kind {
                    ReactionType::Like => likes += 1,
                    ReactionType::Dislike => dislikes += 1,
                }
            }
            (likes, dislikes)
        };
        Comment {
            id,
            post_id: Some(c.post),
            parent_id: c.parent,
            author_id: c.author,
            author: match self.dehydrated {
                true => None,
                false => c.author.and_then(|a| self.users.get(&a).cloned()),
            },
            content: c.content.clone(),
            created_at: c.created_at,
            likes_count: (!self.dehydrated).then_some(likes),
            dislikes_count: (!self.dehydrated).then_some(dislikes),
            reply_count: Some(c.children.len() as u32),
            status: c.status,
            locked: c.locked,
        }
    }

    fn get(&self, id: CommentId) -> Result<&MockComment, Error> {
        self.comments.get(&id).ok_or(Error::NotFound(id.0))
    }

    fn get_mut(&mut self, id: CommentId) -> Result<&mut MockComment, Error> {
        self.comments.get_mut(&id).ok_or(Error::NotFound(id.0))
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl CommentGateway for MockServer {
    async fn list_comments(&mut self, post: PostId) -> Result<Page<Comment>, Error> {
        if self.failing {
            return Err(Error::Unknown(String::from("mock server failure")));
        }
        let ids = self.posts.get(&post).cloned().unwrap_or_default();
        Ok(Page::plain(ids.iter().map(|id| self.wire(*id)).collect()))
    }

    async fn list_replies(
        &mut self,
        _post: PostId,
        parent: CommentId,
        page: u32,
        limit: u32,
    ) -> Result<Page<Comment>, Error> {
        if self.failing {
            return Err(Error::Unknown(String::from("mock server failure")));
        }
        let children = self.get(parent)?.children.clone();
        let page = page.max(1);
        let items = children
            .iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .map(|id| self.wire(*id))
            .collect();
        Ok(Page {
            items,
            total: children.len() as u32,
            page: Some(page),
            limit: Some(limit),
        })
    }

    async fn list_reactions(&mut self, comment: CommentId) -> Result<Vec<Reaction>, Error> {
        if self.failing || self.failing_reactions {
            return Err(Error::Unknown(String::from("mock server failure")));
        }
        Ok(self
            .get(comment)?
            .reactions
            .iter()
            .map(|(user_id, kind)| Reaction {
                user_id: *user_id,
                kind: *kind,
            })
            .collect())
    }

    async fn create_comment(&mut self, post: PostId, new: NewComment) -> Result<Comment, Error> {
        new.validate()?;
        let author = self.me.ok_or(Error::PermissionDenied)?;
        if let Some(parent) = new.parent_id {
            if self.get(parent)?.post != post {
                return Err(Error::NotFound(parent.0));
            }
        }
        let id = self.seed_comment(post, new.parent_id, Some(author), &new.content, Utc::now());
        Ok(self.wire(id))
    }

    async fn delete_comment(&mut self, comment: CommentId) -> Result<CommentId, Error> {
        let c = self.get(comment)?;
        let (post, parent) = (c.post, c.parent);
        match parent {
            Some(parent) => {
                if let Ok(p) = self.get_mut(parent) {
                    p.children.retain(|id| *id != comment);
                }
            }
            None => {
                if let Some(top) = self.posts.get_mut(&post) {
                    top.retain(|id| *id != comment);
                }
            }
        }
        // Cascade to descendants, like the real backend does
        let mut stack = vec![comment];
        while let Some(id) = stack.pop() {
            if let Some(c) = self.comments.remove(&id) {
                stack.extend(c.children);
            }
        }
        Ok(comment)
    }

    async fn set_reaction(&mut self, comment: CommentId, kind: ReactionType) -> Result<(), Error> {
        let me = self.me.ok_or(Error::PermissionDenied)?;
        self.get_mut(comment)?.reactions.insert(me, kind);
        Ok(())
    }

    async fn clear_reaction(&mut self, comment: CommentId) -> Result<(), Error> {
        let me = self.me.ok_or(Error::PermissionDenied)?;
        self.get_mut(comment)?.reactions.remove(&me);
        Ok(())
    }

    async fn set_status(
        &mut self,
        comment: CommentId,
        status: CommentStatus,
    ) -> Result<Comment, Error> {
        self.get_mut(comment)?.status = status;
        Ok(self.wire(comment))
    }

    async fn pin_comment(&mut self, post: PostId, comment: CommentId) -> Result<Comment, Error> {
        let c = self.get_mut(comment)?;
        if c.post != post {
            return Err(Error::NotFound(comment.0));
        }
        if c.parent.is_some() {
            return Err(Error::CannotPinReply(comment.0));
        }
        c.locked = true;
        Ok(self.wire(comment))
    }

    async fn unpin_comment(&mut self, post: PostId, comment: CommentId) -> Result<Comment, Error> {
        let c = self.get_mut(comment)?;
        if c.post != post {
            return Err(Error::NotFound(comment.0));
        }
        if c.parent.is_some() {
            return Err(Error::CannotPinReply(comment.0));
        }
        c.locked = false;
        Ok(self.wire(comment))
    }

    async fn get_user(&mut self, user: UserId) -> Result<User, Error> {
        self.users.get(&user).cloned().ok_or(Error::NotFound(user.0))
    }
}
