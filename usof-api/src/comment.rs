use uuid::Uuid;

use crate::{PostId, Time, User, UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

/// Moderation visibility flag.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Active,
    Inactive,
}

/// A comment as the backend serializes it.
///
/// Aggregate counters and the author snapshot are not always hydrated by the
/// server; `usof-client` backfills them best-effort from the reaction and
/// user endpoints.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub post_id: Option<PostId>,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    #[serde(default)]
    pub author_id: Option<UserId>,
    #[serde(default)]
    pub author: Option<User>,
    pub content: String,
    #[serde(alias = "publishDate")]
    pub created_at: Time,
    #[serde(default)]
    pub likes_count: Option<u32>,
    #[serde(default)]
    pub dislikes_count: Option<u32>,
    #[serde(default)]
    pub reply_count: Option<u32>,
    #[serde(default)]
    pub status: CommentStatus,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::validate_string(&self.content)?;
        if self.content.trim().is_empty() {
            return Err(crate::Error::EmptyContent);
        }
        Ok(())
    }
}
