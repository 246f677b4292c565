use crate::UserId;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Dislike,
}

/// One user's reaction to a comment, as listed by `GET /comments/{id}/like`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: ReactionType,
}

/// Returns `(likes, dislikes)` aggregated over a reaction list.
pub fn count_reactions(reactions: &[Reaction]) -> (u32, u32) {
    let mut likes = 0;
    let mut dislikes = 0;
    for r in reactions {
        match r.kind {
            ReactionType::Like => likes += 1,
            ReactionType::Dislike => dislikes += 1,
        }
    }
    (likes, dislikes)
}
