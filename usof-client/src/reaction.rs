//! Reaction reconciliation: a user holds at most one reaction per comment.

use crate::api::ReactionType;

/// Next reaction state after requesting `requested` while holding `current`.
///
/// Requesting the reaction already held toggles it off; anything else
/// replaces it.
pub fn toggle(current: Option<ReactionType>, requested: ReactionType) -> Option<ReactionType> {
    match current {
        Some(held) if held == requested => None,
        _ => Some(requested),
    }
}

/// Applies the counter delta for a `prev -> next` transition.
///
/// Decrements saturate at zero to tolerate drift from concurrent external
/// mutation.
pub fn apply(
    likes: &mut u32,
    dislikes: &mut u32,
    prev: Option<ReactionType>,
    next: Option<ReactionType>,
) {
    match prev {
        Some(ReactionType::Like) => *likes = likes.saturating_sub(1),
        Some(ReactionType::Dislike) => *dislikes = dislikes.saturating_sub(1),
        None => (),
    }
    match next {
        Some(ReactionType::Like) => *likes += 1,
        Some(ReactionType::Dislike) => *dislikes += 1,
        None => (),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReactionType::{Dislike, Like};

    #[test]
    fn transitions() {
        assert_eq!(toggle(None, Like), Some(Like));
        assert_eq!(toggle(None, Dislike), Some(Dislike));
        assert_eq!(toggle(Some(Like), Like), None);
        assert_eq!(toggle(Some(Like), Dislike), Some(Dislike));
        assert_eq!(toggle(Some(Dislike), Dislike), None);
        assert_eq!(toggle(Some(Dislike), Like), Some(Like));
    }

    #[test]
    fn deltas() {
        // (prev, requested, likes before/after, dislikes before/after)
        let table = [
            (None, Like, 3, 4, 7, 7),
            (None, Dislike, 3, 3, 7, 8),
            (Some(Like), Like, 3, 2, 7, 7),
            (Some(Like), Dislike, 3, 2, 7, 8),
            (Some(Dislike), Dislike, 3, 3, 7, 6),
            (Some(Dislike), Like, 3, 4, 7, 6),
        ];
        for (prev, requested, l0, l1, d0, d1) in table {
            let (mut likes, mut dislikes) = (l0, d0);
            apply(&mut likes, &mut dislikes, prev, toggle(prev, requested));
            assert_eq!((likes, dislikes), (l1, d1), "case {prev:?} -> {requested:?}");
        }
    }

    #[test]
    fn decrement_clamps_at_zero() {
        let (mut likes, mut dislikes) = (0, 0);
        apply(&mut likes, &mut dislikes, Some(Like), None);
        assert_eq!((likes, dislikes), (0, 0));
        apply(&mut likes, &mut dislikes, Some(Dislike), Some(Like));
        assert_eq!((likes, dislikes), (1, 0));
    }
}
