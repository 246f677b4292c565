use chrono::TimeZone;
use usof_api::{
    CommentId, CommentStatus, Error, PostId, ReactionType, Role, Time, User, UserId, Uuid,
};
use usof_client::CommentStore;
use usof_mock_server::MockServer;

fn t(secs: i64) -> Time {
    chrono::Utc.timestamp_opt(secs, 0).unwrap()
}

fn alice() -> User {
    User {
        id: UserId(Uuid::new_v4()),
        login: String::from("alice"),
        full_name: None,
        role: Role::User,
    }
}

fn bob() -> User {
    User {
        id: UserId(Uuid::new_v4()),
        login: String::from("bob"),
        full_name: Some(String::from("Bob B.")),
        role: Role::User,
    }
}

/// Fresh post, logged-in user, empty store.
fn setup() -> (MockServer, PostId, User) {
    let mut server = MockServer::new();
    let me = alice();
    server.log_in(me.clone());
    let post = PostId(Uuid::new_v4());
    server.seed_post(post);
    (server, post, me)
}

#[tokio::test]
async fn add_then_list() {
    let (server, post, me) = setup();
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    assert_eq!(store.db().top_level(post).unwrap().len(), 0);

    let id = store.add_comment(post, "hello", None).await.unwrap().unwrap();
    let top = store.db().top_level(post).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, id);
    assert_eq!(top[0].content, "hello");
    assert_eq!(top[0].likes_count, 0);
    assert_eq!(top[0].dislikes_count, 0);
    assert_eq!(top[0].reply_count, 0);
}

#[tokio::test]
async fn empty_content_never_reaches_the_gateway() {
    let (server, post, me) = setup();
    let mut store = CommentStore::new(server, Some(me));

    assert_eq!(store.add_comment(post, "   \n", None).await.unwrap(), None);
    assert_eq!(store.gateway_mut().test_comment_count(), 0);
    assert_eq!(store.db().top_level(post), None);
}

#[tokio::test]
async fn new_top_level_comments_prepend() {
    let (mut server, post, me) = setup();
    server.seed_comment(post, None, None, "old", t(1));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    let id = store.add_comment(post, "new", None).await.unwrap().unwrap();
    let top = store.db().top_level(post).unwrap();
    assert_eq!(top[0].id, id);
    assert_eq!(top[1].content, "old");
}

#[tokio::test]
async fn reply_count_returns_to_baseline_after_add_then_delete() {
    let (mut server, post, me) = setup();
    let parent = server.seed_comment(post, None, Some(me.id), "parent", t(1));
    server.seed_comment(post, Some(parent), Some(me.id), "r1", t(2));
    server.seed_comment(post, Some(parent), Some(me.id), "r2", t(3));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    assert_eq!(store.db().comment(parent).unwrap().reply_count, 2);
    store.load_replies(parent, 1, 20).await.unwrap();

    let reply = store
        .add_comment(post, "x", Some(parent))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(store.db().comment(parent).unwrap().reply_count, 3);
    assert_eq!(store.db().bucket(parent).unwrap().total, 3);

    store.delete_comment(reply).await.unwrap();
    assert_eq!(store.db().comment(parent).unwrap().reply_count, 2);
    assert_eq!(store.db().bucket(parent).unwrap().total, 2);
    assert!(!store.db().contains(reply));
}

#[tokio::test]
async fn replies_append_oldest_first() {
    let (mut server, post, me) = setup();
    let parent = server.seed_comment(post, None, Some(me.id), "parent", t(1));
    server.seed_comment(post, Some(parent), Some(me.id), "first", t(2));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    store.load_replies(parent, 1, 20).await.unwrap();
    store.add_comment(post, "second", Some(parent)).await.unwrap();

    let bucket = store.db().bucket(parent).unwrap();
    assert_eq!(bucket.items[0].content, "first");
    assert_eq!(bucket.items[1].content, "second");
}

#[tokio::test]
async fn toggling_the_same_reaction_twice_round_trips() {
    let (mut server, post, me) = setup();
    let other = bob();
    server.seed_user(other.clone());
    let comment = server.seed_comment(post, None, Some(me.id), "c", t(1));
    server.seed_reaction(comment, other.id, ReactionType::Like);
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    assert_eq!(store.db().comment(comment).unwrap().likes_count, 1);

    let next = store
        .toggle_reaction(comment, ReactionType::Like)
        .await
        .unwrap();
    assert_eq!(next, Some(ReactionType::Like));
    assert_eq!(store.db().comment(comment).unwrap().likes_count, 2);
    assert_eq!(store.db().my_reaction(comment), Some(ReactionType::Like));

    let next = store
        .toggle_reaction(comment, ReactionType::Like)
        .await
        .unwrap();
    assert_eq!(next, None);
    assert_eq!(store.db().comment(comment).unwrap().likes_count, 1);
    assert_eq!(store.db().my_reaction(comment), None);
}

#[tokio::test]
async fn switching_reaction_moves_both_counters_in_one_update() {
    let (mut server, post, me) = setup();
    let comment = server.seed_comment(post, None, Some(me.id), "c", t(1));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    store
        .toggle_reaction(comment, ReactionType::Like)
        .await
        .unwrap();
    assert_eq!(store.db().comment(comment).unwrap().likes_count, 1);

    store
        .toggle_reaction(comment, ReactionType::Dislike)
        .await
        .unwrap();
    let c = store.db().comment(comment).unwrap();
    assert_eq!(c.likes_count, 0);
    assert_eq!(c.dislikes_count, 1);
    assert_eq!(store.db().my_reaction(comment), Some(ReactionType::Dislike));
}

#[tokio::test]
async fn reply_pages_append_and_total_tracks_the_last_response() {
    let (mut server, post, me) = setup();
    let parent = server.seed_comment(post, None, Some(me.id), "parent", t(1));
    for i in 0..30 {
        server.seed_comment(post, Some(parent), Some(me.id), &format!("r{i}"), t(2 + i));
    }
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    store.load_replies(parent, 1, 20).await.unwrap();
    let bucket = store.db().bucket(parent).unwrap();
    assert_eq!(bucket.items.len(), 20);
    assert_eq!(bucket.total, 30);
    assert_eq!(bucket.page, 1);

    store.load_replies(parent, 2, 20).await.unwrap();
    let bucket = store.db().bucket(parent).unwrap();
    assert_eq!(bucket.items.len(), 30);
    assert_eq!(bucket.total, 30);
    assert_eq!(bucket.page, 2);
    assert_eq!(store.db().comment(parent).unwrap().reply_count, 30);
}

#[tokio::test]
async fn refetching_page_one_replaces_the_bucket() {
    let (mut server, post, me) = setup();
    let parent = server.seed_comment(post, None, Some(me.id), "parent", t(1));
    server.seed_comment(post, Some(parent), Some(me.id), "r", t(2));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    store.load_replies(parent, 1, 20).await.unwrap();
    store.load_replies(parent, 1, 20).await.unwrap();
    let bucket = store.db().bucket(parent).unwrap();
    assert_eq!(bucket.items.len(), 1);
    assert_eq!(bucket.total, 1);
}

#[tokio::test]
async fn pinned_comments_sort_first_on_load() {
    let (mut server, post, me) = setup();
    let a = server.seed_comment(post, None, Some(me.id), "a", t(1));
    let b = server.seed_comment(post, None, Some(me.id), "b", t(2));
    let c = server.seed_comment(post, None, Some(me.id), "c", t(3));
    server.seed_locked(b);
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    let order: Vec<CommentId> = store
        .db()
        .top_level(post)
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(order, vec![b, a, c]);
}

#[tokio::test]
async fn pinning_through_the_store_resorts_the_list() {
    let (mut server, post, me) = setup();
    let older = server.seed_comment(post, None, Some(me.id), "older", t(1));
    let newer = server.seed_comment(post, None, Some(me.id), "newer", t(2));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    store.set_pinned(post, newer, true).await.unwrap();
    let top = store.db().top_level(post).unwrap();
    assert_eq!(top[0].id, newer);
    assert!(top[0].locked);

    store.set_pinned(post, newer, false).await.unwrap();
    let top = store.db().top_level(post).unwrap();
    assert_eq!(top[0].id, older);
}

#[tokio::test]
async fn pinning_a_reply_is_rejected_and_changes_nothing() {
    let (mut server, post, me) = setup();
    let parent = server.seed_comment(post, None, Some(me.id), "parent", t(1));
    let reply = server.seed_comment(post, Some(parent), Some(me.id), "reply", t(2));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    store.load_replies(parent, 1, 20).await.unwrap();
    let err = store.set_pinned(post, reply, true).await.unwrap_err();
    assert_eq!(err, Error::CannotPinReply(reply.0));
    assert!(!store.db().comment(reply).unwrap().locked);
}

#[tokio::test]
async fn moderation_status_patches_in_place() {
    let (mut server, post, me) = setup();
    let comment = server.seed_comment(post, None, Some(me.id), "c", t(1));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    store
        .set_status(comment, CommentStatus::Inactive)
        .await
        .unwrap();
    assert_eq!(
        store.db().comment(comment).unwrap().status,
        CommentStatus::Inactive,
    );
}

#[tokio::test]
async fn deleting_an_id_the_store_never_saw_is_a_local_noop() {
    let (mut server, post, me) = setup();
    let unseen = server.seed_comment(post, None, Some(me.id), "unseen", t(1));
    let mut store = CommentStore::new(server, Some(me));

    store.delete_comment(unseen).await.unwrap();
    assert!(!store.gateway_mut().test_has_comment(unseen));
    assert!(!store.db().contains(unseen));
    assert_eq!(store.db().top_level(post), None);
}

#[tokio::test]
async fn dehydrated_lists_get_enriched() {
    let (mut server, post, me) = setup();
    let other = bob();
    server.seed_user(other.clone());
    let comment = server.seed_comment(post, None, Some(other.id), "c", t(1));
    server.seed_reaction(comment, other.id, ReactionType::Dislike);
    server.seed_reaction(comment, me.id, ReactionType::Like);
    server.set_dehydrated(true);
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    let c = store.db().comment(comment).unwrap();
    assert_eq!(c.likes_count, 1);
    assert_eq!(c.dislikes_count, 1);
    assert_eq!(c.author.as_ref().unwrap().login, "bob");
    assert_eq!(store.db().my_reaction(comment), Some(ReactionType::Like));
}

#[tokio::test]
async fn enrichment_failure_defaults_counters_without_failing_the_load() {
    let (mut server, post, me) = setup();
    let other = bob();
    server.seed_user(other.clone());
    let comment = server.seed_comment(post, None, Some(other.id), "c", t(1));
    server.seed_reaction(comment, other.id, ReactionType::Like);
    server.set_dehydrated(true);
    server.set_failing_reactions(true);
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    let c = store.db().comment(comment).unwrap();
    assert_eq!(c.likes_count, 0);
    assert_eq!(c.dislikes_count, 0);
}

#[tokio::test]
async fn author_backfills_from_the_session_user_on_add() {
    let (mut server, post, me) = setup();
    server.set_dehydrated(true);
    let mut store = CommentStore::new(server, Some(me.clone()));

    let id = store.add_comment(post, "mine", None).await.unwrap().unwrap();
    let c = store.db().comment(id).unwrap();
    assert_eq!(c.author.as_ref().unwrap().id, me.id);
}

#[tokio::test]
async fn failed_reload_keeps_the_previous_list() {
    let (mut server, post, me) = setup();
    server.seed_comment(post, None, Some(me.id), "kept", t(1));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    assert_eq!(store.db().top_level(post).unwrap().len(), 1);

    store.gateway_mut().set_failing(true);
    assert!(store.load_top_level(post).await.is_err());
    let top = store.db().top_level(post).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].content, "kept");
}

#[tokio::test]
async fn failed_reply_fetch_marks_the_bucket_and_keeps_items() {
    let (mut server, post, me) = setup();
    let parent = server.seed_comment(post, None, Some(me.id), "parent", t(1));
    server.seed_comment(post, Some(parent), Some(me.id), "r", t(2));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    store.load_replies(parent, 1, 20).await.unwrap();

    store.gateway_mut().set_failing(true);
    assert!(store.load_replies(parent, 2, 20).await.is_err());
    let bucket = store.db().bucket(parent).unwrap();
    assert!(!bucket.loading);
    assert!(bucket.error.is_some());
    assert_eq!(bucket.items.len(), 1);
    assert_eq!(bucket.total, 1);
}

#[tokio::test]
async fn clear_post_forgets_lists_and_buckets() {
    let (mut server, post, me) = setup();
    let parent = server.seed_comment(post, None, Some(me.id), "parent", t(1));
    server.seed_comment(post, Some(parent), Some(me.id), "r", t(2));
    let mut store = CommentStore::new(server, Some(me));

    store.load_top_level(post).await.unwrap();
    store.load_replies(parent, 1, 20).await.unwrap();
    store.clear_post(post);
    assert_eq!(store.db().top_level(post), None);
    assert_eq!(store.db().bucket(parent), None);
}
