//! Integration tests for the query layer, run against in-memory SQLite.

use termfeed_db::Database;
use termfeed_db::models::UserRow;
use termfeed_types::api::SettingsUpdate;
use termfeed_types::models::{InteractionKind, NotificationKind};

fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

fn make_user(db: &Database, handle: &str) -> UserRow {
    db.create_user(handle, handle, "", "")
        .expect("Failed to create user")
}

#[test]
fn create_and_fetch_user() {
    let db = setup_db();

    let created = make_user(&db, "alice");
    assert!(created.id > 0);
    assert_eq!(created.posts_count, 0);

    let fetched = db
        .get_user_by_username("alice")
        .expect("query failed")
        .expect("user not found");
    assert_eq!(fetched.id, created.id);

    assert!(db.get_user_by_username("nobody").expect("query failed").is_none());
}

#[test]
fn duplicate_username_is_a_constraint_violation() {
    let db = setup_db();
    make_user(&db, "alice");

    let err = db
        .create_user("alice", "Alice Again", "", "")
        .expect_err("duplicate username must fail");
    assert!(termfeed_db::queries::is_constraint_violation(&err));
}

#[test]
fn create_post_bumps_author_counter() {
    let db = setup_db();
    let alice = make_user(&db, "alice");

    let post = db
        .create_post(alice.id, &alice.username, "hello world")
        .expect("create post");
    assert_eq!(post.author_handle, "alice");
    assert_eq!(post.likes_count, 0);

    let alice = db.get_user_by_id(alice.id).expect("query").expect("user");
    assert_eq!(alice.posts_count, 1);
}

#[test]
fn toggle_like_is_an_idempotent_pair() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");
    let post = db.create_post(bob.id, "bob", "borrow checker take").expect("post");

    // First toggle: row appears, counter goes up.
    let active = db
        .toggle_interaction(post.id, alice.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post exists");
    assert!(active);
    assert!(db.has_interaction(post.id, alice.id, InteractionKind::Like).expect("check"));
    let post_after = db.get_post_by_id(post.id).expect("query").expect("post");
    assert_eq!(post_after.likes_count, 1);

    // Second toggle: both row and counter return to the original state.
    let active = db
        .toggle_interaction(post.id, alice.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post exists");
    assert!(!active);
    assert!(!db.has_interaction(post.id, alice.id, InteractionKind::Like).expect("check"));
    let post_after = db.get_post_by_id(post.id).expect("query").expect("post");
    assert_eq!(post_after.likes_count, 0);
}

#[test]
fn n_toggles_leave_counter_at_parity() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");
    let post = db.create_post(bob.id, "bob", "post").expect("post");

    for _ in 0..7 {
        db.toggle_interaction(post.id, alice.id, InteractionKind::Repost)
            .expect("toggle")
            .expect("post exists");
    }

    let post_after = db.get_post_by_id(post.id).expect("query").expect("post");
    assert_eq!(post_after.reposts_count, 1); // 7 mod 2
}

#[test]
fn like_and_repost_are_independent_toggles() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");
    let post = db.create_post(bob.id, "bob", "post").expect("post");

    db.toggle_interaction(post.id, alice.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post exists");
    db.toggle_interaction(post.id, alice.id, InteractionKind::Repost)
        .expect("toggle")
        .expect("post exists");

    let post_after = db.get_post_by_id(post.id).expect("query").expect("post");
    assert_eq!(post_after.likes_count, 1);
    assert_eq!(post_after.reposts_count, 1);
}

#[test]
fn toggle_on_unknown_post_returns_none() {
    let db = setup_db();
    let alice = make_user(&db, "alice");

    let result = db
        .toggle_interaction(9999, alice.id, InteractionKind::Like)
        .expect("toggle");
    assert!(result.is_none());
}

#[test]
fn toggle_notifies_the_author_but_not_self() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");
    let post = db.create_post(bob.id, "bob", "post").expect("post");

    db.toggle_interaction(post.id, alice.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post exists");
    // Liking your own post stays silent.
    db.toggle_interaction(post.id, bob.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post exists");

    let notifications = db.notifications_for_user(bob.id, false).expect("query");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, "like");
    assert_eq!(notifications[0].actor_handle, "alice");
    assert_eq!(notifications[0].post_id, Some(post.id));

    // Toggling off does not create another notification.
    db.toggle_interaction(post.id, alice.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post exists");
    let notifications = db.notifications_for_user(bob.id, false).expect("query");
    assert_eq!(notifications.len(), 1);
}

#[test]
fn timeline_is_newest_first() {
    let db = setup_db();
    let alice = make_user(&db, "alice");

    let first = db.create_post(alice.id, "alice", "first").expect("post");
    let second = db.create_post(alice.id, "alice", "second").expect("post");
    let third = db.create_post(alice.id, "alice", "third").expect("post");

    let timeline = db.timeline_posts(50, 0).expect("timeline");
    let ids: Vec<i64> = timeline.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    // Offset pages through the same ordering.
    let page = db.timeline_posts(1, 1).expect("timeline");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, second.id);
}

#[test]
fn discover_orders_by_engagement() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");

    let quiet = db.create_post(alice.id, "alice", "quiet").expect("post");
    let popular = db.create_post(alice.id, "alice", "popular").expect("post");

    db.toggle_interaction(popular.id, bob.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post exists");
    db.toggle_interaction(popular.id, bob.id, InteractionKind::Repost)
        .expect("toggle")
        .expect("post exists");

    let discover = db.discover_posts(50).expect("discover");
    assert_eq!(discover[0].id, popular.id);
    assert_eq!(discover[1].id, quiet.id);
}

#[test]
fn comment_bumps_post_counter_and_notifies() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");
    let post = db.create_post(bob.id, "bob", "post").expect("post");

    let comment = db
        .add_comment(post.id, alice.id, "alice", "nice one")
        .expect("add comment")
        .expect("post exists");
    assert_eq!(comment.username, "alice");

    let post_after = db.get_post_by_id(post.id).expect("query").expect("post");
    assert_eq!(post_after.comments_count, 1);

    let comments = db.comments_for_post(post.id).expect("comments");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "nice one");

    let notifications = db.notifications_for_user(bob.id, false).expect("query");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, "comment");

    assert!(db.add_comment(9999, alice.id, "alice", "void").expect("call").is_none());
}

#[test]
fn conversation_pair_is_canonical_in_both_orders() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");

    let ab = db.get_or_create_conversation(alice.id, bob.id).expect("dm");
    let ba = db.get_or_create_conversation(bob.id, alice.id).expect("dm");

    assert_eq!(ab.id, ba.id);
    assert!(ab.participant_a_id < ab.participant_b_id);

    let for_alice = db.conversations_for_user(alice.id).expect("list");
    assert_eq!(for_alice.len(), 1);
}

#[test]
fn message_updates_preview_and_timestamp() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");
    let dm = db.get_or_create_conversation(alice.id, bob.id).expect("dm");

    let long = "a".repeat(80);
    let message = db
        .create_message(dm.id, alice.id, "alice", &long)
        .expect("send")
        .expect("conversation exists");
    assert!(!message.is_read);

    let dm_after = db.get_conversation_by_id(dm.id).expect("query").expect("dm");
    assert!(dm_after.last_message_preview.ends_with("..."));
    assert_eq!(dm_after.last_message_at, message.created_at);

    let messages = db.messages_for_conversation(dm.id).expect("list");
    assert_eq!(messages.len(), 1);

    assert!(
        db.create_message(9999, alice.id, "alice", "void")
            .expect("call")
            .is_none()
    );
}

#[test]
fn read_state_tracks_the_other_participant() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");
    let dm = db.get_or_create_conversation(alice.id, bob.id).expect("dm");

    db.create_message(dm.id, alice.id, "alice", "ping").expect("send").expect("dm");
    db.create_message(dm.id, alice.id, "alice", "ping again").expect("send").expect("dm");

    // Bob has unread messages; Alice does not (she sent them).
    assert_eq!(db.unread_conversation_ids(bob.id).expect("unread"), vec![dm.id]);
    assert!(db.unread_conversation_ids(alice.id).expect("unread").is_empty());

    let marked = db.mark_conversation_read(dm.id, bob.id).expect("mark read");
    assert_eq!(marked, 2);
    assert!(db.unread_conversation_ids(bob.id).expect("unread").is_empty());
}

#[test]
fn notifications_filter_and_mark_read() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");

    db.create_notification(alice.id, NotificationKind::Follow, bob.id, "followed you", None)
        .expect("create");
    db.create_notification(alice.id, NotificationKind::Mention, bob.id, "mentioned you", None)
        .expect("create");

    let all = db.notifications_for_user(alice.id, false).expect("list");
    assert_eq!(all.len(), 2);

    assert!(db.mark_notification_read(all[0].id).expect("mark"));
    let unread = db.notifications_for_user(alice.id, true).expect("list");
    assert_eq!(unread.len(), 1);

    assert!(!db.mark_notification_read(9999).expect("mark"));
}

#[test]
fn deleting_a_user_cascades_everywhere() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");

    let post = db.create_post(bob.id, "bob", "post").expect("post");
    db.toggle_interaction(post.id, alice.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post exists");
    db.add_comment(post.id, alice.id, "alice", "hi").expect("comment").expect("post");
    let dm = db.get_or_create_conversation(alice.id, bob.id).expect("dm");
    db.create_message(dm.id, bob.id, "bob", "hello").expect("send").expect("dm");

    assert!(db.delete_user(bob.id).expect("delete"));

    // Bob's post went away with its comments and interactions.
    assert!(db.get_post_by_id(post.id).expect("query").is_none());
    assert!(db.comments_for_post(post.id).expect("comments").is_empty());
    assert!(!db.has_interaction(post.id, alice.id, InteractionKind::Like).expect("check"));

    // The shared conversation and its messages are gone too.
    assert!(db.get_conversation_by_id(dm.id).expect("query").is_none());
    assert!(db.messages_for_conversation(dm.id).expect("list").is_empty());
    assert!(db.conversations_for_user(alice.id).expect("list").is_empty());

    // Deleting an unknown user reports false.
    assert!(!db.delete_user(9999).expect("delete"));
}

#[test]
fn settings_update_is_partial() {
    let db = setup_db();
    let alice = make_user(&db, "alice");

    let settings = db.get_settings(alice.id).expect("query").expect("defaults exist");
    assert!(settings.email_notifications);
    assert!(!settings.private_account);

    db.update_settings(
        alice.id,
        &SettingsUpdate {
            bio: Some("new bio".into()),
            private_account: Some(true),
            ..Default::default()
        },
    )
    .expect("update");

    let user = db.get_user_by_id(alice.id).expect("query").expect("user");
    assert_eq!(user.bio, "new bio");
    assert_eq!(user.display_name, "alice"); // untouched

    let settings = db.get_settings(alice.id).expect("query").expect("settings");
    assert!(settings.private_account);
    assert!(settings.email_notifications); // untouched
}

#[test]
fn interactions_for_posts_batches_per_user() {
    let db = setup_db();
    let alice = make_user(&db, "alice");
    let bob = make_user(&db, "bob");

    let p1 = db.create_post(bob.id, "bob", "one").expect("post");
    let p2 = db.create_post(bob.id, "bob", "two").expect("post");
    let p3 = db.create_post(bob.id, "bob", "three").expect("post");

    db.toggle_interaction(p1.id, alice.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post");
    db.toggle_interaction(p2.id, alice.id, InteractionKind::Repost)
        .expect("toggle")
        .expect("post");
    // Bob's own like must not leak into Alice's rows.
    db.toggle_interaction(p3.id, bob.id, InteractionKind::Like)
        .expect("toggle")
        .expect("post");

    let rows = db
        .interactions_for_posts(&[p1.id, p2.id, p3.id], alice.id)
        .expect("batch");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.user_id == alice.id));

    assert!(db.interactions_for_posts(&[], alice.id).expect("batch").is_empty());
}
