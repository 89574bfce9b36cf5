//! Demo dataset for a fresh database. Built through the regular query layer
//! so every denormalized counter matches its interaction rows.

use crate::Database;
use anyhow::Result;
use termfeed_types::models::InteractionKind;
use tracing::info;

/// Load demo users, posts, interactions, a DM thread and notifications.
/// Idempotent: a database that already has the demo users is left alone.
/// Returns true when data was loaded.
pub fn load_demo_data(db: &Database) -> Result<bool> {
    if db.get_user_by_username("yourname")?.is_some() {
        info!("Seed skipped, demo data already present");
        return Ok(false);
    }

    let yourname = db.create_user(
        "yourname",
        "Your Name",
        "vim enthusiast. :wq is a lifestyle.",
        "(o_o)",
    )?;
    let alice = db.create_user(
        "alice",
        "Alice",
        "kernel hacker, coffee-driven development",
        "(^_^)",
    )?;
    let bob = db.create_user(
        "bob_dev",
        "Bob",
        "I write Rust and I cannot lie",
        "(0v0)",
    )?;
    let mallory = db.create_user(
        "mallory",
        "Mallory",
        "chaotic neutral. dotfiles connoisseur.",
        "(>_<)",
    )?;

    let p1 = db.create_post(
        alice.id,
        &alice.username,
        "just bisected a kernel panic down to a one-line patch. feeling unstoppable",
    )?;
    let p2 = db.create_post(
        bob.id,
        &bob.username,
        "hot take: the borrow checker is just pair programming with someone smarter than you",
    )?;
    let p3 = db.create_post(
        yourname.id,
        &yourname.username,
        "day 47 of my vimrc rewrite. it is now sentient and refuses :q!",
    )?;
    let p4 = db.create_post(
        mallory.id,
        &mallory.username,
        "replaced my window manager again. productivity unchanged, happiness up 300%",
    )?;

    // Interactions drive the counters and the notification rows.
    db.toggle_interaction(p1.id, yourname.id, InteractionKind::Like)?;
    db.toggle_interaction(p1.id, bob.id, InteractionKind::Like)?;
    db.toggle_interaction(p2.id, alice.id, InteractionKind::Like)?;
    db.toggle_interaction(p2.id, yourname.id, InteractionKind::Repost)?;
    db.toggle_interaction(p3.id, alice.id, InteractionKind::Like)?;
    db.toggle_interaction(p4.id, bob.id, InteractionKind::Repost)?;

    db.add_comment(p2.id, alice.id, &alice.username, "rustc is my therapist")?;
    db.add_comment(
        p3.id,
        mallory.id,
        &mallory.username,
        "have you tried turning it off and never on again",
    )?;

    let dm = db.get_or_create_conversation(yourname.id, alice.id)?;
    db.create_message(dm.id, alice.id, &alice.username, "hey, did you see the borrow checker take?")?;
    db.create_message(dm.id, yourname.id, &yourname.username, "bob is not wrong though")?;
    db.create_message(dm.id, alice.id, &alice.username, "never tell him that")?;

    info!("Seed complete: 4 users, 4 posts, demo DM thread");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_idempotent() {
        let db = Database::open_in_memory().expect("open db");

        assert!(load_demo_data(&db).expect("first seed"));
        assert!(!load_demo_data(&db).expect("second seed"));

        let user = db
            .get_user_by_username("alice")
            .expect("query")
            .expect("alice seeded");
        // One like from yourname, one from bob.
        let post = db.get_post_by_id(1).expect("query").expect("post seeded");
        assert_eq!(post.author_id, user.id);
        assert_eq!(post.likes_count, 2);
    }
}
