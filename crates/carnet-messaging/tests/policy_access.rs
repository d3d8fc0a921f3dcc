mod common;

use carnet_db::Database;
use carnet_db::models::ConversationRow;
use carnet_messaging::policy::can_access;

fn class_conversation(db: &Database, level: &str) -> ConversationRow {
    db.insert_class_conversation(&format!("class-{level}"), level, level)
        .unwrap();
    db.find_class_conversation(level).unwrap().unwrap()
}

#[test]
fn direct_access_is_participants_only() {
    let db = common::school();
    db.insert_direct_conversation("c-direct", "s-lina", "p-moreau", "Claire Moreau")
        .unwrap();
    let conversation = db.get_conversation("c-direct").unwrap().unwrap();

    assert!(can_access(&db, &conversation, "s-lina"));
    assert!(can_access(&db, &conversation, "p-moreau"));
    assert!(!can_access(&db, &conversation, "p-diallo"));
    // Even an admin is not a member of someone else's direct conversation.
    assert!(!can_access(&db, &conversation, "admin"));
    assert!(!can_access(&db, &conversation, "ghost"));
}

#[test]
fn class_access_follows_the_directory() {
    let db = common::school();
    let conversation = class_conversation(&db, "1ere groupe 2");

    assert!(can_access(&db, &conversation, "s-lina")); // her class
    assert!(!can_access(&db, &conversation, "s-theo")); // another class
    assert!(can_access(&db, &conversation, "p-moreau")); // first child in the class
    assert!(!can_access(&db, &conversation, "p-diallo"));
    assert!(can_access(&db, &conversation, "admin"));
    assert!(!can_access(&db, &conversation, "ghost"));
}

#[test]
fn parent_second_link_does_not_widen_class_access() {
    let db = common::school();
    // p-diallo's first link stays s-theo (Terminale); s-lina comes second.
    db.link_parent_student("p-diallo", "s-lina").unwrap();

    let premiere = class_conversation(&db, "1ere groupe 2");
    let terminale = class_conversation(&db, "Terminale groupe 1");

    assert!(!can_access(&db, &premiere, "p-diallo"));
    assert!(can_access(&db, &terminale, "p-diallo"));
}

#[test]
fn group_kind_uses_the_participant_rule() {
    let db = common::school();
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO conversations (id, kind, participant1_id, participant2_id, title)
             VALUES ('c-group', 'group', 's-lina', 'p-moreau', 'Groupe')",
            [],
        )?;
        Ok(())
    })
    .unwrap();
    let conversation = db.get_conversation("c-group").unwrap().unwrap();

    assert!(can_access(&db, &conversation, "s-lina"));
    assert!(can_access(&db, &conversation, "p-moreau"));
    assert!(!can_access(&db, &conversation, "admin"));
}
