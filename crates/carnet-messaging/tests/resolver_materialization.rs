mod common;

use carnet_messaging::MessagingError;
use carnet_messaging::resolver;
use carnet_types::{CLASS_LEVELS, ConversationKind};

#[test]
fn student_and_parent_share_one_direct_row() {
    let db = common::school();

    let student_view = resolver::list_conversations(&db, "s-lina").unwrap();
    let parent_view = resolver::list_conversations(&db, "p-moreau").unwrap();

    let from_student: Vec<_> = student_view
        .iter()
        .filter(|e| {
            e.conversation.kind == ConversationKind::Direct
                && e.conversation.has_participant("p-moreau")
        })
        .collect();
    let from_parent: Vec<_> = parent_view
        .iter()
        .filter(|e| {
            e.conversation.kind == ConversationKind::Direct
                && e.conversation.has_participant("s-lina")
        })
        .collect();

    assert_eq!(from_student.len(), 1);
    assert_eq!(from_parent.len(), 1);
    assert_eq!(from_student[0].conversation.id, from_parent[0].conversation.id);
}

#[test]
fn listing_is_idempotent() {
    let db = common::school();

    let ids = |entries: Vec<carnet_messaging::ConversationEntry>| -> Vec<String> {
        let mut ids: Vec<_> = entries.into_iter().map(|e| e.conversation.id).collect();
        ids.sort();
        ids
    };

    let first = ids(resolver::list_conversations(&db, "p-moreau").unwrap());
    let second = ids(resolver::list_conversations(&db, "p-moreau").unwrap());
    assert_eq!(first, second);
}

#[test]
fn student_gets_their_class_conversation() {
    let db = common::school();
    let entries = resolver::list_conversations(&db, "s-lina").unwrap();

    let class: Vec<_> = entries
        .iter()
        .filter(|e| e.conversation.kind == ConversationKind::Class)
        .collect();
    assert_eq!(class.len(), 1);
    assert_eq!(class[0].conversation.class_level.as_deref(), Some("1ere groupe 2"));
    assert_eq!(class[0].conversation.title, "1ere groupe 2");
}

#[test]
fn parent_gets_the_admin_conversation() {
    let db = common::school();
    let entries = resolver::list_conversations(&db, "p-moreau").unwrap();

    let with_admin: Vec<_> = entries
        .iter()
        .filter(|e| e.conversation.has_participant("admin"))
        .collect();
    assert_eq!(with_admin.len(), 1);
    assert_eq!(with_admin[0].conversation.title, "Administrateur");
}

#[test]
fn admin_enumeration_covers_the_catalog_and_skips_placeholders() {
    let db = common::school();
    let entries = resolver::list_conversations(&db, "admin").unwrap();

    let class_count = entries
        .iter()
        .filter(|e| e.conversation.kind == ConversationKind::Class)
        .count();
    assert_eq!(class_count, CLASS_LEVELS.len());

    let direct: Vec<_> = entries
        .iter()
        .filter(|e| e.conversation.kind == ConversationKind::Direct)
        .collect();
    assert_eq!(direct.len(), 2);
    assert!(direct.iter().all(|e| !e.conversation.has_participant("p-virtuel")));
}

#[test]
fn students_still_reach_their_placeholder_parent() {
    let db = common::school();
    let entries = resolver::list_conversations(&db, "s-emma").unwrap();
    assert!(entries.iter().any(|e| e.conversation.has_participant("p-virtuel")));
}

#[test]
fn titles_follow_directory_renames() {
    let db = common::school();

    let before = resolver::list_conversations(&db, "s-lina").unwrap();
    assert!(before.iter().any(|e| e.conversation.title == "Claire Moreau"));

    db.with_conn(|conn| {
        conn.execute("UPDATE users SET first_name = 'Anne' WHERE id = 'p-moreau'", [])?;
        Ok(())
    })
    .unwrap();

    let after = resolver::list_conversations(&db, "s-lina").unwrap();
    assert!(after.iter().any(|e| e.conversation.title == "Anne Moreau"));
    assert!(!after.iter().any(|e| e.conversation.title == "Claire Moreau"));
}

#[test]
fn broken_link_skips_only_that_conversation() {
    let db = common::school();

    // A link pointing at a user row that does not exist.
    db.with_conn(|conn| {
        conn.pragma_update(None, "foreign_keys", "OFF")?;
        conn.execute(
            "INSERT INTO parent_student_links (parent_id, student_id) VALUES ('p-ghost', 's-lina')",
            [],
        )?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    })
    .unwrap();

    let entries = resolver::list_conversations(&db, "s-lina").unwrap();
    // The real parent and the class conversation survive; the ghost is skipped.
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|e| e.conversation.has_participant("p-moreau")));
}

#[test]
fn unknown_caller_is_an_error() {
    let db = common::school();
    let err = resolver::list_conversations(&db, "nobody").unwrap_err();
    assert!(matches!(err, MessagingError::NotFound(..)));
}

#[test]
fn get_one_is_access_gated() {
    let db = common::school();
    let (conversation, _) = resolver::create_or_get_direct(&db, "s-lina", "p-moreau").unwrap();

    let entry = resolver::get_conversation(&db, "p-moreau", &conversation.id).unwrap();
    assert_eq!(entry.conversation.id, conversation.id);
    assert!(entry.last_message.is_none());

    let err = resolver::get_conversation(&db, "p-diallo", &conversation.id).unwrap_err();
    assert!(matches!(err, MessagingError::Forbidden(_)));

    let err = resolver::get_conversation(&db, "s-lina", "nope").unwrap_err();
    assert!(matches!(err, MessagingError::NotFound(..)));
}

#[test]
fn create_or_get_is_shared_and_order_insensitive() {
    let db = common::school();

    let (created, is_new) = resolver::create_or_get_direct(&db, "s-lina", "p-moreau").unwrap();
    assert!(is_new);
    assert_eq!(created.title, "Claire Moreau");

    let (found, is_new) = resolver::create_or_get_direct(&db, "p-moreau", "s-lina").unwrap();
    assert!(!is_new);
    assert_eq!(found.id, created.id);
    // The title is recomputed from the caller's counterpart.
    assert_eq!(found.title, "Lina Moreau");
}

#[test]
fn create_or_get_rejects_self_and_strangers() {
    let db = common::school();

    assert!(matches!(
        resolver::create_or_get_direct(&db, "s-lina", "s-lina"),
        Err(MessagingError::InvalidRequest(_))
    ));
    // A real user, but not one of s-lina's parents.
    assert!(matches!(
        resolver::create_or_get_direct(&db, "s-lina", "p-diallo"),
        Err(MessagingError::InvalidRequest(_))
    ));
    assert!(matches!(
        resolver::create_or_get_direct(&db, "s-lina", "nobody"),
        Err(MessagingError::NotFound(..))
    ));
}

#[test]
fn recipient_lists_follow_roles() {
    let db = common::school();

    let ids = |user: &str| -> Vec<String> {
        resolver::list_recipients(&db, user)
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect()
    };

    assert_eq!(ids("s-lina"), vec!["p-moreau"]);
    assert_eq!(ids("p-moreau"), vec!["s-lina", "admin"]);
    // Ordered by name; the placeholder parent is excluded.
    assert_eq!(ids("admin"), vec!["p-diallo", "p-moreau"]);
}
