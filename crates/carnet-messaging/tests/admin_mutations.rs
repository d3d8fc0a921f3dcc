mod common;

use carnet_db::Database;
use carnet_messaging::{MessagingError, NewMessage, admin, resolver, store};
use carnet_types::{MessageKind, Role};

fn send_text(db: &Database, sender: &str, conversation_id: &str, content: &str) -> String {
    store::send_message(
        db,
        sender,
        NewMessage {
            conversation_id: conversation_id.into(),
            content: content.into(),
            kind: MessageKind::Text,
            file_path: None,
            file_name: None,
            mime_type: None,
        },
    )
    .unwrap()
    .id
}

#[test]
fn rename_requires_a_directory_admin() {
    let db = common::school();
    let (conversation, _) = resolver::create_or_get_direct(&db, "s-lina", "p-moreau").unwrap();

    let err = admin::update_conversation(&db, "p-moreau", &conversation.id, Some("Autre"))
        .unwrap_err();
    assert!(matches!(err, MessagingError::Forbidden(_)));
    assert_eq!(
        db.get_conversation(&conversation.id).unwrap().unwrap().title,
        "Claire Moreau"
    );
}

#[test]
fn demoted_admins_are_rejected() {
    let db = common::school();
    db.create_user("a2", Role::Admin, "Marc", "Petit", "marc.petit@ecole.example", None)
        .unwrap();
    let (conversation, _) = resolver::create_or_get_direct(&db, "s-lina", "p-moreau").unwrap();

    admin::update_conversation(&db, "a2", &conversation.id, Some("Suivi Lina")).unwrap();

    // Demote a2; a still-valid token would keep claiming admin, but the
    // mutation checks the directory.
    db.with_conn(|conn| {
        conn.execute("UPDATE users SET role = 'parent' WHERE id = 'a2'", [])?;
        Ok(())
    })
    .unwrap();

    let err =
        admin::update_conversation(&db, "a2", &conversation.id, Some("Encore")).unwrap_err();
    assert!(matches!(err, MessagingError::Forbidden(_)));
}

#[test]
fn rename_rules() {
    let db = common::school();
    db.insert_class_conversation("c-class", "1ere groupe 2", "1ere groupe 2")
        .unwrap();

    // No title supplied: a no-op that echoes the current row.
    let unchanged = admin::update_conversation(&db, "admin", "c-class", None).unwrap();
    assert_eq!(unchanged.title, "1ere groupe 2");

    let err = admin::update_conversation(&db, "admin", "c-class", Some("  ")).unwrap_err();
    assert!(matches!(err, MessagingError::InvalidRequest(_)));

    let renamed =
        admin::update_conversation(&db, "admin", "c-class", Some("Vie de classe")).unwrap();
    assert_eq!(renamed.title, "Vie de classe");

    // A member fetching the conversation sees the new title.
    let entry = resolver::get_conversation(&db, "s-lina", "c-class").unwrap();
    assert_eq!(entry.conversation.title, "Vie de classe");
}

#[test]
fn missing_conversation_is_not_found() {
    let db = common::school();
    assert!(matches!(
        admin::update_conversation(&db, "admin", "nope", Some("Titre")),
        Err(MessagingError::NotFound(..))
    ));
    assert!(matches!(
        admin::delete_conversation(&db, "admin", "nope"),
        Err(MessagingError::NotFound(..))
    ));
}

#[test]
fn delete_requires_admin_and_cascades() {
    let db = common::school();
    let (conversation, _) = resolver::create_or_get_direct(&db, "s-lina", "p-moreau").unwrap();
    let first = send_text(&db, "s-lina", &conversation.id, "un");
    let second = send_text(&db, "p-moreau", &conversation.id, "deux");

    let err = admin::delete_conversation(&db, "p-moreau", &conversation.id).unwrap_err();
    assert!(matches!(err, MessagingError::Forbidden(_)));
    assert!(db.get_conversation(&conversation.id).unwrap().is_some());

    admin::delete_conversation(&db, "admin", &conversation.id).unwrap();
    assert!(db.get_conversation(&conversation.id).unwrap().is_none());
    assert!(db.get_message(&first).unwrap().is_none());
    assert!(db.get_message(&second).unwrap().is_none());

    let err = resolver::get_conversation(&db, "s-lina", &conversation.id).unwrap_err();
    assert!(matches!(err, MessagingError::NotFound(..)));
}
