//! Membership rules: who may read and post into a conversation.

use tracing::warn;

use carnet_db::Database;
use carnet_db::models::ConversationRow;
use carnet_types::{ConversationKind, Role};

/// Whether `user_id` may read and write `conversation`.
///
/// Pure check over the conversation row and the directory. Any directory
/// lookup failure denies access instead of surfacing an error.
pub fn can_access(db: &Database, conversation: &ConversationRow, user_id: &str) -> bool {
    match conversation.kind {
        // `group` is the reserved kind; membership works like direct.
        ConversationKind::Direct | ConversationKind::Group => {
            conversation.has_participant(user_id)
        }
        ConversationKind::Class => class_member(db, conversation, user_id),
    }
}

fn class_member(db: &Database, conversation: &ConversationRow, user_id: &str) -> bool {
    let Some(class_level) = conversation.class_level.as_deref() else {
        warn!(
            "Class conversation {} has no class_level, denying access",
            conversation.id
        );
        return false;
    };

    let user = match db.get_user(user_id) {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(
                "Denying access to conversation {}: user {} not in the directory",
                conversation.id, user_id
            );
            return false;
        }
        Err(e) => {
            warn!(
                "Denying access to conversation {}: directory lookup for {} failed: {}",
                conversation.id, user_id, e
            );
            return false;
        }
    };

    match user.role {
        Role::Admin => true,
        Role::Student => user.class_level.as_deref() == Some(class_level),
        // Only the first linked student counts; a second child in the class
        // does not widen the parent's access.
        Role::Parent => first_child_class_level(db, user_id).as_deref() == Some(class_level),
    }
}

fn first_child_class_level(db: &Database, parent_id: &str) -> Option<String> {
    let student_id = match db.student_ids_of(parent_id) {
        Ok(ids) => ids.into_iter().next(),
        Err(e) => {
            warn!("Link lookup for parent {} failed: {}", parent_id, e);
            None
        }
    }?;

    match db.get_user(&student_id) {
        Ok(Some(student)) => student.class_level,
        Ok(None) => {
            warn!("Parent {} linked to missing student {}", parent_id, student_id);
            None
        }
        Err(e) => {
            warn!("Directory lookup for student {} failed: {}", student_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carnet_db::Database;

    #[test]
    fn class_row_without_level_denies_everyone() {
        let db = Database::open_in_memory().unwrap();
        let row = ConversationRow {
            id: "c1".into(),
            kind: ConversationKind::Class,
            participant1_id: None,
            participant2_id: None,
            class_level: None,
            title: "broken".into(),
            last_message_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(!can_access(&db, &row, "anyone"));
    }

    #[test]
    fn unknown_user_is_denied_class_access() {
        let db = Database::open_in_memory().unwrap();
        let row = ConversationRow {
            id: "c1".into(),
            kind: ConversationKind::Class,
            participant1_id: None,
            participant2_id: None,
            class_level: Some("Seconde groupe 1".into()),
            title: "Seconde groupe 1".into(),
            last_message_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(!can_access(&db, &row, "ghost"));
    }
}
