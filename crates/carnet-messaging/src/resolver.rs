//! Lazy conversation materialization.
//!
//! Conversations are never provisioned up front. Every listing re-derives
//! the set the caller is entitled to from the directory and creates whatever
//! is missing. Creation is idempotent: the unique conversation indexes plus
//! `INSERT OR IGNORE` collapse concurrent creators onto a single row.

use anyhow::anyhow;
use tracing::warn;
use uuid::Uuid;

use carnet_db::Database;
use carnet_db::models::{ConversationRow, MessageRow, UserRow};
use carnet_types::{CLASS_LEVELS, Role};

use crate::error::{MessagingError, Result};
use crate::policy::can_access;

/// Stored title of the parent↔admin conversation, as the parent sees it.
pub const ADMIN_CONVERSATION_TITLE: &str = "Administrateur";

/// A conversation plus its most recent message, for list previews.
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    pub conversation: ConversationRow,
    pub last_message: Option<MessageRow>,
}

/// Every conversation the caller is entitled to see, materializing missing
/// ones along the way. The caller's role comes from the directory, not from
/// the token.
///
/// A failure on one related entity (a broken link, a missing counterpart)
/// drops that single conversation from the result and never aborts the rest.
pub fn list_conversations(db: &Database, user_id: &str) -> Result<Vec<ConversationEntry>> {
    let caller = require_user(db, user_id)?;

    let mut entries = Vec::new();
    match caller.role {
        Role::Student => {
            for parent_id in db.parent_ids_of(user_id)? {
                match direct_with(db, user_id, &parent_id) {
                    Ok((row, _)) => entries.push(annotate(db, row)),
                    Err(e) => warn!(
                        "Skipping conversation with parent {} for student {}: {}",
                        parent_id, user_id, e
                    ),
                }
            }
            if let Some(class_level) = caller.class_level.as_deref() {
                match ensure_class(db, class_level) {
                    Ok((row, _)) => entries.push(annotate(db, row)),
                    Err(e) => warn!(
                        "Skipping class conversation {} for student {}: {}",
                        class_level, user_id, e
                    ),
                }
            }
        }
        Role::Parent => {
            for student_id in db.student_ids_of(user_id)? {
                match direct_with(db, user_id, &student_id) {
                    Ok((row, _)) => entries.push(annotate(db, row)),
                    Err(e) => warn!(
                        "Skipping conversation with student {} for parent {}: {}",
                        student_id, user_id, e
                    ),
                }
            }
            match admin_conversation(db, user_id) {
                Ok(Some((row, _))) => entries.push(annotate(db, row)),
                Ok(None) => warn!(
                    "No admin account in the directory, skipping the admin conversation for parent {}",
                    user_id
                ),
                Err(e) => warn!("Skipping admin conversation for parent {}: {}", user_id, e),
            }
        }
        Role::Admin => {
            for class_level in CLASS_LEVELS {
                match ensure_class(db, class_level) {
                    Ok((row, _)) => entries.push(annotate(db, row)),
                    Err(e) => warn!("Skipping class conversation {}: {}", class_level, e),
                }
            }
            for parent in db.active_parents()? {
                match ensure_direct(db, user_id, &parent.id, &parent.display_name()) {
                    Ok((row, _)) => entries.push(annotate(db, row)),
                    Err(e) => warn!("Skipping conversation with parent {}: {}", parent.id, e),
                }
            }
        }
    }

    Ok(entries)
}

/// One conversation by id, access-gated, with the same preview annotation
/// as the listing. Does not re-run materialization or title refresh.
pub fn get_conversation(
    db: &Database,
    user_id: &str,
    conversation_id: &str,
) -> Result<ConversationEntry> {
    let conversation = db
        .get_conversation(conversation_id)?
        .ok_or_else(|| MessagingError::NotFound("conversation", conversation_id.into()))?;
    if !can_access(db, &conversation, user_id) {
        return Err(MessagingError::not_member(user_id, conversation_id));
    }
    Ok(annotate(db, conversation))
}

/// Who the caller may open a direct conversation with: a student their
/// linked parents, a parent their linked students plus the admin, the admin
/// every non-placeholder parent.
pub fn list_recipients(db: &Database, user_id: &str) -> Result<Vec<UserRow>> {
    let caller = require_user(db, user_id)?;

    let mut recipients = Vec::new();
    match caller.role {
        Role::Student => {
            for parent_id in db.parent_ids_of(user_id)? {
                match db.get_user(&parent_id) {
                    Ok(Some(parent)) => recipients.push(parent),
                    Ok(None) => warn!("Student {} linked to missing parent {}", user_id, parent_id),
                    Err(e) => warn!("Directory lookup for parent {} failed: {}", parent_id, e),
                }
            }
        }
        Role::Parent => {
            for student_id in db.student_ids_of(user_id)? {
                match db.get_user(&student_id) {
                    Ok(Some(student)) => recipients.push(student),
                    Ok(None) => {
                        warn!("Parent {} linked to missing student {}", user_id, student_id)
                    }
                    Err(e) => warn!("Directory lookup for student {} failed: {}", student_id, e),
                }
            }
            match db.first_admin()? {
                Some(admin) => recipients.push(admin),
                None => warn!("No admin account in the directory"),
            }
        }
        Role::Admin => recipients.extend(db.active_parents()?),
    }

    Ok(recipients)
}

/// Find-or-create the direct conversation between the caller and a chosen
/// recipient. The recipient must come from the caller's recipient list.
/// The returned flag is true when this call created the row.
pub fn create_or_get_direct(
    db: &Database,
    caller_id: &str,
    recipient_id: &str,
) -> Result<(ConversationRow, bool)> {
    if caller_id == recipient_id {
        return Err(MessagingError::InvalidRequest(
            "cannot open a conversation with yourself".into(),
        ));
    }

    require_user(db, caller_id)?;
    let recipient = db
        .get_user(recipient_id)?
        .ok_or_else(|| MessagingError::NotFound("user", recipient_id.into()))?;

    let eligible = list_recipients(db, caller_id)?
        .iter()
        .any(|u| u.id == recipient_id);
    if !eligible {
        return Err(MessagingError::InvalidRequest(format!(
            "user {recipient_id} is not an eligible recipient"
        )));
    }

    let title = if recipient.role == Role::Admin {
        ADMIN_CONVERSATION_TITLE.to_string()
    } else {
        recipient.display_name()
    };
    Ok(ensure_direct(db, caller_id, recipient_id, &title)?)
}

pub(crate) fn require_user(db: &Database, user_id: &str) -> Result<UserRow> {
    db.get_user(user_id)?
        .ok_or_else(|| MessagingError::NotFound("user", user_id.into()))
}

// -- Materialization helpers --

fn direct_with(db: &Database, caller_id: &str, other_id: &str) -> anyhow::Result<(ConversationRow, bool)> {
    let other = db
        .get_user(other_id)?
        .ok_or_else(|| anyhow!("user {other_id} missing from the directory"))?;
    ensure_direct(db, caller_id, &other.id, &other.display_name())
}

fn admin_conversation(
    db: &Database,
    parent_id: &str,
) -> anyhow::Result<Option<(ConversationRow, bool)>> {
    let Some(admin) = db.first_admin()? else {
        return Ok(None);
    };
    ensure_direct(db, parent_id, &admin.id, ADMIN_CONVERSATION_TITLE).map(Some)
}

/// Find-or-create one direct conversation, refreshing a stale title.
/// Returns (row, created).
fn ensure_direct(
    db: &Database,
    a: &str,
    b: &str,
    title: &str,
) -> anyhow::Result<(ConversationRow, bool)> {
    if let Some(existing) = db.find_direct_conversation(a, b)? {
        let row = refresh_title(db, existing, title)?;
        return Ok((row, false));
    }

    let id = Uuid::new_v4().to_string();
    if db.insert_direct_conversation(&id, a, b, title)? {
        let row = db
            .get_conversation(&id)?
            .ok_or_else(|| anyhow!("conversation {id} vanished after insert"))?;
        return Ok((row, true));
    }

    // Lost the creation race; the winner's row is the one.
    let row = db
        .find_direct_conversation(a, b)?
        .ok_or_else(|| anyhow!("conversation between {a} and {b} neither inserted nor found"))?;
    Ok((row, false))
}

fn ensure_class(db: &Database, class_level: &str) -> anyhow::Result<(ConversationRow, bool)> {
    if let Some(existing) = db.find_class_conversation(class_level)? {
        // Also re-syncs a title an admin renamed; the class name wins on the
        // next resolution.
        let row = refresh_title(db, existing, class_level)?;
        return Ok((row, false));
    }

    let id = Uuid::new_v4().to_string();
    if db.insert_class_conversation(&id, class_level, class_level)? {
        let row = db
            .get_conversation(&id)?
            .ok_or_else(|| anyhow!("conversation {id} vanished after insert"))?;
        return Ok((row, true));
    }

    let row = db
        .find_class_conversation(class_level)?
        .ok_or_else(|| anyhow!("class conversation for {class_level} neither inserted nor found"))?;
    Ok((row, false))
}

fn refresh_title(
    db: &Database,
    row: ConversationRow,
    title: &str,
) -> anyhow::Result<ConversationRow> {
    if row.title == title {
        return Ok(row);
    }
    db.update_conversation_title(&row.id, title)?;
    db.get_conversation(&row.id)?
        .ok_or_else(|| anyhow!("conversation {} vanished during title refresh", row.id))
}

/// Attach the most recent message as the list-preview annotation. Read-only;
/// a failed preview lookup degrades to no preview.
pub fn annotate(db: &Database, conversation: ConversationRow) -> ConversationEntry {
    let last_message = match db.latest_message(&conversation.id) {
        Ok(message) => message,
        Err(e) => {
            warn!(
                "Could not load the preview message for conversation {}: {}",
                conversation.id, e
            );
            None
        }
    };
    ConversationEntry {
        conversation,
        last_message,
    }
}
