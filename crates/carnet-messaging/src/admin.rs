//! Conversation mutations, restricted to administrators.

use anyhow::anyhow;

use carnet_db::Database;
use carnet_db::models::ConversationRow;
use carnet_types::Role;

use crate::error::{MessagingError, Result};
use crate::resolver::require_user;

/// Rename a conversation. `None` leaves the title untouched and echoes the
/// current row; an empty title is rejected.
pub fn update_conversation(
    db: &Database,
    caller_id: &str,
    conversation_id: &str,
    title: Option<&str>,
) -> Result<ConversationRow> {
    require_admin(db, caller_id)?;
    let conversation = db
        .get_conversation(conversation_id)?
        .ok_or_else(|| MessagingError::NotFound("conversation", conversation_id.into()))?;

    let Some(title) = title else {
        return Ok(conversation);
    };
    if title.trim().is_empty() {
        return Err(MessagingError::InvalidRequest(
            "title must not be empty".into(),
        ));
    }

    db.update_conversation_title(conversation_id, title)?;
    db.get_conversation(conversation_id)?.ok_or_else(|| {
        MessagingError::Internal(anyhow!("conversation {conversation_id} vanished during rename"))
    })
}

/// Remove a conversation and all of its messages in one transaction.
pub fn delete_conversation(db: &Database, caller_id: &str, conversation_id: &str) -> Result<()> {
    require_admin(db, caller_id)?;
    if !db.delete_conversation_cascade(conversation_id)? {
        return Err(MessagingError::NotFound(
            "conversation",
            conversation_id.into(),
        ));
    }
    Ok(())
}

// The role is read fresh from the directory rather than from the token: a
// demoted admin keeps a valid token until it expires.
fn require_admin(db: &Database, caller_id: &str) -> Result<()> {
    let caller = require_user(db, caller_id)?;
    if caller.role != Role::Admin {
        return Err(MessagingError::Forbidden(format!(
            "user {caller_id} is not an administrator"
        )));
    }
    Ok(())
}
