//! Append-only message log with ownership-gated mutation.

use anyhow::anyhow;
use uuid::Uuid;

use carnet_db::Database;
use carnet_db::models::MessageRow;
use carnet_types::{MessageKind, Role};

use crate::error::{MessagingError, Result};
use crate::policy::can_access;

/// Payload for [`send_message`].
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: String,
    pub content: String,
    pub kind: MessageKind,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Append a message. The sender must pass the access policy; a message needs
/// text content or an attachment reference.
pub fn send_message(db: &Database, sender_id: &str, new: NewMessage) -> Result<MessageRow> {
    let conversation = db
        .get_conversation(&new.conversation_id)?
        .ok_or_else(|| MessagingError::NotFound("conversation", new.conversation_id.clone()))?;

    if !can_access(db, &conversation, sender_id) {
        return Err(MessagingError::not_member(sender_id, &conversation.id));
    }
    if new.content.trim().is_empty() && new.file_path.is_none() {
        return Err(MessagingError::InvalidRequest(
            "message needs text content or an attachment".into(),
        ));
    }

    // recipient_id only exists for conversations that store their two
    // participants; class messages fan out implicitly.
    let recipient_id = conversation.other_participant(sender_id).map(str::to_owned);

    let id = Uuid::new_v4().to_string();
    db.insert_message(
        &id,
        &conversation.id,
        sender_id,
        recipient_id.as_deref(),
        &new.content,
        new.kind,
        new.file_path.as_deref(),
        new.file_name.as_deref(),
        new.mime_type.as_deref(),
    )?;

    fetch_message(db, &id)
}

/// Full log of a conversation, oldest first. Access-gated.
pub fn conversation_messages(
    db: &Database,
    caller_id: &str,
    conversation_id: &str,
) -> Result<Vec<MessageRow>> {
    let conversation = db
        .get_conversation(conversation_id)?
        .ok_or_else(|| MessagingError::NotFound("conversation", conversation_id.into()))?;
    if !can_access(db, &conversation, caller_id) {
        return Err(MessagingError::not_member(caller_id, conversation_id));
    }
    Ok(db.messages_in_conversation(conversation_id)?)
}

pub fn update_message(
    db: &Database,
    caller_id: &str,
    caller_role: Role,
    message_id: &str,
    content: &str,
) -> Result<MessageRow> {
    let message = db
        .get_message(message_id)?
        .ok_or_else(|| MessagingError::NotFound("message", message_id.into()))?;
    require_owner_or_admin(&message, caller_id, caller_role)?;
    if content.trim().is_empty() {
        return Err(MessagingError::InvalidRequest(
            "message content must not be empty".into(),
        ));
    }

    db.update_message_content(message_id, content)?;
    fetch_message(db, message_id)
}

pub fn delete_message(
    db: &Database,
    caller_id: &str,
    caller_role: Role,
    message_id: &str,
) -> Result<()> {
    let message = db
        .get_message(message_id)?
        .ok_or_else(|| MessagingError::NotFound("message", message_id.into()))?;
    require_owner_or_admin(&message, caller_id, caller_role)?;
    Ok(db.delete_message(message_id)?)
}

/// One message the caller may read. The owning conversation is re-derived
/// from the message row itself, never from a client-supplied id, and the
/// access policy re-runs against it.
pub fn readable_message(db: &Database, caller_id: &str, message_id: &str) -> Result<MessageRow> {
    let message = db
        .get_message(message_id)?
        .ok_or_else(|| MessagingError::NotFound("message", message_id.into()))?;
    let conversation = db
        .get_conversation(&message.conversation_id)?
        .ok_or_else(|| MessagingError::NotFound("conversation", message.conversation_id.clone()))?;
    if !can_access(db, &conversation, caller_id) {
        return Err(MessagingError::not_member(caller_id, &conversation.id));
    }
    Ok(message)
}

/// Flip the read flag. Gated by the access policy on the owning
/// conversation, like every other read of it.
pub fn mark_read(db: &Database, caller_id: &str, message_id: &str) -> Result<MessageRow> {
    let message = readable_message(db, caller_id, message_id)?;
    db.mark_message_read(&message.id)?;
    fetch_message(db, &message.id)
}

/// Substring search within one conversation, oldest first. Access-gated.
pub fn search_messages(
    db: &Database,
    caller_id: &str,
    conversation_id: &str,
    query: &str,
) -> Result<Vec<MessageRow>> {
    if query.trim().is_empty() {
        return Err(MessagingError::InvalidRequest(
            "search query must not be empty".into(),
        ));
    }
    let conversation = db
        .get_conversation(conversation_id)?
        .ok_or_else(|| MessagingError::NotFound("conversation", conversation_id.into()))?;
    if !can_access(db, &conversation, caller_id) {
        return Err(MessagingError::not_member(caller_id, conversation_id));
    }
    Ok(db.search_messages(conversation_id, query)?)
}

// Edits and deletes ride on the token role: ownership already implied
// access when the message was written.
fn require_owner_or_admin(message: &MessageRow, caller_id: &str, caller_role: Role) -> Result<()> {
    if message.sender_id != caller_id && caller_role != Role::Admin {
        return Err(MessagingError::Forbidden(format!(
            "user {caller_id} may not modify message {}",
            message.id
        )));
    }
    Ok(())
}

fn fetch_message(db: &Database, id: &str) -> Result<MessageRow> {
    db.get_message(id)?
        .ok_or_else(|| MessagingError::Internal(anyhow!("message {id} vanished after write")))
}
