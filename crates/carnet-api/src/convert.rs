//! Row → response conversions. A corrupt id degrades to the nil uuid with a
//! warning rather than failing the whole listing.

use tracing::warn;
use uuid::Uuid;

use carnet_db::models::{MessageRow, UserRow};
use carnet_db::parse_timestamp;
use carnet_messaging::ConversationEntry;
use carnet_types::api::{ConversationResponse, MessageResponse, UserResponse};

pub fn conversation_response(entry: ConversationEntry) -> ConversationResponse {
    let ConversationEntry {
        conversation: row,
        last_message,
    } = entry;
    ConversationResponse {
        id: parse_uuid(&row.id, "conversation id"),
        kind: row.kind,
        participant1_id: row.participant1_id.as_deref().map(|p| parse_uuid(p, "participant1_id")),
        participant2_id: row.participant2_id.as_deref().map(|p| parse_uuid(p, "participant2_id")),
        class_level: row.class_level,
        title: row.title,
        last_message: last_message.map(message_response),
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}

pub fn message_response(row: MessageRow) -> MessageResponse {
    MessageResponse {
        id: parse_uuid(&row.id, "message id"),
        conversation_id: parse_uuid(&row.conversation_id, "conversation_id"),
        sender_id: parse_uuid(&row.sender_id, "sender_id"),
        recipient_id: row.recipient_id.as_deref().map(|r| parse_uuid(r, "recipient_id")),
        content: row.content,
        kind: row.kind,
        file_path: row.file_path,
        file_name: row.file_name,
        mime_type: row.mime_type,
        is_read: row.is_read,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}

pub fn user_response(row: UserRow) -> UserResponse {
    let display_name = row.display_name();
    UserResponse {
        id: parse_uuid(&row.id, "user id"),
        role: row.role,
        display_name,
        class_level: row.class_level,
    }
}

fn parse_uuid(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, raw, e);
        Uuid::default()
    })
}
