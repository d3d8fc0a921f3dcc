use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ConversationKind, MessageKind, Role};

// -- Conversations --

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub kind: ConversationKind,
    pub participant1_id: Option<Uuid>,
    pub participant2_id: Option<Uuid>,
    pub class_level: Option<String>,
    pub title: String,
    /// Most recent message, annotated for list previews. Not stored.
    pub last_message: Option<MessageResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrGetConversationRequest {
    pub recipient_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreateOrGetConversationResponse {
    pub conversation: ConversationResponse,
    pub is_new: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateConversationRequest {
    pub title: Option<String>,
}

// -- Messages --

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub content: String,
    pub kind: MessageKind,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub conversation_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMessageRequest {
    pub content: String,
}

// -- Attachments --

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_name: String,
    pub stored_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: u64,
}

// -- Recipients --

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub role: Role,
    pub display_name: String,
    pub class_level: Option<String>,
}
