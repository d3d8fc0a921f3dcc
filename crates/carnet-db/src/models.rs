//! Database row types — these map directly to SQLite rows.
//! Distinct from the carnet-types API models to keep the DB layer independent.

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;

use carnet_types::{ConversationKind, MessageKind, Role};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub class_level: Option<String>,
    pub created_at: String,
}

impl UserRow {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(UserRow {
            id: row.get(0)?,
            role: column_enum(row, 1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            email: row.get(4)?,
            class_level: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConversationRow {
    pub id: String,
    pub kind: ConversationKind,
    pub participant1_id: Option<String>,
    pub participant2_id: Option<String>,
    pub class_level: Option<String>,
    pub title: String,
    pub last_message_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ConversationRow {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participant1_id.as_deref() == Some(user_id)
            || self.participant2_id.as_deref() == Some(user_id)
    }

    /// The stored participant that is not `user_id`, if any.
    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        match (self.participant1_id.as_deref(), self.participant2_id.as_deref()) {
            (Some(p1), Some(p2)) if p1 == user_id => Some(p2),
            (Some(p1), Some(p2)) if p2 == user_id => Some(p1),
            _ => None,
        }
    }

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ConversationRow {
            id: row.get(0)?,
            kind: column_enum(row, 1)?,
            participant1_id: row.get(2)?,
            participant2_id: row.get(3)?,
            class_level: row.get(4)?,
            title: row.get(5)?,
            last_message_id: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub recipient_id: Option<String>,
    pub content: String,
    pub kind: MessageKind,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl MessageRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(MessageRow {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            sender_id: row.get(2)?,
            recipient_id: row.get(3)?,
            content: row.get(4)?,
            kind: column_enum(row, 5)?,
            file_path: row.get(6)?,
            file_name: row.get(7)?,
            mime_type: row.get(8)?,
            is_read: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

fn column_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
