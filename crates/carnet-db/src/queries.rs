use crate::Database;
use crate::models::{ConversationRow, MessageRow};
use anyhow::Result;
use rusqlite::OptionalExtension;
use carnet_types::MessageKind;

const CONVERSATION_COLUMNS: &str = "id, kind, participant1_id, participant2_id, class_level, \
     title, last_message_id, created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, recipient_id, content, kind, \
     file_path, file_name, mime_type, is_read, created_at, updated_at";

impl Database {
    // -- Conversations --

    /// Materialize a direct conversation. Returns false when another request
    /// won the race (the unique pair index swallows the insert); the caller
    /// re-fetches in that case.
    pub fn insert_direct_conversation(
        &self,
        id: &str,
        participant1_id: &str,
        participant2_id: &str,
        title: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO conversations
                     (id, kind, participant1_id, participant2_id, title)
                 VALUES (?1, 'direct', ?2, ?3, ?4)",
                rusqlite::params![id, participant1_id, participant2_id, title],
            )?;
            Ok(inserted == 1)
        })
    }

    /// Materialize a class conversation; same race contract as
    /// [`insert_direct_conversation`](Self::insert_direct_conversation).
    pub fn insert_class_conversation(&self, id: &str, class_level: &str, title: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO conversations (id, kind, class_level, title)
                 VALUES (?1, 'class', ?2, ?3)",
                rusqlite::params![id, class_level, title],
            )?;
            Ok(inserted == 1)
        })
    }

    /// Look up a direct conversation by its unordered participant pair.
    pub fn find_direct_conversation(&self, a: &str, b: &str) -> Result<Option<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE kind = 'direct'
                   AND ((participant1_id = ?1 AND participant2_id = ?2)
                     OR (participant1_id = ?2 AND participant2_id = ?1))"
            ))?;
            let row = stmt.query_row([a, b], ConversationRow::from_row).optional()?;
            Ok(row)
        })
    }

    pub fn find_class_conversation(&self, class_level: &str) -> Result<Option<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE kind = 'class' AND class_level = ?1"
            ))?;
            let row = stmt
                .query_row([class_level], ConversationRow::from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_conversation(&self, id: &str) -> Result<Option<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"
            ))?;
            let row = stmt.query_row([id], ConversationRow::from_row).optional()?;
            Ok(row)
        })
    }

    pub fn update_conversation_title(&self, id: &str, title: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE conversations SET title = ?2, updated_at = datetime('now') WHERE id = ?1",
                [id, title],
            )?;
            Ok(())
        })
    }

    /// Admin delete: removes the conversation's messages, then the
    /// conversation itself, in one transaction. Returns false when no such
    /// conversation existed.
    pub fn delete_conversation_cascade(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM messages WHERE conversation_id = ?1", [id])?;
            let removed = tx.execute("DELETE FROM conversations WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(removed == 1)
        })
    }

    // -- Messages --

    /// Append a message and point the conversation's last_message_id at it,
    /// atomically.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_message(
        &self,
        id: &str,
        conversation_id: &str,
        sender_id: &str,
        recipient_id: Option<&str>,
        content: &str,
        kind: MessageKind,
        file_path: Option<&str>,
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO messages
                     (id, conversation_id, sender_id, recipient_id, content, kind,
                      file_path, file_name, mime_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    id,
                    conversation_id,
                    sender_id,
                    recipient_id,
                    content,
                    kind.as_str(),
                    file_path,
                    file_name,
                    mime_type
                ],
            )?;
            tx.execute(
                "UPDATE conversations SET last_message_id = ?1, updated_at = datetime('now')
                 WHERE id = ?2",
                [id, conversation_id],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            let row = stmt.query_row([id], MessageRow::from_row).optional()?;
            Ok(row)
        })
    }

    /// Full message log of a conversation, oldest first. rowid breaks ties
    /// within the one-second resolution of the timestamps.
    pub fn messages_in_conversation(&self, conversation_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt
                .query_map([conversation_id], MessageRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Most recent message, used as the list preview annotation.
    pub fn latest_message(&self, conversation_id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT 1"
            ))?;
            let row = stmt
                .query_row([conversation_id], MessageRow::from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_message_content(&self, id: &str, content: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE messages SET content = ?2, updated_at = datetime('now') WHERE id = ?1",
                [id, content],
            )?;
            Ok(())
        })
    }

    pub fn mark_message_read(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE messages SET is_read = 1 WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Hard-delete a message. When it was the conversation's last message,
    /// the pointer is moved back to the next most recent one.
    pub fn delete_message(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let conversation_id: Option<String> = tx
                .query_row(
                    "SELECT conversation_id FROM messages WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            tx.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            if let Some(conversation_id) = conversation_id {
                tx.execute(
                    "UPDATE conversations
                     SET last_message_id = (SELECT id FROM messages
                                            WHERE conversation_id = ?1
                                            ORDER BY created_at DESC, rowid DESC
                                            LIMIT 1)
                     WHERE id = ?1 AND last_message_id = ?2",
                    [conversation_id.as_str(), id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    /// Substring search within one conversation, oldest first. `LIKE` is
    /// ASCII case-insensitive; the pattern is escaped so user input cannot
    /// smuggle wildcards.
    pub fn search_messages(&self, conversation_id: &str, query: &str) -> Result<Vec<MessageRow>> {
        let pattern = format!("%{}%", escape_like(query));
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1 AND content LIKE ?2 ESCAPE '\\'
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt
                .query_map([conversation_id, pattern.as_str()], MessageRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
