use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            -- Directory tables. Rows are written by the account-provisioning
            -- service; messaging only reads them.
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                role        TEXT NOT NULL CHECK (role IN ('student','parent','admin')),
                first_name  TEXT NOT NULL,
                last_name   TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                class_level TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE parent_student_links (
                parent_id   TEXT NOT NULL REFERENCES users(id),
                student_id  TEXT NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (parent_id, student_id)
            );

            CREATE INDEX idx_links_student ON parent_student_links(student_id);

            CREATE TABLE conversations (
                id              TEXT PRIMARY KEY,
                kind            TEXT NOT NULL CHECK (kind IN ('direct','class','group')),
                participant1_id TEXT REFERENCES users(id),
                participant2_id TEXT REFERENCES users(id),
                class_level     TEXT,
                title           TEXT NOT NULL,
                last_message_id TEXT,
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- One direct conversation per unordered participant pair: the
            -- index normalizes the pair, so the insert order of the two ids
            -- never matters. Concurrent INSERT OR IGNOREs collapse onto the
            -- same row.
            CREATE UNIQUE INDEX idx_conversations_pair
                ON conversations(kind, min(participant1_id, participant2_id),
                                 max(participant1_id, participant2_id))
                WHERE kind IN ('direct','group');

            CREATE UNIQUE INDEX idx_conversations_class
                ON conversations(kind, class_level)
                WHERE kind = 'class';

            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id),
                sender_id       TEXT NOT NULL REFERENCES users(id),
                recipient_id    TEXT REFERENCES users(id),
                content         TEXT NOT NULL,
                kind            TEXT NOT NULL DEFAULT 'text' CHECK (kind IN ('text','image','file','audio')),
                file_path       TEXT,
                file_name       TEXT,
                mime_type       TEXT,
                is_read         INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_messages_conversation
                ON messages(conversation_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}
