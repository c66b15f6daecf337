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
        info!("running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE accounts (
                id              TEXT PRIMARY KEY,
                email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE profiles (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL DEFAULT '',
                name        TEXT NOT NULL DEFAULT '',
                skills      TEXT NOT NULL DEFAULT '[]',
                bio         TEXT,
                location    TEXT
            );

            -- Pairs are stored lower id first; the CHECK keeps every writer
            -- on that rule so UNIQUE covers the unordered pair.
            CREATE TABLE conversations (
                id          TEXT PRIMARY KEY,
                user1_id    TEXT NOT NULL,
                user2_id    TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                CHECK (user1_id < user2_id),
                UNIQUE (user1_id, user2_id)
            );

            CREATE INDEX idx_conversations_user2
                ON conversations(user2_id);

            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
                sender_id       TEXT NOT NULL,
                text            TEXT NOT NULL CHECK (length(text) > 0),
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_messages_conversation
                ON messages(conversation_id, created_at);

            CREATE TABLE tasks (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                description     TEXT,
                requirements    TEXT NOT NULL DEFAULT '[]',
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_tasks_created
                ON tasks(created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
