// crates/memory-store/src/migrations.rs
//! Inline, numbered SQL migrations applied in order and tracked by a
//! `_migrations` table, mirroring `claude-view-db::migrations::MIGRATIONS`'s
//! `&[&str]` const-slice shape.

pub const MIGRATIONS: &[&str] = &[
    // 1. sessions
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        session_id TEXT PRIMARY KEY,
        project TEXT NOT NULL,
        prompt TEXT NOT NULL DEFAULT '',
        started_at INTEGER NOT NULL,
        ended_at INTEGER,
        observation_count INTEGER NOT NULL DEFAULT 0,
        summary TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        parent_session_id TEXT
    )
    "#,
    // 2. user_prompts
    r#"
    CREATE TABLE IF NOT EXISTS user_prompts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL REFERENCES sessions(session_id),
        prompt_number INTEGER NOT NULL,
        prompt_text TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        embedding BLOB,
        UNIQUE(session_id, prompt_number)
    )
    "#,
    // 3. observations
    r#"
    CREATE TABLE IF NOT EXISTS observations (
        id TEXT PRIMARY KEY,
        session_id TEXT NOT NULL REFERENCES sessions(session_id),
        project TEXT NOT NULL,
        tool_name TEXT NOT NULL,
        tool_input TEXT NOT NULL DEFAULT '',
        tool_response TEXT NOT NULL DEFAULT '',
        cwd TEXT NOT NULL DEFAULT '',
        timestamp INTEGER NOT NULL,
        type TEXT NOT NULL DEFAULT 'other',
        title TEXT NOT NULL DEFAULT '',
        subtitle TEXT NOT NULL DEFAULT '',
        narrative TEXT NOT NULL DEFAULT '',
        facts TEXT NOT NULL DEFAULT '[]',
        concepts TEXT NOT NULL DEFAULT '[]',
        prompt_number INTEGER,
        files_read TEXT NOT NULL DEFAULT '[]',
        files_modified TEXT NOT NULL DEFAULT '[]',
        content_hash TEXT NOT NULL,
        compressed_summary TEXT,
        is_compressed INTEGER NOT NULL DEFAULT 0,
        embedding BLOB
    )
    "#,
    // 4. session_summaries
    r#"
    CREATE TABLE IF NOT EXISTS session_summaries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL REFERENCES sessions(session_id),
        project TEXT NOT NULL,
        request TEXT NOT NULL DEFAULT '',
        completed TEXT NOT NULL DEFAULT '',
        files_read TEXT NOT NULL DEFAULT '[]',
        files_modified TEXT NOT NULL DEFAULT '[]',
        next_steps TEXT NOT NULL DEFAULT '',
        notes TEXT NOT NULL DEFAULT '',
        decisions TEXT NOT NULL DEFAULT '[]',
        errors TEXT NOT NULL DEFAULT '[]',
        prompt_number INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        embedding BLOB
    )
    "#,
    // 5. session_digests
    r#"
    CREATE TABLE IF NOT EXISTS session_digests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL UNIQUE REFERENCES sessions(session_id),
        project TEXT NOT NULL,
        digest TEXT NOT NULL DEFAULT '',
        observation_count INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        embedding BLOB
    )
    "#,
    // 6. task_queue
    r#"
    CREATE TABLE IF NOT EXISTS task_queue (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        task_type TEXT NOT NULL,
        target_table TEXT NOT NULL,
        target_id TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        retry_count INTEGER NOT NULL DEFAULT 0
    )
    "#,
    // 7. memory_entries
    r#"
    CREATE TABLE IF NOT EXISTS memory_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        type TEXT NOT NULL DEFAULT 'semantic',
        namespace TEXT NOT NULL DEFAULT 'default',
        tags TEXT NOT NULL DEFAULT '[]',
        metadata TEXT NOT NULL DEFAULT '{}',
        embedding BLOB,
        access_count INTEGER NOT NULL DEFAULT 0,
        last_accessed_at INTEGER,
        version INTEGER NOT NULL DEFAULT 1,
        importance REAL NOT NULL DEFAULT 0.5,
        decay REAL NOT NULL DEFAULT 0.0,
        created_at INTEGER NOT NULL,
        content_hash TEXT NOT NULL
    )
    "#,
    // 8. memory_entries FTS5 trigram index + sync triggers
    r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS memory_entries_fts USING fts5(
        key, content, namespace, tags,
        tokenize='trigram',
        content='memory_entries',
        content_rowid='id'
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS memory_entries_ai AFTER INSERT ON memory_entries BEGIN
        INSERT INTO memory_entries_fts(rowid, key, content, namespace, tags)
        VALUES (new.id, new.key, new.content, new.namespace, new.tags);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS memory_entries_ad AFTER DELETE ON memory_entries BEGIN
        INSERT INTO memory_entries_fts(memory_entries_fts, rowid, key, content, namespace, tags)
        VALUES ('delete', old.id, old.key, old.content, old.namespace, old.tags);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS memory_entries_au AFTER UPDATE ON memory_entries BEGIN
        INSERT INTO memory_entries_fts(memory_entries_fts, rowid, key, content, namespace, tags)
        VALUES ('delete', old.id, old.key, old.content, old.namespace, old.tags);
        INSERT INTO memory_entries_fts(rowid, key, content, namespace, tags)
        VALUES (new.id, new.key, new.content, new.namespace, new.tags);
    END
    "#,
    // 9. mandatory + supporting indexes (spec §4.1)
    "CREATE INDEX IF NOT EXISTS idx_observations_session_id ON observations(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_observations_project ON observations(project)",
    "CREATE INDEX IF NOT EXISTS idx_observations_timestamp ON observations(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_observations_content_hash ON observations(content_hash)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_project ON sessions(project)",
    "CREATE INDEX IF NOT EXISTS idx_user_prompts_session_id ON user_prompts(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_session_summaries_session_project ON session_summaries(session_id, project)",
    "CREATE INDEX IF NOT EXISTS idx_task_queue_status_type ON task_queue(status, task_type)",
    "CREATE INDEX IF NOT EXISTS idx_memory_entries_content_hash ON memory_entries(content_hash)",
];
