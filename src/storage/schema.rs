//! Database schema definitions for KAIKOON.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Tasks table
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    estimated_minutes INTEGER NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasks(user_id);
CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(user_id, created_at);

-- Task steps table
CREATE TABLE IF NOT EXISTS task_steps (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    description TEXT NOT NULL,
    materials TEXT,
    order_index INTEGER NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_task_steps_task_id ON task_steps(task_id);

-- Reflections table
CREATE TABLE IF NOT EXISTS reflections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    emoji_rating INTEGER NOT NULL,
    reflection_text TEXT NOT NULL,
    sentiment TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reflections_task_id ON reflections(task_id);

-- User progress table (one row per user, created lazily)
CREATE TABLE IF NOT EXISTS user_progress (
    user_id INTEGER PRIMARY KEY,
    kaiblooms_points INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

-- Collectible catalog (static, seeded once when empty)
CREATE TABLE IF NOT EXISTS collectible_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    emoji TEXT NOT NULL,
    cost INTEGER NOT NULL,
    description TEXT NOT NULL
);

-- Owned collectibles, one row per (user, type) with a quantity
CREATE TABLE IF NOT EXISTS user_collectibles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    collectible_type_id INTEGER NOT NULL REFERENCES collectible_types(id),
    quantity INTEGER NOT NULL DEFAULT 1,
    purchased_at TEXT NOT NULL,
    UNIQUE(user_id, collectible_type_id)
);

CREATE INDEX IF NOT EXISTS idx_user_collectibles_user_id ON user_collectibles(user_id);

-- User settings table (one row per user, created lazily with defaults)
CREATE TABLE IF NOT EXISTS user_settings (
    user_id INTEGER PRIMARY KEY,
    grade TEXT,
    classes_json TEXT,
    bigger_text INTEGER NOT NULL DEFAULT 0,
    haptic_buzz INTEGER NOT NULL DEFAULT 0,
    kaibeat_playlist_url TEXT,
    notifications_enabled INTEGER NOT NULL DEFAULT 0,
    break_reminders_enabled INTEGER NOT NULL DEFAULT 0,
    break_reminder_interval INTEGER NOT NULL DEFAULT 30,
    celebration_notifications_enabled INTEGER NOT NULL DEFAULT 0,
    daily_checkin_enabled INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);
"#;

/// SQL for schema version tracking (migrations)
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
