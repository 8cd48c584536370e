//! v001 -- Initial schema creation.
//!
//! Creates the five record tables `visitors`, `phones`, `logs`, `blacklist`
//! and `users`, plus the key/value `settings` table.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Visitors
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS visitors (
    id              TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    pass_id         TEXT NOT NULL,              -- BPS-XXXXX
    name            TEXT NOT NULL,
    mobile          TEXT NOT NULL,
    visitor_type    TEXT NOT NULL,
    purpose         TEXT NOT NULL,
    host_name       TEXT NOT NULL,
    student_name    TEXT,
    student_class   TEXT,
    student_section TEXT,
    check_in_time   INTEGER NOT NULL,           -- epoch ms
    check_out_time  INTEGER,                    -- epoch ms, set on check-out
    photo_base64    TEXT NOT NULL,              -- data URI
    synced          INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    status          TEXT NOT NULL               -- ACTIVE | CHECKED_OUT
);

CREATE INDEX IF NOT EXISTS idx_visitors_status ON visitors(status, check_in_time DESC);
CREATE INDEX IF NOT EXISTS idx_visitors_synced ON visitors(synced);

-- ----------------------------------------------------------------
-- Phone history
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS phones (
    number            TEXT PRIMARY KEY NOT NULL,
    trust_level       TEXT NOT NULL,
    visit_count       INTEGER NOT NULL,
    last_visitor_name TEXT NOT NULL,
    first_seen        INTEGER NOT NULL,
    last_seen         INTEGER NOT NULL
);

-- ----------------------------------------------------------------
-- Audit log (append-only)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS logs (
    id        TEXT PRIMARY KEY NOT NULL,        -- UUID v4
    action    TEXT NOT NULL,
    timestamp INTEGER NOT NULL,                 -- epoch ms
    details   TEXT NOT NULL,
    user_id   TEXT NOT NULL,
    metadata  TEXT                              -- JSON object
);

CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp DESC);

-- ----------------------------------------------------------------
-- Blacklist
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS blacklist (
    id     TEXT PRIMARY KEY NOT NULL,           -- UUID v4
    name   TEXT NOT NULL,
    reason TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Operator accounts
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id                TEXT PRIMARY KEY NOT NULL,
    name              TEXT NOT NULL,
    pin               TEXT NOT NULL,
    role              TEXT NOT NULL,            -- GUARD | ADMIN | DEVELOPER
    is_session_active INTEGER NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_pin ON users(pin);

-- ----------------------------------------------------------------
-- Settings (singletons keyed by a fixed id)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS settings (
    id    TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL                         -- JSON
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
