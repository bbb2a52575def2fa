//! SQL schema for the assets SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Envelopes. content_id points into charts, insights or audiences
-- depending on asset_type; nothing enforces it at this level.
CREATE TABLE IF NOT EXISTS assets (
    id          TEXT PRIMARY KEY,
    content_id  TEXT NOT NULL,
    asset_type  TEXT NOT NULL,   -- 'CHART' | 'INSIGHT' | 'AUDIENCE'
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    create_time TEXT NOT NULL,   -- RFC 3339 UTC
    update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS charts (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    x_axis_title TEXT NOT NULL,
    y_axis_title TEXT NOT NULL,
    data_json    TEXT NOT NULL,
    create_time  TEXT NOT NULL,
    update_time  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS insights (
    id          TEXT PRIMARY KEY,
    text        TEXT NOT NULL,
    create_time TEXT NOT NULL,
    update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS audiences (
    id                   TEXT PRIMARY KEY,
    gender               TEXT NOT NULL,     -- 'MALE' | 'FEMALE'
    birth_country        TEXT NOT NULL,
    age_group            TEXT NOT NULL,     -- '18-23' | '24-35' | '36-45' | '46+'
    social_media_hours   INTEGER NOT NULL,
    purchases_last_month INTEGER NOT NULL,
    create_time          TEXT NOT NULL,
    update_time          TEXT NOT NULL
);

-- Uniqueness of (user_id, asset_id) is enforced by the favourites service.
CREATE TABLE IF NOT EXISTS favourites (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    asset_id    TEXT NOT NULL,
    create_time TEXT NOT NULL,
    update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    create_time   TEXT NOT NULL,
    update_time   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS favourites_user_idx  ON favourites(user_id);
CREATE INDEX IF NOT EXISTS favourites_asset_idx ON favourites(asset_id);

PRAGMA user_version = 1;
";
