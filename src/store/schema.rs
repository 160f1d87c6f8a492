//! SQL owned by the Postgres binding of the events relation.

use tokio_postgres::types::Type;

pub(super) const CREATE_EVENTS: &str = "
    CREATE TABLE IF NOT EXISTS events (
        id BIGSERIAL PRIMARY KEY,
        account_id TEXT NOT NULL,
        client_id TEXT NOT NULL,
        session_id TEXT NOT NULL,
        name TEXT NOT NULL,
        value NUMERIC NOT NULL DEFAULT 0,
        timestamp TIMESTAMPTZ NOT NULL,
        page_location TEXT NOT NULL DEFAULT '',
        page_title TEXT NOT NULL DEFAULT '',
        page_referrer TEXT NOT NULL DEFAULT '',
        user_agent TEXT NOT NULL DEFAULT '',
        screen_resolution TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS events_timestamp_idx ON events (timestamp);
";

pub(super) const INSERT_EVENT: &str = "
    INSERT INTO events (
        account_id,
        client_id,
        session_id,
        name,
        value,
        timestamp,
        page_location,
        page_title,
        page_referrer,
        user_agent,
        screen_resolution
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    RETURNING id";

pub(super) const RECENT_EVENTS: &str = "SELECT id, name, value FROM events ORDER BY id DESC LIMIT $1";

pub(super) const COPY_EVENTS: &str = "
    COPY events (
        account_id,
        client_id,
        session_id,
        name,
        value,
        timestamp,
        page_location,
        page_title,
        page_referrer,
        user_agent,
        screen_resolution
    )
    FROM STDIN BINARY";

/// Column types of [`COPY_EVENTS`], in column order.
pub(super) const COPY_EVENT_TYPES: &[Type] = &[
    Type::TEXT,
    Type::TEXT,
    Type::TEXT,
    Type::TEXT,
    Type::NUMERIC,
    Type::TIMESTAMPTZ,
    Type::TEXT,
    Type::TEXT,
    Type::TEXT,
    Type::TEXT,
    Type::TEXT,
];
