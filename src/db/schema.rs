//! Database schema and migrations for CARLOT.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - users table
    r#"
-- Users table for authentication and account management
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,  -- email matching is case-insensitive
    password    TEXT NOT NULL,           -- Argon2 hash, never the plaintext
    role        TEXT NOT NULL DEFAULT 'user',  -- 'user', 'admin'
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_email ON users(email);
CREATE INDEX idx_users_role ON users(role);
"#,
    // v2: Cars table for the garage listing
    r#"
-- Cars table for the public listing page
CREATE TABLE cars (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    make        TEXT NOT NULL,
    model       TEXT NOT NULL,
    year        INTEGER NOT NULL,
    price       INTEGER NOT NULL,        -- in whole currency units
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_cars_make ON cars(make);
"#,
];
