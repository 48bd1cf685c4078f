/*!
 * Database schema definitions and migrations.
 *
 * This module contains the SQL schema for all database tables
 * and handles schema migrations for version upgrades.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // Check current schema version
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        // Fresh database - create all tables
        info!("Initializing database schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        // Need to migrate
        info!(
            "Migrating database schema from v{} to v{}",
            current_version, SCHEMA_VERSION
        );
        migrate_schema(conn, current_version)?;
    } else {
        debug!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    // Check if the schema_version table exists
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    // Enable WAL mode for better concurrency and crash recovery
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Enable foreign keys
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    // Create schema version table
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    // Teacher profiles; each owns one wallet account
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            school TEXT,
            phone TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_profiles_name ON profiles(name);
        "#,
    )?;

    // Generated lesson notes
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS lesson_notes (
            id TEXT PRIMARY KEY,
            profile_id TEXT NOT NULL REFERENCES profiles(id),
            subject TEXT NOT NULL,
            level TEXT NOT NULL,
            strand TEXT NOT NULL,
            sub_strand TEXT NOT NULL,
            content_standard TEXT NOT NULL,
            template_name TEXT NOT NULL,
            lesson_count INTEGER NOT NULL,
            content TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            provider TEXT NOT NULL,
            model TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_lesson_notes_profile ON lesson_notes(profile_id);
        CREATE INDEX IF NOT EXISTS idx_lesson_notes_hash ON lesson_notes(content_hash);
        CREATE INDEX IF NOT EXISTS idx_lesson_notes_subject ON lesson_notes(subject, level);
        "#,
    )?;

    // Note templates
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS templates (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    // Wallet accounts, one per profile; balances in pesewas
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS wallet_accounts (
            profile_id TEXT PRIMARY KEY REFERENCES profiles(id),
            balance_pesewas INTEGER NOT NULL DEFAULT 0 CHECK (balance_pesewas >= 0),
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    // Mobile-money payment transactions
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS payment_transactions (
            reference TEXT PRIMARY KEY,
            profile_id TEXT NOT NULL REFERENCES profiles(id),
            amount_pesewas INTEGER NOT NULL,
            currency TEXT NOT NULL,
            phone TEXT NOT NULL,
            momo_provider TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_payment_transactions_profile ON payment_transactions(profile_id);
        CREATE INDEX IF NOT EXISTS idx_payment_transactions_status ON payment_transactions(status);
        "#,
    )?;

    Ok(())
}

/// Migrate schema from an older version
fn migrate_schema(conn: &Connection, from_version: i32) -> Result<()> {
    // No migrations yet; placeholder mirrors the versioning contract
    let _ = conn;
    anyhow::bail!("No migration path from schema v{}", from_version)
}
