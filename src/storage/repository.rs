/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::str::FromStr;
use uuid::Uuid;

use super::connection::DatabaseConnection;
use super::models::{
    LessonNoteRecord, PaymentStatus, PaymentTransactionRecord, ProfileRecord, TemplateRecord,
    WalletAccountRecord,
};

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

/// Current time as an ISO-8601 string
fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/// SHA-256 hex digest of note content, used for deduplication
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    // =========================================================================
    // Profile Operations
    // =========================================================================

    /// Get a profile by name, creating it (and its wallet) when missing
    pub async fn ensure_profile(&self, name: &str) -> Result<ProfileRecord> {
        let name = name.to_string();

        self.db
            .execute_async(move |conn| {
                if let Some(profile) = Self::get_profile_by_name_sync(conn, &name)? {
                    return Ok(profile);
                }

                let now = now_iso();
                let profile = ProfileRecord {
                    id: Uuid::new_v4().to_string(),
                    name: name.clone(),
                    school: None,
                    phone: None,
                    created_at: now.clone(),
                    updated_at: now.clone(),
                };

                conn.execute(
                    "INSERT INTO profiles (id, name, school, phone, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        profile.id,
                        profile.name,
                        profile.school,
                        profile.phone,
                        profile.created_at,
                        profile.updated_at,
                    ],
                )?;

                conn.execute(
                    "INSERT INTO wallet_accounts (profile_id, balance_pesewas, updated_at)
                     VALUES (?1, 0, ?2)",
                    params![profile.id, now],
                )?;

                debug!("Created profile '{}' ({})", profile.name, profile.id);
                Ok(profile)
            })
            .await
    }

    /// Get a profile by name
    pub async fn get_profile_by_name(&self, name: &str) -> Result<Option<ProfileRecord>> {
        let name = name.to_string();
        self.db
            .execute_async(move |conn| Self::get_profile_by_name_sync(conn, &name))
            .await
    }

    fn get_profile_by_name_sync(conn: &Connection, name: &str) -> Result<Option<ProfileRecord>> {
        let result = conn
            .query_row(
                "SELECT id, name, school, phone, created_at, updated_at
                 FROM profiles WHERE name = ?1",
                params![name],
                |row| {
                    Ok(ProfileRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        school: row.get(2)?,
                        phone: row.get(3)?,
                        created_at: row.get(4)?,
                        updated_at: row.get(5)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    /// Update a profile's phone number
    pub async fn set_profile_phone(&self, profile_id: &str, phone: &str) -> Result<()> {
        let profile_id = profile_id.to_string();
        let phone = phone.to_string();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "UPDATE profiles SET phone = ?1, updated_at = ?2 WHERE id = ?3",
                    params![phone, now_iso(), profile_id],
                )?;
                Ok(())
            })
            .await
    }

    // =========================================================================
    // Wallet Operations
    // =========================================================================

    /// Current wallet balance for a profile, in pesewas
    pub async fn wallet_balance(&self, profile_id: &str) -> Result<i64> {
        let profile_id = profile_id.to_string();

        self.db
            .execute_async(move |conn| {
                let balance: Option<i64> = conn
                    .query_row(
                        "SELECT balance_pesewas FROM wallet_accounts WHERE profile_id = ?1",
                        params![profile_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(balance.unwrap_or(0))
            })
            .await
    }

    /// Get the wallet account row for a profile
    pub async fn get_wallet(&self, profile_id: &str) -> Result<Option<WalletAccountRecord>> {
        let profile_id = profile_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        "SELECT profile_id, balance_pesewas, updated_at
                         FROM wallet_accounts WHERE profile_id = ?1",
                        params![profile_id],
                        |row| {
                            Ok(WalletAccountRecord {
                                profile_id: row.get(0)?,
                                balance_pesewas: row.get(1)?,
                                updated_at: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// Credit a wallet by the given amount
    pub async fn credit_wallet(&self, profile_id: &str, amount_pesewas: i64) -> Result<()> {
        let profile_id = profile_id.to_string();

        self.db
            .execute_async(move |conn| {
                let changed = conn.execute(
                    "UPDATE wallet_accounts
                     SET balance_pesewas = balance_pesewas + ?1, updated_at = ?2
                     WHERE profile_id = ?3",
                    params![amount_pesewas, now_iso(), profile_id],
                )?;
                if changed == 0 {
                    conn.execute(
                        "INSERT INTO wallet_accounts (profile_id, balance_pesewas, updated_at)
                         VALUES (?1, ?2, ?3)",
                        params![profile_id, amount_pesewas, now_iso()],
                    )?;
                }
                Ok(())
            })
            .await
    }

    /// Attempt an atomic conditional debit.
    ///
    /// Returns true when the balance covered the amount and was debited;
    /// false leaves the balance untouched. The single conditional UPDATE
    /// guarantees the balance can never go negative.
    pub async fn try_debit_wallet(&self, profile_id: &str, amount_pesewas: i64) -> Result<bool> {
        let profile_id = profile_id.to_string();

        self.db
            .execute_async(move |conn| {
                let changed = conn.execute(
                    "UPDATE wallet_accounts
                     SET balance_pesewas = balance_pesewas - ?1, updated_at = ?2
                     WHERE profile_id = ?3 AND balance_pesewas >= ?1",
                    params![amount_pesewas, now_iso(), profile_id],
                )?;
                Ok(changed == 1)
            })
            .await
    }

    // =========================================================================
    // Lesson Note Operations
    // =========================================================================

    /// Insert a generated lesson note
    pub async fn insert_lesson_note(&self, note: &LessonNoteRecord) -> Result<()> {
        let note = note.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO lesson_notes (
                        id, profile_id, subject, level, strand, sub_strand,
                        content_standard, template_name, lesson_count, content,
                        content_hash, provider, model, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                    "#,
                    params![
                        note.id,
                        note.profile_id,
                        note.subject,
                        note.level,
                        note.strand,
                        note.sub_strand,
                        note.content_standard,
                        note.template_name,
                        note.lesson_count,
                        note.content,
                        note.content_hash,
                        note.provider,
                        note.model,
                        note.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a lesson note by id
    pub async fn get_lesson_note(&self, note_id: &str) -> Result<Option<LessonNoteRecord>> {
        let note_id = note_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT id, profile_id, subject, level, strand, sub_strand,
                               content_standard, template_name, lesson_count, content,
                               content_hash, provider, model, created_at
                        FROM lesson_notes WHERE id = ?1
                        "#,
                        params![note_id],
                        Self::map_lesson_note_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// List lesson notes for a profile, newest first
    pub async fn list_lesson_notes(&self, profile_id: &str) -> Result<Vec<LessonNoteRecord>> {
        let profile_id = profile_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, profile_id, subject, level, strand, sub_strand,
                           content_standard, template_name, lesson_count, content,
                           content_hash, provider, model, created_at
                    FROM lesson_notes WHERE profile_id = ?1
                    ORDER BY created_at DESC
                    "#,
                )?;

                let notes = stmt
                    .query_map(params![profile_id], Self::map_lesson_note_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await
    }

    /// Find a note with identical content for a profile
    pub async fn find_note_by_hash(
        &self,
        profile_id: &str,
        hash: &str,
    ) -> Result<Option<LessonNoteRecord>> {
        let profile_id = profile_id.to_string();
        let hash = hash.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT id, profile_id, subject, level, strand, sub_strand,
                               content_standard, template_name, lesson_count, content,
                               content_hash, provider, model, created_at
                        FROM lesson_notes
                        WHERE profile_id = ?1 AND content_hash = ?2
                        LIMIT 1
                        "#,
                        params![profile_id, hash],
                        Self::map_lesson_note_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    fn map_lesson_note_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LessonNoteRecord> {
        Ok(LessonNoteRecord {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            subject: row.get(2)?,
            level: row.get(3)?,
            strand: row.get(4)?,
            sub_strand: row.get(5)?,
            content_standard: row.get(6)?,
            template_name: row.get(7)?,
            lesson_count: row.get(8)?,
            content: row.get(9)?,
            content_hash: row.get(10)?,
            provider: row.get(11)?,
            model: row.get(12)?,
            created_at: row.get(13)?,
        })
    }

    // =========================================================================
    // Template Operations
    // =========================================================================

    /// Insert or replace a template by name
    pub async fn upsert_template(&self, template: &TemplateRecord) -> Result<()> {
        let template = template.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO templates (id, name, description, body, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(name) DO UPDATE SET
                        description = excluded.description,
                        body = excluded.body
                    "#,
                    params![
                        template.id,
                        template.name,
                        template.description,
                        template.body,
                        template.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a template by name
    pub async fn get_template_by_name(&self, name: &str) -> Result<Option<TemplateRecord>> {
        let name = name.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        "SELECT id, name, description, body, created_at
                         FROM templates WHERE name = ?1",
                        params![name],
                        |row| {
                            Ok(TemplateRecord {
                                id: row.get(0)?,
                                name: row.get(1)?,
                                description: row.get(2)?,
                                body: row.get(3)?,
                                created_at: row.get(4)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    // =========================================================================
    // Payment Transaction Operations
    // =========================================================================

    /// Record a newly initiated charge
    pub async fn insert_transaction(&self, tx: &PaymentTransactionRecord) -> Result<()> {
        let tx = tx.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO payment_transactions (
                        reference, profile_id, amount_pesewas, currency, phone,
                        momo_provider, status, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                    params![
                        tx.reference,
                        tx.profile_id,
                        tx.amount_pesewas,
                        tx.currency,
                        tx.phone,
                        tx.momo_provider,
                        tx.status.to_string(),
                        tx.created_at,
                        tx.updated_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a transaction by gateway reference
    pub async fn get_transaction(
        &self,
        reference: &str,
    ) -> Result<Option<PaymentTransactionRecord>> {
        let reference = reference.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT reference, profile_id, amount_pesewas, currency, phone,
                               momo_provider, status, created_at, updated_at
                        FROM payment_transactions WHERE reference = ?1
                        "#,
                        params![reference],
                        |row| {
                            let status_str: String = row.get(6)?;
                            Ok(PaymentTransactionRecord {
                                reference: row.get(0)?,
                                profile_id: row.get(1)?,
                                amount_pesewas: row.get(2)?,
                                currency: row.get(3)?,
                                phone: row.get(4)?,
                                momo_provider: row.get(5)?,
                                status: PaymentStatus::from_str(&status_str)
                                    .unwrap_or(PaymentStatus::Pending),
                                created_at: row.get(7)?,
                                updated_at: row.get(8)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// Update a transaction's status
    pub async fn update_transaction_status(
        &self,
        reference: &str,
        status: PaymentStatus,
    ) -> Result<()> {
        let reference = reference.to_string();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "UPDATE payment_transactions SET status = ?1, updated_at = ?2
                     WHERE reference = ?3",
                    params![status.to_string(), now_iso(), reference],
                )?;
                Ok(())
            })
            .await
    }
}
