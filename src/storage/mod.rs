/*!
 * Storage module for persistent local data.
 *
 * This module provides SQLite-based persistence for:
 * - Teacher profiles and their wallet accounts
 * - Generated lesson notes (with content hashes for deduplication)
 * - Note templates
 * - Mobile-money payment transactions
 */

// Allow dead code - storage types are for library consumers
#![allow(dead_code)]

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
