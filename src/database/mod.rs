/*!
 * Database module for persistent corpus storage.
 *
 * This module provides a SQLite-backed document store:
 * - Unit texts per language, imported from corpus files
 * - Content hashes so re-imports only touch changed texts
 * - A `UnitStore` implementation the engine can read from directly
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{ImportStats, UnitTextRecord};
pub use repository::SqliteStore;
