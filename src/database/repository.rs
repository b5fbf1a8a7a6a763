/*!
 * SQLite-backed document store.
 *
 * `SqliteStore` persists unit texts imported from corpus files and serves
 * them to the engine through `UnitStore`. Imports run in one transaction
 * and skip texts whose content hash is unchanged.
 */

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use log::{debug, info};
use rusqlite::{OptionalExtension, params};
use sha2::{Digest, Sha256};

use super::connection::DatabaseConnection;
use super::models::{ImportStats, UnitTextRecord};
use crate::corpus::{Unit, UnitKey, UnitStore};
use crate::errors::StoreError;
use crate::language_utils::canonical_code;

/// Document store persisted in SQLite
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// Database connection
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Create a store over an open connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open (or create) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Create a store at the default database location
    pub fn new_default() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_default()?))
    }

    /// Create a store with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Compute SHA256 hash of text
    pub fn hash_text(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Import units, all or nothing.
    ///
    /// Texts already stored with the same hash are left untouched so their
    /// `updated_at` keeps meaning "content last changed".
    pub fn import_units(&self, units: &[Unit]) -> Result<ImportStats> {
        let now = chrono::Utc::now().to_rfc3339();

        let stats = self.db.transaction(|tx| {
            let mut stats = ImportStats::default();
            for unit in units {
                if unit.sequence == 0 {
                    return Err(anyhow::anyhow!(
                        "Unit {}.{} has sequence 0; sequences start at 1",
                        unit.sequence,
                        unit.subsequence
                    ));
                }
                for (language, text) in &unit.texts {
                    let language = language_key(language);
                    let hash = Self::hash_text(text);

                    let existing: Option<String> = tx
                        .query_row(
                            r#"
                            SELECT text_hash FROM unit_texts
                            WHERE collection = ?1 AND sequence = ?2 AND subsequence = ?3 AND language = ?4
                            "#,
                            params![unit.collection, unit.sequence, unit.subsequence, language],
                            |row| row.get(0),
                        )
                        .optional()?;

                    match existing {
                        Some(existing_hash) if existing_hash == hash => {
                            stats.unchanged += 1;
                            continue;
                        }
                        Some(_) => stats.updated += 1,
                        None => stats.inserted += 1,
                    }

                    tx.execute(
                        r#"
                        INSERT INTO unit_texts (
                            collection, sequence, subsequence, language, text, text_hash, updated_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                        ON CONFLICT(collection, sequence, subsequence, language)
                        DO UPDATE SET text = excluded.text,
                                      text_hash = excluded.text_hash,
                                      updated_at = excluded.updated_at
                        "#,
                        params![
                            unit.collection,
                            unit.sequence,
                            unit.subsequence,
                            language,
                            text,
                            hash,
                            now
                        ],
                    )?;
                }
            }
            Ok(stats)
        })?;

        info!("Imported corpus: {}", stats);
        Ok(stats)
    }

    /// Full record of one stored text
    pub fn get_record(&self, key: &UnitKey, language: &str) -> Result<Option<UnitTextRecord>> {
        let language = language_key(language);
        self.db.execute(|conn| {
            let record = conn
                .query_row(
                    r#"
                    SELECT text, text_hash, updated_at FROM unit_texts
                    WHERE collection = ?1 AND sequence = ?2 AND subsequence = ?3 AND language = ?4
                    "#,
                    params![key.collection, key.sequence, key.subsequence, language],
                    |row| {
                        Ok(UnitTextRecord {
                            key: key.clone(),
                            language: language.clone(),
                            text: row.get(0)?,
                            text_hash: row.get(1)?,
                            updated_at: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(record)
        })
    }

    /// Every stored language code, ascending
    pub fn languages(&self) -> Result<Vec<String>> {
        self.db.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT DISTINCT language FROM unit_texts ORDER BY language")?;
            let languages = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(languages)
        })
    }

    /// Every unit with all its texts, ascending by key
    pub fn export_units(&self) -> Result<Vec<Unit>> {
        self.db.execute(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT collection, sequence, subsequence, language, text FROM unit_texts
                ORDER BY collection, sequence, subsequence, language
                "#,
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    UnitKey::in_collection(row.get::<_, String>(0)?, row.get(1)?, row.get(2)?),
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?;

            let mut units: BTreeMap<UnitKey, BTreeMap<String, String>> = BTreeMap::new();
            for row in rows {
                let (key, language, text) = row?;
                units.entry(key).or_default().insert(language, text);
            }

            Ok(units
                .into_iter()
                .map(|(key, texts)| Unit {
                    collection: key.collection,
                    sequence: key.sequence,
                    subsequence: key.subsequence,
                    texts,
                })
                .collect())
        })
    }
}

fn language_key(language: &str) -> String {
    canonical_code(language).unwrap_or_else(|_| language.trim().to_lowercase())
}

fn store_error(error: anyhow::Error) -> StoreError {
    match error.downcast::<rusqlite::Error>() {
        Ok(sqlite) => StoreError::from(sqlite),
        Err(other) => StoreError::Unavailable(format!("{:#}", other)),
    }
}

impl UnitStore for SqliteStore {
    fn unit_text(&self, key: &UnitKey, language: &str) -> Result<Option<String>, StoreError> {
        let language = language_key(language);
        self.db
            .execute(|conn| {
                let text = conn
                    .query_row(
                        r#"
                        SELECT text FROM unit_texts
                        WHERE collection = ?1 AND sequence = ?2 AND subsequence = ?3 AND language = ?4
                        "#,
                        params![key.collection, key.sequence, key.subsequence, language],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(text)
            })
            .map_err(store_error)
    }

    fn unit_keys(&self, language: &str) -> Result<Vec<UnitKey>, StoreError> {
        let language = language_key(language);
        let keys = self.select_keys(
            r#"
            SELECT collection, sequence, subsequence FROM unit_texts
            WHERE language = ?1
            ORDER BY collection, sequence, subsequence
            "#,
            [&language],
        )?;

        debug!("{} units stored in '{}'", keys.len(), language);
        Ok(keys)
    }

    fn all_unit_keys(&self) -> Result<Vec<UnitKey>, StoreError> {
        self.select_keys(
            r#"
            SELECT DISTINCT collection, sequence, subsequence FROM unit_texts
            ORDER BY collection, sequence, subsequence
            "#,
            [],
        )
    }
}

impl SqliteStore {
    /// Run a query returning `(collection, sequence, subsequence)` rows
    fn select_keys<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<UnitKey>, StoreError> {
        self.db
            .execute(|conn| {
                let mut stmt = conn.prepare(sql)?;
                let keys = stmt
                    .query_map(params, |row| {
                        Ok(UnitKey::in_collection(
                            row.get::<_, String>(0)?,
                            row.get(1)?,
                            row.get(2)?,
                        ))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .map_err(store_error)
    }
}
