use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::infra::sqlite::schema::open_connection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub data: String,
    pub updated_at: String,
}

pub fn load_blob(db_path: &Path, key: &str) -> Result<Option<StoredBlob>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT data, updated_at FROM app_data WHERE key = ?1",
        [key],
        |row| {
            Ok(StoredBlob {
                data: row.get(0)?,
                updated_at: row.get(1)?,
            })
        },
    )
    .optional()
    .with_context(|| format!("failed to load data for key: {key}"))
}

/// Whole-value replace in one transaction; the old value survives a failed write.
pub fn upsert_blob(db_path: &Path, key: &str, data: &str, updated_at: &str) -> Result<()> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start data write transaction")?;
    tx.execute(
        "INSERT INTO app_data(key, data, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        params![key, data, updated_at],
    )
    .with_context(|| format!("failed to upsert data for key: {key}"))?;
    tx.commit().context("failed to commit data write")?;
    Ok(())
}
