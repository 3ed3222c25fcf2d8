//! Repository for the `history_entries` table.

use chrono::Utc;
use lus_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::history::{CreateHistoryEntry, HistoryEntry};

const COLUMNS: &str =
    "id, patient_id, sequence_id, previous_label, updated_label, annotator, timestamp";

/// Provides create/list/delete for correction history.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Insert a new entry stamped with the current UTC time.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateHistoryEntry,
    ) -> Result<HistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO history_entries
                (patient_id, sequence_id, previous_label, updated_label, annotator, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(&input.patient_id)
            .bind(&input.sequence_id)
            .bind(input.previous_label.as_str())
            .bind(input.updated_label.as_str())
            .bind(&input.annotator)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<HistoryEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM history_entries WHERE id = ?1");
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List entries newest first, optionally restricted to one annotator.
    pub async fn list(
        pool: &SqlitePool,
        annotator: Option<&str>,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        match annotator {
            Some(annotator) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM history_entries
                     WHERE annotator = ?1
                     ORDER BY id DESC"
                );
                sqlx::query_as::<_, HistoryEntry>(&query)
                    .bind(annotator)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM history_entries ORDER BY id DESC");
                sqlx::query_as::<_, HistoryEntry>(&query).fetch_all(pool).await
            }
        }
    }

    /// Delete an entry. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM history_entries WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() > 0 {
            tracing::debug!(id, "History entry deleted");
        }
        Ok(result.rows_affected() > 0)
    }
}
