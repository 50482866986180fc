//! Conversion ledger: durable per-document status in SQLite.
//!
//! One row per document. Writes go through the database's native atomic
//! upsert so concurrent batch runs cannot interleave a read-modify-write.
//! A document with no row reads as [`DocumentStatus::NotConverted`] — absence
//! and "never converted" are the same thing.

use chrono::Utc;
use rusqlite::Connection;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Conversion state of one document's image set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    /// No convertible images in the document.
    NoImages,
    /// Images present, none converted.
    NotConverted,
    /// Some but not all images converted.
    PartiallyConverted,
    /// Every image converted.
    Converted,
}

impl DocumentStatus {
    fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::NoImages => "no_images",
            DocumentStatus::NotConverted => "not_converted",
            DocumentStatus::PartiallyConverted => "partially_converted",
            DocumentStatus::Converted => "converted",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "no_images" => DocumentStatus::NoImages,
            "partially_converted" => DocumentStatus::PartiallyConverted,
            "converted" => DocumentStatus::Converted,
            _ => DocumentStatus::NotConverted,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status from conversion counts. Pure; the sole place the
/// counts→status rule lives.
pub fn status_for_counts(converted: usize, total: usize) -> DocumentStatus {
    if total == 0 {
        DocumentStatus::NoImages
    } else if converted == 0 {
        DocumentStatus::NotConverted
    } else if converted < total {
        DocumentStatus::PartiallyConverted
    } else {
        DocumentStatus::Converted
    }
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub document_id: i64,
    pub status: DocumentStatus,
    /// RFC 3339, UTC. Set on every upsert.
    pub last_converted: Option<String>,
}

/// Per-status row counts for the status dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub no_images: usize,
    pub not_converted: usize,
    pub partially_converted: usize,
    pub converted: usize,
}

impl LedgerStats {
    pub fn total(&self) -> usize {
        self.no_images + self.not_converted + self.partially_converted + self.converted
    }
}

/// Handle on the ledger database.
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Open (creating if needed) the ledger at `path`.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        Self::init(Connection::open(path)?)
    }

    /// In-memory ledger, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversion_status (
                document_id INTEGER PRIMARY KEY,
                status TEXT NOT NULL,
                last_converted TEXT
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Record a document's status, stamping `last_converted` with now.
    /// Insert-or-update in one statement.
    pub fn upsert_status(
        &self,
        document_id: i64,
        status: DocumentStatus,
    ) -> Result<(), LedgerError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO conversion_status (document_id, status, last_converted)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(document_id) DO UPDATE SET
                status = excluded.status,
                last_converted = excluded.last_converted",
            rusqlite::params![document_id, status.as_str(), now],
        )?;
        Ok(())
    }

    /// A document's recorded status; `NotConverted` when never recorded.
    pub fn get_status(&self, document_id: i64) -> Result<DocumentStatus, LedgerError> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM conversion_status WHERE document_id = ?1",
                [document_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(status
            .map(|s| DocumentStatus::from_str(&s))
            .unwrap_or(DocumentStatus::NotConverted))
    }

    /// All rows, ordered by document id.
    pub fn all_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT document_id, status, last_converted
             FROM conversion_status ORDER BY document_id",
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(1)?;
            Ok(LedgerEntry {
                document_id: row.get(0)?,
                status: DocumentStatus::from_str(&status),
                last_converted: row.get(2)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Per-status counts across the whole ledger.
    pub fn stats(&self) -> Result<LedgerStats, LedgerError> {
        let mut stats = LedgerStats::default();
        for entry in self.all_entries()? {
            match entry.status {
                DocumentStatus::NoImages => stats.no_images += 1,
                DocumentStatus::NotConverted => stats.not_converted += 1,
                DocumentStatus::PartiallyConverted => stats.partially_converted += 1,
                DocumentStatus::Converted => stats.converted += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_for_counts_covers_all_cases() {
        assert_eq!(status_for_counts(0, 0), DocumentStatus::NoImages);
        assert_eq!(status_for_counts(0, 3), DocumentStatus::NotConverted);
        assert_eq!(status_for_counts(1, 3), DocumentStatus::PartiallyConverted);
        assert_eq!(status_for_counts(2, 3), DocumentStatus::PartiallyConverted);
        assert_eq!(status_for_counts(3, 3), DocumentStatus::Converted);
    }

    #[test]
    fn missing_document_reads_as_not_converted() {
        let ledger = Ledger::open_in_memory().unwrap();
        assert_eq!(ledger.get_status(42).unwrap(), DocumentStatus::NotConverted);
    }

    #[test]
    fn upsert_inserts_then_updates() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.upsert_status(1, DocumentStatus::PartiallyConverted).unwrap();
        assert_eq!(
            ledger.get_status(1).unwrap(),
            DocumentStatus::PartiallyConverted
        );

        ledger.upsert_status(1, DocumentStatus::Converted).unwrap();
        assert_eq!(ledger.get_status(1).unwrap(), DocumentStatus::Converted);

        let entries = ledger.all_entries().unwrap();
        assert_eq!(entries.len(), 1, "upsert must not create a second row");
    }

    #[test]
    fn upsert_stamps_last_converted() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.upsert_status(7, DocumentStatus::Converted).unwrap();
        let entry = &ledger.all_entries().unwrap()[0];
        let stamp = entry.last_converted.as_deref().unwrap();
        assert!(
            chrono::DateTime::parse_from_rfc3339(stamp).is_ok(),
            "timestamp must be RFC 3339: {stamp}"
        );
    }

    #[test]
    fn entries_ordered_by_document_id() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.upsert_status(3, DocumentStatus::Converted).unwrap();
        ledger.upsert_status(1, DocumentStatus::NoImages).unwrap();
        ledger.upsert_status(2, DocumentStatus::NotConverted).unwrap();
        let ids: Vec<i64> = ledger
            .all_entries()
            .unwrap()
            .iter()
            .map(|e| e.document_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn stats_count_per_status() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.upsert_status(1, DocumentStatus::Converted).unwrap();
        ledger.upsert_status(2, DocumentStatus::Converted).unwrap();
        ledger.upsert_status(3, DocumentStatus::PartiallyConverted).unwrap();
        ledger.upsert_status(4, DocumentStatus::NoImages).unwrap();

        let stats = ledger.stats().unwrap();
        assert_eq!(stats.converted, 2);
        assert_eq!(stats.partially_converted, 1);
        assert_eq!(stats.no_images, 1);
        assert_eq!(stats.not_converted, 0);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn status_roundtrips_through_text() {
        for status in [
            DocumentStatus::NoImages,
            DocumentStatus::NotConverted,
            DocumentStatus::PartiallyConverted,
            DocumentStatus::Converted,
        ] {
            assert_eq!(DocumentStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn persists_across_reopens() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db = tmp.path().join("ledger.sqlite");
        {
            let ledger = Ledger::open(&db).unwrap();
            ledger.upsert_status(5, DocumentStatus::Converted).unwrap();
        }
        let ledger = Ledger::open(&db).unwrap();
        assert_eq!(ledger.get_status(5).unwrap(), DocumentStatus::Converted);
    }
}
