use std::collections::HashSet;

use rusqlite::Connection;

use crate::error::Result;
use crate::statement::StatementRow;
use crate::suggest::token_similarity;

/// Decides whether an incoming statement row is a re-export of a transaction
/// we already hold. Checks both the persisted history and the rows accepted
/// earlier in the same batch, so one import pass cannot insert its own
/// duplicates.
///
/// A row is a duplicate when `(date, amount, description_norm)` match an
/// existing transaction exactly, or when `(date, amount)` match and the
/// descriptions are near-identical (token similarity at or above the
/// configured threshold). Each existing transaction absorbs at most one
/// near-match per batch; a second similar row on the same date/amount is a
/// distinct event and imports normally.
pub struct DuplicateDetector<'c> {
    conn: &'c Connection,
    threshold: f64,
    claimed: HashSet<i64>,
    batch: Vec<BatchEntry>,
}

struct BatchEntry {
    date: String,
    amount: f64,
    description_norm: String,
    claimed: bool,
}

impl<'c> DuplicateDetector<'c> {
    pub fn new(conn: &'c Connection, threshold: f64) -> Self {
        Self {
            conn,
            threshold,
            claimed: HashSet::new(),
            batch: Vec::new(),
        }
    }

    /// Returns true if `row` duplicates a known transaction. A non-duplicate
    /// row is remembered as part of the current batch, so callers should
    /// insert it when this returns false.
    pub fn is_duplicate(&mut self, row: &StatementRow) -> Result<bool> {
        if self.matches_batch(row) {
            return Ok(true);
        }
        if self.matches_history(row)? {
            return Ok(true);
        }
        self.batch.push(BatchEntry {
            date: row.date.clone(),
            amount: row.amount,
            description_norm: row.description_norm.clone(),
            claimed: false,
        });
        Ok(false)
    }

    fn matches_batch(&mut self, row: &StatementRow) -> bool {
        // Exact repeats within the file are always duplicates.
        if self.batch.iter().any(|e| {
            e.date == row.date
                && e.amount == row.amount
                && e.description_norm == row.description_norm
        }) {
            return true;
        }
        for entry in self.batch.iter_mut() {
            if entry.claimed || entry.date != row.date || entry.amount != row.amount {
                continue;
            }
            if token_similarity(&entry.description_norm, &row.description_norm) >= self.threshold {
                entry.claimed = true;
                return true;
            }
        }
        false
    }

    fn matches_history(&mut self, row: &StatementRow) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, description_norm FROM bank_transactions WHERE date = ?1 AND amount = ?2",
        )?;
        let existing: Vec<(i64, String)> = stmt
            .query_map(rusqlite::params![row.date, row.amount], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (_, desc) in &existing {
            if *desc == row.description_norm {
                return Ok(true);
            }
        }
        for (id, desc) in &existing {
            if self.claimed.contains(id) {
                continue;
            }
            if token_similarity(desc, &row.description_norm) >= self.threshold {
                self.claimed.insert(*id);
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::statement::normalize_description;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn insert_txn(conn: &Connection, date: &str, desc: &str, amount: f64) {
        conn.execute(
            "INSERT INTO bank_transactions (date, description, description_norm, amount, source_file) \
             VALUES (?1, ?2, ?3, ?4, 'history.csv')",
            rusqlite::params![date, desc, normalize_description(desc), amount],
        )
        .unwrap();
    }

    fn row(date: &str, desc: &str, amount: f64) -> StatementRow {
        StatementRow {
            date: date.to_string(),
            description: desc.to_string(),
            description_norm: normalize_description(desc),
            amount,
            balance: None,
            comment: None,
        }
    }

    #[test]
    fn test_exact_history_match_is_duplicate() {
        let (_dir, conn) = test_db();
        insert_txn(&conn, "2025-01-15", "GROCERY MART", -45.10);
        let mut det = DuplicateDetector::new(&conn, 0.9);
        assert!(det.is_duplicate(&row("2025-01-15", "grocery  mart", -45.10)).unwrap());
    }

    #[test]
    fn test_different_amount_is_not_duplicate() {
        let (_dir, conn) = test_db();
        insert_txn(&conn, "2025-01-15", "GROCERY MART", -45.10);
        let mut det = DuplicateDetector::new(&conn, 0.9);
        assert!(!det.is_duplicate(&row("2025-01-15", "GROCERY MART", -45.11)).unwrap());
        assert!(!det.is_duplicate(&row("2025-01-16", "GROCERY MART", -45.10)).unwrap());
    }

    #[test]
    fn test_fuzzy_history_match_is_duplicate() {
        let (_dir, conn) = test_db();
        insert_txn(&conn, "2025-01-15", "STARBUCKS #4521 SEATTLE", -4.50);
        let mut det = DuplicateDetector::new(&conn, 0.9);
        // Re-export dropped the store number.
        assert!(det.is_duplicate(&row("2025-01-15", "STARBUCKS #9999 SEATTLE", -4.50)).unwrap());
    }

    #[test]
    fn test_dissimilar_description_is_not_duplicate() {
        let (_dir, conn) = test_db();
        insert_txn(&conn, "2025-01-15", "STARBUCKS #4521", -4.50);
        let mut det = DuplicateDetector::new(&conn, 0.9);
        assert!(!det.is_duplicate(&row("2025-01-15", "BAGEL HOUSE", -4.50)).unwrap());
    }

    #[test]
    fn test_existing_txn_absorbs_one_near_match() {
        let (_dir, conn) = test_db();
        insert_txn(&conn, "2025-01-15", "COFFEE SHOP #1", -4.50);
        let mut det = DuplicateDetector::new(&conn, 0.9);
        assert!(det.is_duplicate(&row("2025-01-15", "COFFEE SHOP #2", -4.50)).unwrap());
        // History row already claimed; this is a second real purchase.
        assert!(!det.is_duplicate(&row("2025-01-15", "COFFEE SHOP #3", -4.50)).unwrap());
    }

    #[test]
    fn test_duplicate_within_batch() {
        let (_dir, conn) = test_db();
        let mut det = DuplicateDetector::new(&conn, 0.9);
        assert!(!det.is_duplicate(&row("2025-01-15", "GROCERY MART", -45.10)).unwrap());
        assert!(det.is_duplicate(&row("2025-01-15", "GROCERY MART", -45.10)).unwrap());
        assert!(det.is_duplicate(&row("2025-01-15", "GROCERY MART #812", -45.10)).unwrap());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let (_dir, conn) = test_db();
        insert_txn(&conn, "2025-01-15", "GROCERY MART", -45.10);
        for _ in 0..2 {
            let mut det = DuplicateDetector::new(&conn, 0.9);
            assert!(det.is_duplicate(&row("2025-01-15", "GROCERY MART", -45.10)).unwrap());
            assert!(!det.is_duplicate(&row("2025-01-15", "HARDWARE STORE", -45.10)).unwrap());
        }
    }
}
