use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::dedup::DuplicateDetector;
use crate::error::Result;
use crate::settings::Settings;
use crate::statement::{self, RowReject};

#[derive(Debug)]
pub struct ImportReport {
    pub parsed: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub malformed: Vec<RowReject>,
    /// The exact file bytes were imported before; nothing was touched.
    pub duplicate_file: bool,
}

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Import one statement file: parse, drop duplicates, persist the survivors.
/// Surviving rows and the audit record commit together; any storage failure
/// rolls the whole import back. Row-level problems are data in the report,
/// not errors.
pub fn import_statement(
    conn: &mut Connection,
    file_path: &Path,
    settings: &Settings,
) -> Result<ImportReport> {
    let data = std::fs::read(file_path)?;
    let checksum = compute_checksum(&data);

    let already: bool = {
        let mut stmt = conn.prepare("SELECT 1 FROM statement_imports WHERE checksum = ?1")?;
        stmt.exists([&checksum])?
    };
    if already {
        return Ok(ImportReport {
            parsed: 0,
            imported: 0,
            duplicates: 0,
            malformed: Vec::new(),
            duplicate_file: true,
        });
    }

    let text = String::from_utf8_lossy(&data);
    let outcome = statement::parse_statement(&text, settings.date_order());
    let source_file = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("statement")
        .to_string();

    let tx = conn.transaction()?;
    let mut imported = 0usize;
    let mut duplicates = 0usize;
    {
        let mut detector = DuplicateDetector::new(&tx, settings.duplicate_similarity);
        for row in &outcome.rows {
            if detector.is_duplicate(row)? {
                duplicates += 1;
                continue;
            }
            tx.execute(
                "INSERT INTO bank_transactions \
                 (date, description, description_norm, amount, balance, source_file, comment) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    row.date,
                    row.description,
                    row.description_norm,
                    row.amount,
                    row.balance,
                    source_file,
                    row.comment,
                ],
            )?;
            imported += 1;
        }
    }
    tx.execute(
        "INSERT INTO statement_imports (filename, checksum, parsed, imported, duplicates, malformed) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            source_file,
            checksum,
            outcome.rows.len() as i64,
            imported as i64,
            duplicates as i64,
            outcome.rejected.len() as i64,
        ],
    )?;
    tx.commit()?;

    Ok(ImportReport {
        parsed: outcome.rows.len(),
        imported,
        duplicates,
        malformed: outcome.rejected,
        duplicate_file: false,
    })
}
