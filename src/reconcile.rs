use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, TallyError};
use crate::models::{BankTransaction, BudgetKind};
use crate::suggest::{MappingStore, SqliteMappingStore};

/// Where a bank transaction sits in its lifecycle. Reconciliation requires a
/// budget link first; Unlinked → Reconciled is not a legal jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    Unlinked,
    Linked,
    Reconciled,
}

impl std::fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unlinked => "unlinked",
            Self::Linked => "linked",
            Self::Reconciled => "reconciled",
        };
        write!(f, "{name}")
    }
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<BankTransaction> {
    conn.query_row(
        "SELECT id, date, description, description_norm, amount, balance, source_file, \
                comment, reconciled, budget_kind, budget_id \
         FROM bank_transactions WHERE id = ?1",
        [id],
        |row| BankTransaction::from_row(row),
    )
    .optional()?
    .ok_or(TallyError::UnknownTransaction(id))
}

pub fn state_of(txn: &BankTransaction) -> ReconcileState {
    match (txn.budget_id, txn.reconciled) {
        (None, _) => ReconcileState::Unlinked,
        (Some(_), false) => ReconcileState::Linked,
        (Some(_), true) => ReconcileState::Reconciled,
    }
}

/// Toggle the reconciled flag. One UPDATE, immediately visible to summaries.
/// Fails on an unlinked transaction and leaves it untouched.
pub fn set_reconciled(conn: &Connection, id: i64, on: bool) -> Result<ReconcileState> {
    let changed = conn.execute(
        "UPDATE bank_transactions SET reconciled = ?1 WHERE id = ?2 AND budget_id IS NOT NULL",
        rusqlite::params![on as i64, id],
    )?;
    if changed == 0 {
        // Either no such transaction or it has no budget link yet.
        let txn = get_transaction(conn, id)?;
        return Err(TallyError::InvalidStateTransition(format!(
            "transaction {id} is {} and cannot be marked reconciled",
            state_of(&txn)
        )));
    }
    Ok(if on {
        ReconcileState::Reconciled
    } else {
        ReconcileState::Linked
    })
}

pub fn set_comment(conn: &Connection, id: i64, comment: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE bank_transactions SET comment = ?1 WHERE id = ?2",
        rusqlite::params![comment, id],
    )?;
    if changed == 0 {
        return Err(TallyError::UnknownTransaction(id));
    }
    Ok(())
}

/// Associate a bank transaction with an existing budget record. Both sides of
/// the link are 1:1; taken slots are rejected.
pub fn link(conn: &Connection, id: i64, kind: BudgetKind, budget_id: i64) -> Result<()> {
    let txn = get_transaction(conn, id)?;
    if txn.budget_id.is_some() {
        return Err(TallyError::AlreadyLinked(format!(
            "transaction {id} already has a budget link"
        )));
    }

    let table = match kind {
        BudgetKind::Expense => "expenses",
        BudgetKind::Income => "income",
    };
    let exists: Option<i64> = conn
        .query_row(&format!("SELECT id FROM {table} WHERE id = ?1"), [budget_id], |r| r.get(0))
        .optional()?;
    if exists.is_none() {
        return Err(TallyError::Other(format!(
            "no {} record with id {budget_id}",
            kind.key()
        )));
    }

    let taken: Option<i64> = conn
        .query_row(
            "SELECT id FROM bank_transactions WHERE budget_kind = ?1 AND budget_id = ?2",
            rusqlite::params![kind.key(), budget_id],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(other) = taken {
        return Err(TallyError::AlreadyLinked(format!(
            "{} record {budget_id} is already linked to transaction {other}",
            kind.key()
        )));
    }

    conn.execute(
        "UPDATE bank_transactions SET budget_kind = ?1, budget_id = ?2 WHERE id = ?3",
        rusqlite::params![kind.key(), budget_id, id],
    )?;
    Ok(())
}

/// Remove the budget link, returning the transaction to Unlinked. The budget
/// record itself is left alone.
pub fn unlink(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE bank_transactions SET budget_kind = NULL, budget_id = NULL, reconciled = 0 \
         WHERE id = ?1",
        [id],
    )?;
    if changed == 0 {
        return Err(TallyError::UnknownTransaction(id));
    }
    Ok(())
}

/// Create an expense from a bank transaction, link the two, and teach the
/// suggestion dictionary the confirmed category. All inside one transaction.
pub fn promote_to_expense(
    conn: &mut Connection,
    id: i64,
    category: &str,
    subcategory: &str,
) -> Result<i64> {
    let tx = conn.transaction()?;
    let txn = get_transaction(&tx, id)?;
    if txn.budget_id.is_some() {
        return Err(TallyError::AlreadyLinked(format!(
            "transaction {id} already has a budget link"
        )));
    }

    tx.execute(
        "INSERT INTO expenses (amount, date, category, subcategory, description) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![txn.amount.abs(), txn.date, category, subcategory, txn.description],
    )?;
    let expense_id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE bank_transactions SET budget_kind = 'expense', budget_id = ?1 WHERE id = ?2",
        rusqlite::params![expense_id, id],
    )?;
    SqliteMappingStore::new(&tx).upsert(&txn.description_norm, category, subcategory)?;
    tx.commit()?;
    Ok(expense_id)
}

/// Create an income record from a bank transaction and link the two.
pub fn promote_to_income(conn: &mut Connection, id: i64) -> Result<i64> {
    let tx = conn.transaction()?;
    let txn = get_transaction(&tx, id)?;
    if txn.budget_id.is_some() {
        return Err(TallyError::AlreadyLinked(format!(
            "transaction {id} already has a budget link"
        )));
    }

    tx.execute(
        "INSERT INTO income (amount, date, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![txn.amount.abs(), txn.date, txn.description],
    )?;
    let income_id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE bank_transactions SET budget_kind = 'income', budget_id = ?1 WHERE id = ?2",
        rusqlite::params![income_id, id],
    )?;
    tx.commit()?;
    Ok(income_id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileSummary {
    pub total: i64,
    pub reconciled: i64,
    pub unreconciled: i64,
    pub net_amount: f64,
    pub reconciled_amount: f64,
    pub unreconciled_amount: f64,
}

/// Aggregate reconciliation status, optionally restricted to one YYYY-MM
/// month. Reads the same rows the toggles write, so it is always current.
pub fn summary(conn: &Connection, month: Option<&str>) -> Result<ReconcileSummary> {
    conn.query_row(
        "SELECT count(*), \
                COALESCE(SUM(reconciled), 0), \
                COALESCE(SUM(amount), 0), \
                COALESCE(SUM(CASE WHEN reconciled = 1 THEN amount ELSE 0 END), 0) \
         FROM bank_transactions \
         WHERE ?1 IS NULL OR substr(date, 1, 7) = ?1",
        [month],
        |row| {
            let total: i64 = row.get(0)?;
            let reconciled: i64 = row.get(1)?;
            let net_amount: f64 = row.get(2)?;
            let reconciled_amount: f64 = row.get(3)?;
            Ok(ReconcileSummary {
                total,
                reconciled,
                unreconciled: total - reconciled,
                net_amount,
                reconciled_amount,
                unreconciled_amount: net_amount - reconciled_amount,
            })
        },
    )
    .map_err(Into::into)
}

/// Explicit purge of all imported bank transactions. The only delete path.
pub fn purge(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM bank_transactions", [])?)
}
