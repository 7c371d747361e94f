use anyhow::{bail, Result};
use comfy_table::Table;

use crate::cli::open_db;
use crate::fmt::money;
use crate::models::BudgetKind;
use crate::reconcile;

pub fn set(id: i64, off: bool, db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let state = reconcile::set_reconciled(&conn, id, !off)?;
    println!("Transaction {id} is now {state}.");
    Ok(())
}

pub fn status(month: Option<&str>, db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let summary = reconcile::summary(&conn, month)?;

    let mut table = Table::new();
    table.set_header(vec!["", "Count", "Amount"]);
    table.add_row(vec![
        "Reconciled".to_string(),
        summary.reconciled.to_string(),
        money(summary.reconciled_amount),
    ]);
    table.add_row(vec![
        "Unreconciled".to_string(),
        summary.unreconciled.to_string(),
        money(summary.unreconciled_amount),
    ]);
    table.add_row(vec![
        "Total".to_string(),
        summary.total.to_string(),
        money(summary.net_amount),
    ]);

    match month {
        Some(m) => println!("Reconciliation for {m}\n{table}"),
        None => println!("Reconciliation\n{table}"),
    }
    Ok(())
}

pub fn link(id: i64, expense: Option<i64>, income: Option<i64>, db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let (kind, budget_id) = match (expense, income) {
        (Some(e), None) => (BudgetKind::Expense, e),
        (None, Some(i)) => (BudgetKind::Income, i),
        _ => bail!("give exactly one of --expense or --income"),
    };
    reconcile::link(&conn, id, kind, budget_id)?;
    println!("Transaction {id} linked to {} {budget_id}.", kind.key());
    Ok(())
}

pub fn unlink(id: i64, db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    reconcile::unlink(&conn, id)?;
    println!("Transaction {id} is now unlinked.");
    Ok(())
}

pub fn comment(id: i64, text: &str, db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    reconcile::set_comment(&conn, id, text)?;
    println!("Comment saved on transaction {id}.");
    Ok(())
}
