use anyhow::Result;

use crate::cli::open_db;
use crate::fmt::money;
use crate::settings::load_settings;

pub fn run(db: Option<&str>) -> Result<()> {
    let settings = load_settings();
    println!("Data dir:   {}", settings.data_dir);

    let conn = open_db(db)?;

    let transactions: i64 =
        conn.query_row("SELECT count(*) FROM bank_transactions", [], |r| r.get(0))?;
    let reconciled: i64 = conn.query_row(
        "SELECT count(*) FROM bank_transactions WHERE reconciled = 1",
        [],
        |r| r.get(0),
    )?;
    let mappings: i64 =
        conn.query_row("SELECT count(*) FROM category_mappings", [], |r| r.get(0))?;
    let active_goals: i64 = conn.query_row(
        "SELECT count(*) FROM savings_goals WHERE status = 'active'",
        [],
        |r| r.get(0),
    )?;
    let allocated: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM allocations",
        [],
        |r| r.get(0),
    )?;

    println!();
    println!("Transactions:      {transactions}");
    println!("Reconciled:        {reconciled}");
    println!("Learned mappings:  {mappings}");
    println!("Active goals:      {active_goals}");
    println!("Total allocated:   {}", money(allocated));
    Ok(())
}
