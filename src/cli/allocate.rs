use anyhow::{bail, Result};
use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::Table;

use crate::allocator::{self, load_goals};
use crate::cli::open_db;
use crate::fmt::money;

pub fn run(month: &str, leftover: Option<f64>, commit: bool, db: Option<&str>) -> Result<()> {
    if NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_err() {
        bail!("invalid month '{month}', expected YYYY-MM");
    }
    let mut conn = open_db(db)?;

    let leftover = match leftover {
        Some(value) => value,
        None => {
            let (income, expenses, leftover) = allocator::monthly_leftover(&conn, month)?;
            println!(
                "{month}: income {} - expenses {} = leftover {}",
                money(income),
                money(expenses),
                money(leftover)
            );
            leftover
        }
    };

    let goals = load_goals(&conn, false)?;
    let plan = allocator::plan(leftover, &goals);

    if plan.is_empty() {
        println!("Nothing to allocate.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Goal", "Allocation"]);
    for alloc in &plan {
        table.add_row(vec![alloc.goal_name.clone(), money(alloc.amount)]);
    }
    let total: f64 = plan.iter().map(|a| a.amount).sum();
    println!("{table}");
    println!("Total: {}", money(total));

    if commit {
        allocator::commit(&mut conn, month, &plan)?;
        println!("{}", "Allocations committed.".green());
    } else {
        println!("Preview only. Re-run with --commit to persist.");
    }
    Ok(())
}
