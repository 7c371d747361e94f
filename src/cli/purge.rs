use anyhow::Result;
use colored::Colorize;

use crate::cli::open_db;
use crate::reconcile::purge;

pub fn run(yes: bool, db: Option<&str>) -> Result<()> {
    if !yes {
        println!(
            "{}",
            "This deletes every imported bank transaction. Re-run with --yes to confirm.".yellow()
        );
        return Ok(());
    }
    let conn = open_db(db)?;
    let removed = purge(&conn)?;
    println!("Removed {removed} transactions.");
    Ok(())
}
