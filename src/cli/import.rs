use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::Table;

use crate::cli::open_db;
use crate::importer::import_statement;
use crate::settings::load_settings;

pub fn run(file: &str, db: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let mut conn = open_db(db)?;

    let report = import_statement(&mut conn, Path::new(file), &settings)
        .with_context(|| format!("importing {file}"))?;

    if report.duplicate_file {
        println!("This file has already been imported (identical checksum).");
        return Ok(());
    }

    println!(
        "{} parsed, {} imported, {} skipped as duplicates, {} malformed",
        report.parsed,
        report.imported.to_string().green(),
        report.duplicates,
        report.malformed.len(),
    );

    if !report.malformed.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Row", "Reason"]);
        for reject in &report.malformed {
            table.add_row(vec![reject.row_index.to_string(), reject.reason.clone()]);
        }
        println!("{}", "Rejected rows".yellow());
        println!("{table}");
    }
    Ok(())
}
