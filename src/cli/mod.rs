pub mod allocate;
pub mod goals;
pub mod import;
pub mod init;
pub mod promote;
pub mod purge;
pub mod reconcile;
pub mod status;
pub mod suggest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::settings;

/// Open the working database: an explicit --db path wins, otherwise the
/// configured data directory. Schema creation is idempotent.
pub(crate) fn open_db(db: Option<&str>) -> Result<Connection> {
    let path = match db {
        Some(p) => PathBuf::from(p),
        None => settings::db_path(),
    };
    let conn = db::get_connection(&path)?;
    db::init_db(&conn)?;
    Ok(conn)
}

#[derive(Parser)]
#[command(name = "tally", about = "Bank statement import, reconciliation, and savings allocation.")]
pub struct Cli {
    /// Path to the database file (default: from settings)
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize the database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a delimited bank statement export.
    Import {
        /// Path to the CSV/TSV file to import
        file: String,
    },
    /// Suggest a category for a transaction description.
    Suggest {
        /// Transaction description to look up
        description: String,
    },
    /// Promote an imported transaction into a budget record.
    Promote {
        /// Transaction ID (shown in `tally reconcile status`)
        id: i64,
        /// Record as income instead of an expense
        #[arg(long)]
        income: bool,
        /// Expense category (required unless --income)
        #[arg(long)]
        category: Option<String>,
        /// Expense subcategory (required unless --income)
        #[arg(long)]
        subcategory: Option<String>,
    },
    /// Manage reconciliation state.
    Reconcile {
        #[command(subcommand)]
        command: ReconcileCommands,
    },
    /// Attach a comment to an imported transaction.
    Comment {
        /// Transaction ID
        id: i64,
        /// Comment text
        text: String,
    },
    /// Manage savings goals.
    Goals {
        #[command(subcommand)]
        command: GoalsCommands,
    },
    /// Distribute a month's leftover across savings goals.
    Allocate {
        /// Month to allocate for: YYYY-MM
        #[arg(long)]
        month: String,
        /// Override the computed leftover (income - expenses)
        #[arg(long)]
        leftover: Option<f64>,
        /// Persist the plan instead of previewing it
        #[arg(long)]
        commit: bool,
    },
    /// Delete all imported bank transactions.
    Purge {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Show database location and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum ReconcileCommands {
    /// Mark a linked transaction reconciled (or not, with --off).
    Set {
        /// Transaction ID
        id: i64,
        /// Clear the reconciled flag instead of setting it
        #[arg(long)]
        off: bool,
    },
    /// Reconciliation summary, optionally for one month.
    Status {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// Link a transaction to an existing budget record.
    Link {
        /// Transaction ID
        id: i64,
        /// Expense record ID to link to
        #[arg(long)]
        expense: Option<i64>,
        /// Income record ID to link to
        #[arg(long)]
        income: Option<i64>,
    },
    /// Remove a transaction's budget link.
    Unlink {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum GoalsCommands {
    /// Add a savings goal.
    Add {
        /// Goal name, e.g. 'Emergency fund'
        name: String,
        /// Target amount
        #[arg(long)]
        target: f64,
        /// Priority (lower numbers are funded first)
        #[arg(long, default_value = "1")]
        priority: i64,
        /// Target date: YYYY-MM-DD
        #[arg(long = "target-date")]
        target_date: Option<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List savings goals.
    List {
        /// Include completed and retired goals
        #[arg(long)]
        all: bool,
    },
    /// Mark a goal completed.
    Complete {
        /// Goal ID
        id: i64,
    },
    /// Retire a goal without completing it.
    Retire {
        /// Goal ID
        id: i64,
    },
}
