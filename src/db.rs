use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS bank_transactions (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    description_norm TEXT NOT NULL,
    amount REAL NOT NULL,
    balance REAL,
    source_file TEXT NOT NULL,
    comment TEXT,
    reconciled INTEGER DEFAULT 0,
    budget_kind TEXT,
    budget_id INTEGER,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_bank_transactions_date_amount
    ON bank_transactions(date, amount);

CREATE UNIQUE INDEX IF NOT EXISTS idx_bank_transactions_budget_link
    ON bank_transactions(budget_kind, budget_id) WHERE budget_id IS NOT NULL;

CREATE TABLE IF NOT EXISTS category_mappings (
    id INTEGER PRIMARY KEY,
    pattern_key TEXT NOT NULL,
    category TEXT NOT NULL,
    subcategory TEXT NOT NULL,
    usage_count INTEGER DEFAULT 1,
    last_used_at TEXT DEFAULT (datetime('now')),
    UNIQUE(pattern_key, category, subcategory)
);

CREATE TABLE IF NOT EXISTS income (
    id INTEGER PRIMARY KEY,
    amount REAL NOT NULL,
    date TEXT NOT NULL,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY,
    amount REAL NOT NULL,
    date TEXT NOT NULL,
    category TEXT NOT NULL,
    subcategory TEXT NOT NULL,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS savings_goals (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    target_amount REAL NOT NULL,
    current_amount REAL DEFAULT 0,
    priority INTEGER DEFAULT 1,
    status TEXT DEFAULT 'active',
    target_date TEXT,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    retired_at TEXT
);

CREATE TABLE IF NOT EXISTS allocations (
    id INTEGER PRIMARY KEY,
    goal_id INTEGER NOT NULL,
    month TEXT NOT NULL,
    amount REAL NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (goal_id) REFERENCES savings_goals(id)
);

CREATE TABLE IF NOT EXISTS statement_imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    checksum TEXT NOT NULL,
    parsed INTEGER NOT NULL,
    imported INTEGER NOT NULL,
    duplicates INTEGER NOT NULL,
    malformed INTEGER NOT NULL,
    imported_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
