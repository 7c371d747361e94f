use rusqlite::Row;

/// An imported bank statement line. `description_norm` is the matching key
/// (trimmed, whitespace-collapsed, uppercased); `description` keeps the
/// original text for display.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct BankTransaction {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub description_norm: String,
    pub amount: f64,
    pub balance: Option<f64>,
    pub source_file: String,
    pub comment: Option<String>,
    pub reconciled: bool,
    pub budget_kind: Option<BudgetKind>,
    pub budget_id: Option<i64>,
}

impl BankTransaction {
    /// Column order must match `SELECT id, date, description, description_norm,
    /// amount, balance, source_file, comment, reconciled, budget_kind, budget_id`.
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let kind: Option<String> = row.get(9)?;
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            description: row.get(2)?,
            description_norm: row.get(3)?,
            amount: row.get(4)?,
            balance: row.get(5)?,
            source_file: row.get(6)?,
            comment: row.get(7)?,
            reconciled: row.get::<_, i64>(8)? != 0,
            budget_kind: kind.as_deref().and_then(BudgetKind::from_key),
            budget_id: row.get(10)?,
        })
    }
}

/// Which budget table a bank transaction is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    Expense,
    Income,
}

impl BudgetKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            _ => None,
        }
    }
}

/// A learned association between a normalized description and a category.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct CategoryMapping {
    pub id: i64,
    pub pattern_key: String,
    pub category: String,
    pub subcategory: String,
    pub usage_count: i64,
    pub last_used_at: String,
}

impl CategoryMapping {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            pattern_key: row.get(1)?,
            category: row.get(2)?,
            subcategory: row.get(3)?,
            usage_count: row.get(4)?,
            last_used_at: row.get(5)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Active,
    Completed,
    Retired,
}

impl GoalStatus {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Retired => "retired",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "retired" => Some(Self::Retired),
            _ => None,
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SavingsGoal {
    pub id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub priority: i64,
    pub status: GoalStatus,
    pub target_date: Option<String>,
    pub notes: Option<String>,
}

impl SavingsGoal {
    /// Column order must match `SELECT id, name, target_amount, current_amount,
    /// priority, status, target_date, notes`.
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: String = row.get(5)?;
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            target_amount: row.get(2)?,
            current_amount: row.get(3)?,
            priority: row.get(4)?,
            status: GoalStatus::from_key(&status).unwrap_or(GoalStatus::Retired),
            target_date: row.get(6)?,
            notes: row.get(7)?,
        })
    }

    pub fn room(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct AllocationRecord {
    pub id: i64,
    pub goal_id: i64,
    pub month: String,
    pub amount: f64,
    pub created_at: String,
}
