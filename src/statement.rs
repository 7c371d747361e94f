use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Field-level helpers
// ---------------------------------------------------------------------------

/// Accepted date orderings for statement exports. Banks in the original
/// data set use month/day/year; the setting exists for exports that don't.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
}

impl DateOrder {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "mdy" => Some(Self::MonthDayYear),
            "dmy" => Some(Self::DayMonthYear),
            "ymd" => Some(Self::YearMonthDay),
            _ => None,
        }
    }

    fn formats(&self) -> &'static [&'static str] {
        match self {
            Self::MonthDayYear => &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"],
            Self::DayMonthYear => &["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d"],
            Self::YearMonthDay => &["%Y-%m-%d", "%Y/%m/%d"],
        }
    }
}

/// Parse a statement date into ISO form, or None if no accepted format
/// produces a real calendar date.
pub fn parse_date(raw: &str, order: DateOrder) -> Option<String> {
    let raw = raw.trim();
    for fmt in order.formats() {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Parse a currency field: commas, quotes, dollar signs, and parenthesized
/// negatives are accepted. None for anything that isn't a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

/// Trim, collapse internal whitespace, uppercase. All matching downstream
/// (duplicates, category suggestions) keys on this form.
pub fn normalize_description(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    /// One signed column, debits already negative.
    Signed(usize),
    /// Separate debit/credit columns, both recorded as positive magnitudes.
    DebitCredit { debit: usize, credit: usize },
}

#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub date: usize,
    pub description: usize,
    pub amount: AmountColumns,
    pub balance: Option<usize>,
    pub comment: Option<usize>,
}

impl ColumnLayout {
    /// Headerless TD-style export: date, rtn, account number, type,
    /// description, debit, credit, check number, balance.
    pub fn td_bank() -> Self {
        Self {
            date: 0,
            description: 4,
            amount: AmountColumns::DebitCredit { debit: 5, credit: 6 },
            balance: Some(8),
            comment: None,
        }
    }

    /// Recognize a header row by its column names. Returns None if the row
    /// doesn't name at least a date, a description, and an amount column.
    pub fn from_header(record: &csv::StringRecord) -> Option<Self> {
        let mut date = None;
        let mut description = None;
        let mut signed = None;
        let mut debit = None;
        let mut credit = None;
        let mut balance = None;
        let mut comment = None;

        for (i, field) in record.iter().enumerate() {
            match field.trim().to_lowercase().as_str() {
                "date" | "posting date" | "transaction date" => date = Some(i),
                "description" | "payee" | "memo" => description = Some(i),
                "amount" => signed = Some(i),
                "debit" => debit = Some(i),
                "credit" => credit = Some(i),
                "balance" | "running bal." | "running balance" | "account balance" => {
                    balance = Some(i)
                }
                "comment" | "notes" => comment = Some(i),
                _ => {}
            }
        }

        let amount = match (signed, debit, credit) {
            (_, Some(d), Some(c)) => AmountColumns::DebitCredit { debit: d, credit: c },
            (Some(a), _, _) => AmountColumns::Signed(a),
            _ => return None,
        };
        Some(Self {
            date: date?,
            description: description?,
            amount,
            balance,
            comment,
        })
    }

    fn min_columns(&self) -> usize {
        let mut max = self.date.max(self.description);
        match self.amount {
            AmountColumns::Signed(i) => max = max.max(i),
            AmountColumns::DebitCredit { debit, credit } => max = max.max(debit).max(credit),
        }
        max + 1
    }
}

// ---------------------------------------------------------------------------
// Statement parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StatementRow {
    pub date: String,
    pub description: String,
    pub description_norm: String,
    pub amount: f64,
    pub balance: Option<f64>,
    pub comment: Option<String>,
}

/// One row the parser could not turn into a transaction. `row_index` is the
/// 1-based record position in the file, header included.
#[derive(Debug, Clone)]
pub struct RowReject {
    pub row_index: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct ParseOutcome {
    pub rows: Vec<StatementRow>,
    pub rejected: Vec<RowReject>,
}

/// Parse a delimited statement export. Delimiter (comma or tab) is detected
/// from the first line; a header row, when present, overrides the default
/// TD-style layout. Row-level failures land in `rejected`, never abort.
pub fn parse_statement(text: &str, order: DateOrder) -> ParseOutcome {
    let delimiter = detect_delimiter(text);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut rejected = Vec::new();
    let mut layout: Option<ColumnLayout> = None;

    for (idx, result) in rdr.records().enumerate() {
        let row_index = idx + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                rejected.push(RowReject {
                    row_index,
                    reason: format!("unreadable record: {e}"),
                });
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        if layout.is_none() {
            if let Some(detected) = ColumnLayout::from_header(&record) {
                layout = Some(detected);
                continue;
            }
            layout = Some(ColumnLayout::td_bank());
        }
        let Some(active) = layout.as_ref() else { continue };

        match parse_record(&record, active, order) {
            Ok(row) => rows.push(row),
            Err(reason) => rejected.push(RowReject { row_index, reason }),
        }
    }

    ParseOutcome { rows, rejected }
}

fn detect_delimiter(text: &str) -> u8 {
    match text.lines().find(|l| !l.trim().is_empty()) {
        Some(line) if line.contains('\t') => b'\t',
        _ => b',',
    }
}

fn parse_record(
    record: &csv::StringRecord,
    layout: &ColumnLayout,
    order: DateOrder,
) -> std::result::Result<StatementRow, String> {
    if record.len() < layout.min_columns() {
        return Err(format!(
            "expected at least {} columns, found {}",
            layout.min_columns(),
            record.len()
        ));
    }

    let raw_date = &record[layout.date];
    let date = parse_date(raw_date, order)
        .ok_or_else(|| format!("unparseable date '{}'", raw_date.trim()))?;

    let description = record[layout.description].trim().to_string();
    if description.is_empty() {
        return Err("empty description".to_string());
    }
    let description_norm = normalize_description(&description);

    let amount = match layout.amount {
        AmountColumns::Signed(i) => parse_amount(&record[i])
            .ok_or_else(|| format!("unparseable amount '{}'", record[i].trim()))?,
        AmountColumns::DebitCredit { debit, credit } => {
            let debit_raw = record[debit].trim();
            let credit_raw = record[credit].trim();
            if debit_raw.is_empty() && credit_raw.is_empty() {
                return Err("missing amount: debit and credit both empty".to_string());
            }
            let debit_amt = if debit_raw.is_empty() {
                0.0
            } else {
                parse_amount(debit_raw)
                    .ok_or_else(|| format!("unparseable debit '{debit_raw}'"))?
            };
            let credit_amt = if credit_raw.is_empty() {
                0.0
            } else {
                parse_amount(credit_raw)
                    .ok_or_else(|| format!("unparseable credit '{credit_raw}'"))?
            };
            credit_amt.abs() - debit_amt.abs()
        }
    };

    let balance = layout
        .balance
        .and_then(|i| record.get(i))
        .and_then(parse_amount);
    let comment = layout
        .comment
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok(StatementRow {
        date,
        description,
        description_norm,
        amount,
        balance,
        comment,
    })
}
