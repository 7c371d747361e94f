use anyhow::{bail, Result};

use crate::cli::open_db;
use crate::reconcile::{promote_to_expense, promote_to_income};

pub fn run(
    id: i64,
    income: bool,
    category: Option<&str>,
    subcategory: Option<&str>,
    db: Option<&str>,
) -> Result<()> {
    let mut conn = open_db(db)?;

    if income {
        let income_id = promote_to_income(&mut conn, id)?;
        println!("Transaction {id} recorded as income {income_id}.");
        return Ok(());
    }

    let (Some(category), Some(subcategory)) = (category, subcategory) else {
        bail!("--category and --subcategory are required unless --income is given");
    };
    let expense_id = promote_to_expense(&mut conn, id, category, subcategory)?;
    println!("Transaction {id} recorded as expense {expense_id} ({category} / {subcategory}).");
    Ok(())
}
