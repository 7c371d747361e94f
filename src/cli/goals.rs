use anyhow::Result;
use comfy_table::Table;

use crate::allocator::{add_goal, load_goals, transition_goal};
use crate::cli::open_db;
use crate::fmt::money;
use crate::models::GoalStatus;

pub fn add(
    name: &str,
    target: f64,
    priority: i64,
    target_date: Option<&str>,
    notes: Option<&str>,
    db: Option<&str>,
) -> Result<()> {
    let conn = open_db(db)?;
    let id = add_goal(&conn, name, target, priority, target_date, notes)?;
    println!("Added goal {id}: {name} ({})", money(target));
    Ok(())
}

pub fn list(all: bool, db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let goals = load_goals(&conn, all)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Goal", "Priority", "Saved", "Target", "Room", "Status"]);
    for goal in &goals {
        table.add_row(vec![
            goal.id.to_string(),
            goal.name.clone(),
            goal.priority.to_string(),
            money(goal.current_amount),
            money(goal.target_amount),
            money(goal.room()),
            goal.status.key().to_string(),
        ]);
    }
    println!("Savings goals\n{table}");
    Ok(())
}

pub fn complete(id: i64, db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    transition_goal(&conn, id, GoalStatus::Completed)?;
    println!("Goal {id} marked completed.");
    Ok(())
}

pub fn retire(id: i64, db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    transition_goal(&conn, id, GoalStatus::Retired)?;
    println!("Goal {id} retired.");
    Ok(())
}
