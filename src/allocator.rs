use rusqlite::Connection;

use crate::error::{Result, TallyError};
use crate::models::{GoalStatus, SavingsGoal};

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAllocation {
    pub goal_id: i64,
    pub goal_name: String,
    pub amount: f64,
}

/// Distribute a month's leftover across goals in ascending priority order.
/// Pure: same leftover and goal snapshot always produce the same plan, so the
/// caller can preview before committing. Non-active goals and goals already
/// at target are skipped; nothing is planned past a goal's remaining room.
pub fn plan(leftover: f64, goals: &[SavingsGoal]) -> Vec<PlannedAllocation> {
    if leftover <= 0.0 {
        return Vec::new();
    }

    let mut eligible: Vec<&SavingsGoal> = goals
        .iter()
        .filter(|g| g.status == GoalStatus::Active && g.current_amount < g.target_amount)
        .collect();
    eligible.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));

    let mut remaining = leftover;
    let mut allocations = Vec::new();
    for goal in eligible {
        if remaining <= 0.0 {
            break;
        }
        let take = goal.room().min(remaining);
        if take > 0.0 {
            allocations.push(PlannedAllocation {
                goal_id: goal.id,
                goal_name: goal.name.clone(),
                amount: take,
            });
            remaining -= take;
        }
    }
    allocations
}

/// Persist a previewed plan: one allocation row per goal plus the matching
/// current_amount bump, committed together or not at all.
pub fn commit(conn: &mut Connection, month: &str, allocations: &[PlannedAllocation]) -> Result<()> {
    let tx = conn.transaction()?;
    for alloc in allocations {
        tx.execute(
            "INSERT INTO allocations (goal_id, month, amount) VALUES (?1, ?2, ?3)",
            rusqlite::params![alloc.goal_id, month, alloc.amount],
        )?;
        let changed = tx.execute(
            "UPDATE savings_goals SET current_amount = current_amount + ?1 WHERE id = ?2",
            rusqlite::params![alloc.amount, alloc.goal_id],
        )?;
        if changed == 0 {
            return Err(TallyError::UnknownGoal(alloc.goal_name.clone()));
        }
    }
    tx.commit()?;
    Ok(())
}

/// Income minus expenses for one YYYY-MM month: the pool the allocator
/// distributes. Returns (income, expenses, leftover).
pub fn monthly_leftover(conn: &Connection, month: &str) -> Result<(f64, f64, f64)> {
    let income: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM income WHERE substr(date, 1, 7) = ?1",
        [month],
        |r| r.get(0),
    )?;
    let expenses: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE substr(date, 1, 7) = ?1",
        [month],
        |r| r.get(0),
    )?;
    Ok((income, expenses, income - expenses))
}

pub fn load_goals(conn: &Connection, include_terminal: bool) -> Result<Vec<SavingsGoal>> {
    let sql = if include_terminal {
        "SELECT id, name, target_amount, current_amount, priority, status, target_date, notes \
         FROM savings_goals ORDER BY priority, name"
    } else {
        "SELECT id, name, target_amount, current_amount, priority, status, target_date, notes \
         FROM savings_goals WHERE status = 'active' ORDER BY priority, name"
    };
    let mut stmt = conn.prepare(sql)?;
    let goals = stmt
        .query_map([], |row| SavingsGoal::from_row(row))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(goals)
}

pub fn add_goal(
    conn: &Connection,
    name: &str,
    target_amount: f64,
    priority: i64,
    target_date: Option<&str>,
    notes: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO savings_goals (name, target_amount, priority, target_date, notes) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![name, target_amount, priority, target_date, notes],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Terminal transitions. Only an active goal may be completed or retired;
/// completed and retired are final.
pub fn transition_goal(conn: &Connection, goal_id: i64, to: GoalStatus) -> Result<()> {
    if to == GoalStatus::Active {
        return Err(TallyError::InvalidStateTransition(
            "goals cannot be reactivated".to_string(),
        ));
    }
    let changed = conn.execute(
        "UPDATE savings_goals SET status = ?1, \
                retired_at = CASE WHEN ?1 = 'retired' THEN datetime('now') ELSE retired_at END \
         WHERE id = ?2 AND status = 'active'",
        rusqlite::params![to.key(), goal_id],
    )?;
    if changed == 0 {
        let status: Option<String> = conn
            .query_row("SELECT status FROM savings_goals WHERE id = ?1", [goal_id], |r| r.get(0))
            .map_err(|_| TallyError::UnknownGoal(goal_id.to_string()))?;
        return Err(TallyError::InvalidStateTransition(format!(
            "goal {goal_id} is {} and cannot become {}",
            status.unwrap_or_default(),
            to.key()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn goal(id: i64, name: &str, target: f64, current: f64, priority: i64) -> SavingsGoal {
        SavingsGoal {
            id,
            name: name.to_string(),
            target_amount: target,
            current_amount: current,
            priority,
            status: GoalStatus::Active,
            target_date: None,
            notes: None,
        }
    }

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_plan_fills_by_priority() {
        // A has room 50, B has room 200; 120 to distribute.
        let goals = vec![goal(1, "A", 100.0, 50.0, 1), goal(2, "B", 200.0, 0.0, 2)];
        let plan = plan(120.0, &goals);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].goal_id, 1);
        assert_eq!(plan[0].amount, 50.0);
        assert_eq!(plan[1].goal_id, 2);
        assert_eq!(plan[1].amount, 70.0);
    }

    #[test]
    fn test_plan_stops_when_leftover_exhausted() {
        let goals = vec![
            goal(1, "A", 100.0, 0.0, 1),
            goal(2, "B", 100.0, 0.0, 2),
            goal(3, "C", 100.0, 0.0, 3),
        ];
        let plan = plan(150.0, &goals);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].amount, 100.0);
        assert_eq!(plan[1].amount, 50.0);
    }

    #[test]
    fn test_plan_zero_or_negative_leftover() {
        let goals = vec![goal(1, "A", 100.0, 0.0, 1)];
        assert!(plan(0.0, &goals).is_empty());
        assert!(plan(-250.0, &goals).is_empty());
    }

    #[test]
    fn test_plan_skips_non_active_goals() {
        let mut retired = goal(1, "A", 100.0, 0.0, 1);
        retired.status = GoalStatus::Retired;
        let mut completed = goal(2, "B", 100.0, 0.0, 2);
        completed.status = GoalStatus::Completed;
        let goals = vec![retired, completed, goal(3, "C", 100.0, 0.0, 3)];
        let plan = plan(500.0, &goals);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].goal_id, 3);
    }

    #[test]
    fn test_plan_skips_full_goals_still_flagged_active() {
        let goals = vec![goal(1, "A", 100.0, 100.0, 1), goal(2, "B", 100.0, 120.0, 2), goal(3, "C", 100.0, 0.0, 3)];
        let plan = plan(50.0, &goals);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].goal_id, 3);
    }

    #[test]
    fn test_plan_total_never_exceeds_room_or_leftover() {
        let goals = vec![goal(1, "A", 80.0, 20.0, 1), goal(2, "B", 50.0, 10.0, 2)];
        let total_room: f64 = goals.iter().map(|g| g.room()).sum();
        for leftover in [10.0, 60.0, 100.0, 500.0] {
            let plan = plan(leftover, &goals);
            let planned: f64 = plan.iter().map(|a| a.amount).sum();
            assert!((planned - leftover.min(total_room)).abs() < 1e-9);
            for alloc in &plan {
                let g = goals.iter().find(|g| g.id == alloc.goal_id).unwrap();
                assert!(alloc.amount <= g.room() + 1e-9);
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let goals = vec![goal(1, "A", 100.0, 0.0, 1), goal(2, "B", 100.0, 0.0, 1)];
        assert_eq!(plan(150.0, &goals), plan(150.0, &goals));
    }

    #[test]
    fn test_commit_appends_and_updates_goals() {
        let (_dir, mut conn) = test_db();
        let a = add_goal(&conn, "Emergency fund", 100.0, 1, None, None).unwrap();
        let b = add_goal(&conn, "Vacation", 200.0, 2, None, None).unwrap();
        conn.execute("UPDATE savings_goals SET current_amount = 50.0 WHERE id = ?1", [a]).unwrap();

        let goals = load_goals(&conn, false).unwrap();
        let planned = plan(120.0, &goals);
        commit(&mut conn, "2025-01", &planned).unwrap();

        let current_a: f64 = conn
            .query_row("SELECT current_amount FROM savings_goals WHERE id = ?1", [a], |r| r.get(0))
            .unwrap();
        let current_b: f64 = conn
            .query_row("SELECT current_amount FROM savings_goals WHERE id = ?1", [b], |r| r.get(0))
            .unwrap();
        assert_eq!(current_a, 100.0);
        assert_eq!(current_b, 70.0);

        let rows: i64 = conn
            .query_row("SELECT count(*) FROM allocations WHERE month = '2025-01'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let (_dir, mut conn) = test_db();
        let a = add_goal(&conn, "Emergency fund", 100.0, 1, None, None).unwrap();
        let bad = vec![
            PlannedAllocation { goal_id: a, goal_name: "Emergency fund".to_string(), amount: 40.0 },
            PlannedAllocation { goal_id: 999, goal_name: "ghost".to_string(), amount: 10.0 },
        ];
        assert!(commit(&mut conn, "2025-01", &bad).is_err());

        let rows: i64 = conn
            .query_row("SELECT count(*) FROM allocations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 0);
        let current: f64 = conn
            .query_row("SELECT current_amount FROM savings_goals WHERE id = ?1", [a], |r| r.get(0))
            .unwrap();
        assert_eq!(current, 0.0);
    }

    #[test]
    fn test_monthly_leftover() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO income (amount, date) VALUES (2000.0, '2025-01-31')", []).unwrap();
        conn.execute("INSERT INTO income (amount, date) VALUES (500.0, '2025-02-01')", []).unwrap();
        conn.execute(
            "INSERT INTO expenses (amount, date, category, subcategory) VALUES (800.0, '2025-01-10', 'Housing', 'Rent')",
            [],
        )
        .unwrap();
        let (income, expenses, leftover) = monthly_leftover(&conn, "2025-01").unwrap();
        assert_eq!(income, 2000.0);
        assert_eq!(expenses, 800.0);
        assert_eq!(leftover, 1200.0);
    }

    #[test]
    fn test_goal_transitions_are_one_way() {
        let (_dir, conn) = test_db();
        let id = add_goal(&conn, "Vacation", 200.0, 2, None, None).unwrap();
        transition_goal(&conn, id, GoalStatus::Completed).unwrap();
        let err = transition_goal(&conn, id, GoalStatus::Retired).unwrap_err();
        assert!(matches!(err, TallyError::InvalidStateTransition(_)));
        assert!(transition_goal(&conn, id, GoalStatus::Active).is_err());
        assert!(matches!(
            transition_goal(&conn, 999, GoalStatus::Retired).unwrap_err(),
            TallyError::InvalidStateTransition(_) | TallyError::UnknownGoal(_)
        ));
    }
}
