use crate::domain::budget::{Budget, BudgetStatus, NewBudget};
use crate::storage::transactions;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct BudgetRow {
    id: i64,
    user_id: i64,
    category_id: i64,
    amount: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<BudgetRow> for Budget {
    fn from(row: BudgetRow) -> Self {
        Budget {
            id: row.id,
            user_id: row.user_id,
            category_id: row.category_id,
            amount: row.amount,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
        }
    }
}

pub async fn insert_budget(pool: &SqlitePool, budget: &NewBudget) -> anyhow::Result<Budget> {
    let row: BudgetRow = sqlx::query_as(
        "INSERT INTO budgets (user_id, category_id, amount, start_date, end_date, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         RETURNING id, user_id, category_id, amount, start_date, end_date, created_at",
    )
    .bind(budget.user_id)
    .bind(budget.category_id)
    .bind(budget.amount)
    .bind(budget.start_date)
    .bind(budget.end_date)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .context("insert budgets failed")?;

    Ok(row.into())
}

pub async fn get_budget(pool: &SqlitePool, id: i64) -> anyhow::Result<Option<Budget>> {
    let row: Option<BudgetRow> = sqlx::query_as(
        "SELECT id, user_id, category_id, amount, start_date, end_date, created_at \
         FROM budgets WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select budget {id} failed"))?;

    Ok(row.map(Budget::from))
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Budget>> {
    let rows: Vec<BudgetRow> = sqlx::query_as(
        "SELECT id, user_id, category_id, amount, start_date, end_date, created_at \
         FROM budgets WHERE user_id = ? ORDER BY start_date DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select budgets for user {user_id} failed"))?;

    Ok(rows.into_iter().map(Budget::from).collect())
}

pub async fn budget_status(pool: &SqlitePool, id: i64) -> anyhow::Result<Option<BudgetStatus>> {
    let Some(budget) = get_budget(pool, id).await? else {
        return Ok(None);
    };

    let (from, to) = budget.window();
    let spent =
        transactions::sum_expenses_in_category(pool, budget.user_id, budget.category_id, from, to)
            .await?;

    Ok(Some(BudgetStatus::new(budget, spent)))
}

pub async fn delete_budget(pool: &SqlitePool, id: i64) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM budgets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("delete budget {id} failed"))?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::NewCategory;
    use crate::domain::transaction::{NewTransaction, TransactionType};
    use crate::domain::user::RiskTolerance;
    use crate::storage::{categories, testing};
    use chrono::TimeZone;

    #[tokio::test]
    async fn status_sums_only_in_window_expenses_of_the_category() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "budget@example.com", RiskTolerance::Moderate).await;
        let groceries = categories::insert_category(
            &pool,
            &NewCategory {
                user_id: user.id,
                name: "Groceries".into(),
                kind: TransactionType::Expense,
            },
        )
        .await
        .unwrap();

        let budget = insert_budget(
            &pool,
            &NewBudget {
                user_id: user.id,
                category_id: groceries.id,
                amount: 300.0,
                start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            },
        )
        .await
        .unwrap();

        let entries = [
            // counted: first and last instant of the window
            (120.0, TransactionType::Expense, Some(groceries.id), Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0)),
            (200.0, TransactionType::Expense, Some(groceries.id), Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59)),
            // ignored: outside the window, other category, income
            (50.0, TransactionType::Expense, Some(groceries.id), Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0)),
            (75.0, TransactionType::Expense, None, Utc.with_ymd_and_hms(2026, 9, 15, 12, 0, 0)),
            (999.0, TransactionType::Income, Some(groceries.id), Utc.with_ymd_and_hms(2026, 9, 15, 12, 0, 0)),
        ];
        for (amount, kind, category_id, at) in entries {
            transactions::insert_transaction(
                &pool,
                &NewTransaction {
                    user_id: user.id,
                    amount,
                    kind,
                    category_id,
                    description: None,
                    occurred_at: Some(at.unwrap()),
                },
            )
            .await
            .unwrap();
        }

        let status = budget_status(&pool, budget.id).await.unwrap().unwrap();
        assert_eq!(status.spent, 320.0);
        assert_eq!(status.remaining, -20.0);
        assert!(status.over_budget);

        assert_eq!(list_for_user(&pool, user.id).await.unwrap().len(), 1);
        assert!(delete_budget(&pool, budget.id).await.unwrap());
        assert!(budget_status(&pool, budget.id).await.unwrap().is_none());
    }
}
