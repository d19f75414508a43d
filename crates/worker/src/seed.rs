use anyhow::Context;
use chrono::{DateTime, Duration, Months, Utc};
use finadvisor_core::domain::category::NewCategory;
use finadvisor_core::domain::transaction::{NewTransaction, TransactionType};
use finadvisor_core::domain::user::{NewUser, RiskTolerance, User};
use finadvisor_core::storage::{categories, transactions, users};
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub email: String,
    pub risk_tolerance: RiskTolerance,
    pub monthly_income: f64,
}

/// Planned demo rows, relative to `now`: one salary per month plus a few expenses.
pub fn demo_transactions(
    user_id: i64,
    monthly_income: f64,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<NewTransaction>> {
    anyhow::ensure!(
        monthly_income.is_finite() && monthly_income >= 0.0,
        "monthly income must be non-negative (got {monthly_income})"
    );

    let mut out = Vec::new();
    for months_ago in 0..3u32 {
        let at = now
            .checked_sub_months(Months::new(months_ago))
            .context("demo date out of range")?;
        out.push(NewTransaction {
            user_id,
            amount: monthly_income,
            kind: TransactionType::Income,
            category_id: None,
            description: Some("Salary".to_string()),
            occurred_at: Some(at),
        });
    }

    for (amount, days_ago, description) in [
        (1200.0, 3, "Rent"),
        (420.5, 12, "Groceries"),
        (829.5, 40, "Travel"),
    ] {
        out.push(NewTransaction {
            user_id,
            amount,
            kind: TransactionType::Expense,
            category_id: None,
            description: Some(description.to_string()),
            occurred_at: Some(now - Duration::days(days_ago)),
        });
    }

    Ok(out)
}

/// Writes the user, its category and its transactions in one database transaction.
pub async fn seed_demo_user(pool: &SqlitePool, opts: &SeedOptions) -> anyhow::Result<User> {
    let input = NewUser {
        name: "Demo User".to_string(),
        email: opts.email.clone(),
        age: Some(32),
        annual_income: Some(opts.monthly_income * 12.0),
        risk_tolerance: Some(opts.risk_tolerance),
    };
    input.validate()?;
    // user id is patched in once the row exists
    let planned = demo_transactions(0, opts.monthly_income, Utc::now())?;

    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let user = users::insert_user(&mut *tx, &input).await?;
    let expenses = categories::insert_category(
        &mut *tx,
        &NewCategory {
            user_id: user.id,
            name: "Living".to_string(),
            kind: TransactionType::Expense,
        },
    )
    .await?;

    let mut inserted = 0usize;
    for mut row in planned {
        row.user_id = user.id;
        if row.kind == TransactionType::Expense {
            row.category_id = Some(expenses.id);
        }
        transactions::insert_transaction(&mut *tx, &row).await?;
        inserted += 1;
    }

    tx.commit().await.context("commit transaction failed")?;

    tracing::info!(user_id = user.id, email = %user.email, inserted, "seeded demo user");
    Ok(user)
}
