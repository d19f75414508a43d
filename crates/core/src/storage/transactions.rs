use crate::domain::transaction::{NewTransaction, Transaction, TransactionType};
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    user_id: i64,
    amount: f64,
    kind: String,
    category_id: Option<i64>,
    description: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = anyhow::Error;

    fn try_from(row: TransactionRow) -> anyhow::Result<Self> {
        let kind = row
            .kind
            .parse::<TransactionType>()
            .with_context(|| format!("invalid kind in DB for transaction_id={}", row.id))?;
        Ok(Transaction {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            kind,
            category_id: row.category_id,
            description: row.description,
            occurred_at: row.occurred_at,
        })
    }
}

fn into_transactions(rows: Vec<TransactionRow>) -> anyhow::Result<Vec<Transaction>> {
    rows.into_iter().map(Transaction::try_from).collect()
}

pub async fn insert_transaction<'e, E>(
    executor: E,
    tx: &NewTransaction,
) -> anyhow::Result<Transaction>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let description = tx
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let row: TransactionRow = sqlx::query_as(
        "INSERT INTO transactions (user_id, amount, kind, category_id, description, occurred_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         RETURNING id, user_id, amount, kind, category_id, description, occurred_at",
    )
    .bind(tx.user_id)
    .bind(tx.amount)
    .bind(tx.kind.as_str())
    .bind(tx.category_id)
    .bind(description)
    .bind(tx.occurred_at.unwrap_or_else(Utc::now))
    .fetch_one(executor)
    .await
    .context("insert transactions failed")?;

    row.try_into()
}

pub async fn get_transaction(pool: &SqlitePool, id: i64) -> anyhow::Result<Option<Transaction>> {
    let row: Option<TransactionRow> = sqlx::query_as(
        "SELECT id, user_id, amount, kind, category_id, description, occurred_at \
         FROM transactions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select transaction {id} failed"))?;

    row.map(Transaction::try_from).transpose()
}

/// Newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Transaction>> {
    let rows: Vec<TransactionRow> = sqlx::query_as(
        "SELECT id, user_id, amount, kind, category_id, description, occurred_at \
         FROM transactions WHERE user_id = ? \
         ORDER BY occurred_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select transactions for user {user_id} failed"))?;

    into_transactions(rows)
}

/// Transactions with `occurred_at >= since`, newest first.
pub async fn list_for_user_since(
    pool: &SqlitePool,
    user_id: i64,
    since: DateTime<Utc>,
) -> anyhow::Result<Vec<Transaction>> {
    let rows: Vec<TransactionRow> = sqlx::query_as(
        "SELECT id, user_id, amount, kind, category_id, description, occurred_at \
         FROM transactions WHERE user_id = ? AND occurred_at >= ? \
         ORDER BY occurred_at DESC, id DESC",
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select recent transactions for user {user_id} failed"))?;

    into_transactions(rows)
}

/// Sum of expense amounts in `[from, to)` for one category.
pub async fn sum_expenses_in_category(
    pool: &SqlitePool,
    user_id: i64,
    category_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> anyhow::Result<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM transactions \
         WHERE user_id = ? AND category_id = ? AND kind = 'expense' \
         AND occurred_at >= ? AND occurred_at < ?",
    )
    .bind(user_id)
    .bind(category_id)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await
    .with_context(|| format!("sum expenses for category {category_id} failed"))?;

    Ok(total)
}

pub async fn update_transaction(
    pool: &SqlitePool,
    tx: &Transaction,
) -> anyhow::Result<Option<Transaction>> {
    let row: Option<TransactionRow> = sqlx::query_as(
        "UPDATE transactions SET amount = ?, kind = ?, category_id = ?, description = ?, occurred_at = ? \
         WHERE id = ? \
         RETURNING id, user_id, amount, kind, category_id, description, occurred_at",
    )
    .bind(tx.amount)
    .bind(tx.kind.as_str())
    .bind(tx.category_id)
    .bind(&tx.description)
    .bind(tx.occurred_at)
    .bind(tx.id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("update transaction {} failed", tx.id))?;

    row.map(Transaction::try_from).transpose()
}

pub async fn delete_transaction(pool: &SqlitePool, id: i64) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM transactions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("delete transaction {id} failed"))?;
    Ok(res.rows_affected() > 0)
}
