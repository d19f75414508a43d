use crate::domain::user::{NewUser, RiskTolerance, User};
use crate::storage::{is_unique_violation, ConflictError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    age: Option<i32>,
    annual_income: Option<f64>,
    risk_tolerance: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            age: row.age,
            annual_income: row.annual_income,
            risk_tolerance: row.risk_tolerance.as_deref().map(RiskTolerance::from_tag),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn map_write_error(err: sqlx::Error, email: &str, what: &'static str) -> anyhow::Error {
    if is_unique_violation(&err) {
        ConflictError {
            detail: format!("email {email} is already registered"),
        }
        .into()
    } else {
        anyhow::Error::new(err).context(what)
    }
}

/// Accepts a pool or an open transaction (`&mut *tx`).
pub async fn insert_user<'e, E>(executor: E, user: &NewUser) -> anyhow::Result<User>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let email = user.email.trim();

    let row: UserRow = sqlx::query_as(
        "INSERT INTO users (name, email, age, annual_income, risk_tolerance, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) \
         RETURNING id, name, email, age, annual_income, risk_tolerance, created_at, updated_at",
    )
    .bind(user.name.trim())
    .bind(email)
    .bind(user.age)
    .bind(user.annual_income)
    .bind(user.risk_tolerance.map(|t| t.as_str()))
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(|e| map_write_error(e, email, "insert users failed"))?;

    Ok(row.into())
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id, name, email, age, annual_income, risk_tolerance, created_at, updated_at \
         FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select user {id} failed"))?;

    Ok(row.map(User::from))
}

pub async fn list_users(pool: &SqlitePool) -> anyhow::Result<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "SELECT id, name, email, age, annual_income, risk_tolerance, created_at, updated_at \
         FROM users ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await
    .context("select users failed")?;

    Ok(rows.into_iter().map(User::from).collect())
}

/// Persists every profile field of `user` and bumps `updated_at`.
pub async fn update_user(pool: &SqlitePool, user: &User) -> anyhow::Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(
        "UPDATE users SET name = ?, email = ?, age = ?, annual_income = ?, risk_tolerance = ?, updated_at = ? \
         WHERE id = ? \
         RETURNING id, name, email, age, annual_income, risk_tolerance, created_at, updated_at",
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.age)
    .bind(user.annual_income)
    .bind(user.risk_tolerance.map(|t| t.as_str()))
    .bind(Utc::now())
    .bind(user.id)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_write_error(e, &user.email, "update users failed"))?;

    Ok(row.map(User::from))
}

/// Removes the user and everything they own.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;

    for table in ["budgets", "transactions", "categories"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE user_id = ?"))
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("delete {table} for user {id} failed"))?;
    }

    let res = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("delete user {id} failed"))?;

    tx.commit().await.context("commit transaction failed")?;
    Ok(res.rows_affected() > 0)
}
