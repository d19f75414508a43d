pub mod budgets;
pub mod categories;
pub mod transactions;
pub mod users;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid DATABASE_URL: {database_url}"))?
        .create_if_missing(true);

    // Every connection to `:memory:` is its own database, so pin a single one.
    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    pool.connect_with(options)
        .await
        .with_context(|| format!("connect {database_url} failed"))
}

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// A write collided with an existing row (e.g. a taken email).
#[derive(Debug, Clone)]
pub struct ConflictError {
    pub detail: String,
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conflict: {}", self.detail)
    }
}

impl std::error::Error for ConflictError {}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::domain::user::{NewUser, RiskTolerance, User};

    pub async fn pool() -> sqlx::SqlitePool {
        let pool = super::connect("sqlite::memory:").await.unwrap();
        super::migrate(&pool).await.unwrap();
        pool
    }

    pub async fn user(pool: &sqlx::SqlitePool, email: &str, tolerance: RiskTolerance) -> User {
        super::users::insert_user(
            pool,
            &NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                age: Some(34),
                annual_income: Some(72_000.0),
                risk_tolerance: Some(tolerance),
            },
        )
        .await
        .unwrap()
    }
}
