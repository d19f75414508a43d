use crate::domain::category::{Category, NewCategory};
use crate::domain::transaction::TransactionType;
use anyhow::Context;
use sqlx::{Sqlite, SqlitePool};

pub async fn insert_category<'e, E>(executor: E, category: &NewCategory) -> anyhow::Result<Category>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO categories (user_id, name, kind) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(category.user_id)
    .bind(category.name.trim())
    .bind(category.kind.as_str())
    .fetch_one(executor)
    .await
    .context("insert categories failed")?;

    Ok(Category {
        id,
        user_id: category.user_id,
        name: category.name.trim().to_string(),
        kind: category.kind,
    })
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> anyhow::Result<Option<Category>> {
    let row = sqlx::query_as::<_, (i64, i64, String, String)>(
        "SELECT id, user_id, name, kind FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select category {id} failed"))?;

    row.map(into_category).transpose()
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Category>> {
    let rows = sqlx::query_as::<_, (i64, i64, String, String)>(
        "SELECT id, user_id, name, kind FROM categories WHERE user_id = ? ORDER BY name ASC, id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select categories for user {user_id} failed"))?;

    rows.into_iter().map(into_category).collect()
}

/// Deletes the category and its budgets; transactions keep their row but lose the link.
pub async fn delete_category(pool: &SqlitePool, id: i64) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;

    sqlx::query("UPDATE transactions SET category_id = NULL WHERE category_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("unlink transactions from category failed")?;

    sqlx::query("DELETE FROM budgets WHERE category_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("delete budgets for category failed")?;

    let res = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("delete category {id} failed"))?;

    tx.commit().await.context("commit transaction failed")?;
    Ok(res.rows_affected() > 0)
}

fn into_category((id, user_id, name, kind): (i64, i64, String, String)) -> anyhow::Result<Category> {
    let kind = kind
        .parse::<TransactionType>()
        .with_context(|| format!("invalid kind in DB for category_id={id}"))?;
    Ok(Category {
        id,
        user_id,
        name,
        kind,
    })
}
