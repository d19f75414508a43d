use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use finadvisor_core::domain::transaction::{NewTransaction, Transaction, TransactionUpdate};
use finadvisor_core::storage::{categories, transactions};
use sqlx::SqlitePool;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::routes::users::load_user;
use crate::AppState;

/// A transaction may only point at one of its owner's categories.
async fn check_category(pool: &SqlitePool, user_id: i64, category_id: Option<i64>) -> ApiResult<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    match categories::get_category(pool, category_id).await? {
        Some(c) if c.user_id == user_id => Ok(()),
        _ => Err(ApiError::BadRequest(format!(
            "category {category_id} does not belong to user {user_id}"
        ))),
    }
}

async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewTransaction>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    input.validate().map_err(ApiError::bad_request)?;
    let pool = state.pool()?;

    load_user(pool, input.user_id).await?;
    check_category(pool, input.user_id, input.category_id).await?;

    let tx = transactions::insert_transaction(pool, &input).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

async fn get_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Transaction>> {
    let tx = transactions::get_transaction(state.pool()?, id)
        .await?
        .ok_or_else(|| ApiError::not_found("transaction", id))?;
    Ok(Json(tx))
}

async fn list_user_transactions(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let pool = state.pool()?;
    load_user(pool, user_id).await?;
    Ok(Json(transactions::list_for_user(pool, user_id).await?))
}

async fn update_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<TransactionUpdate>,
) -> ApiResult<Json<Transaction>> {
    update.validate().map_err(ApiError::bad_request)?;
    let pool = state.pool()?;

    let mut tx = transactions::get_transaction(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("transaction", id))?;
    check_category(pool, tx.user_id, update.category_id.flatten()).await?;
    update.apply_to(&mut tx);

    let tx = transactions::update_transaction(pool, &tx)
        .await?
        .ok_or_else(|| ApiError::not_found("transaction", id))?;
    Ok(Json(tx))
}

async fn delete_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    if !transactions::delete_transaction(state.pool()?, id).await? {
        return Err(ApiError::not_found("transaction", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/users/:id/transactions", get(list_user_transactions))
}
