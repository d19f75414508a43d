use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use finadvisor_core::domain::budget::{Budget, BudgetStatus, NewBudget};
use finadvisor_core::storage::{budgets, categories};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::routes::users::load_user;
use crate::AppState;

async fn create_budget(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewBudget>,
) -> ApiResult<(StatusCode, Json<Budget>)> {
    input.validate().map_err(ApiError::bad_request)?;
    let pool = state.pool()?;
    load_user(pool, input.user_id).await?;

    match categories::get_category(pool, input.category_id).await? {
        Some(c) if c.user_id == input.user_id => {}
        _ => {
            return Err(ApiError::BadRequest(format!(
                "category {} does not belong to user {}",
                input.category_id, input.user_id
            )))
        }
    }

    let budget = budgets::insert_budget(pool, &input).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

async fn list_user_budgets(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Budget>>> {
    let pool = state.pool()?;
    load_user(pool, user_id).await?;
    Ok(Json(budgets::list_for_user(pool, user_id).await?))
}

async fn get_budget_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<BudgetStatus>> {
    let status = budgets::budget_status(state.pool()?, id)
        .await?
        .ok_or_else(|| ApiError::not_found("budget", id))?;
    Ok(Json(status))
}

async fn delete_budget(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<StatusCode> {
    if !budgets::delete_budget(state.pool()?, id).await? {
        return Err(ApiError::not_found("budget", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/budgets", post(create_budget))
        .route("/budgets/:id", delete(delete_budget))
        .route("/budgets/:id/status", get(get_budget_status))
        .route("/users/:id/budgets", get(list_user_budgets))
}
