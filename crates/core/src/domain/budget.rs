use anyhow::ensure;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Spending limit for one category over an inclusive date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    /// Half-open UTC instant range covering `start_date..=end_date`.
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_date.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = (self.end_date + chrono::Duration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        (start, end)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    pub user_id: i64,
    pub category_id: i64,
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewBudget {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.amount.is_finite() && self.amount >= 0.0,
            "budget amount must be a non-negative number (got {})",
            self.amount
        );
        ensure!(
            self.end_date >= self.start_date,
            "end_date {} is before start_date {}",
            self.end_date,
            self.start_date
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub spent: f64,
    pub remaining: f64,
    pub used_percent: f64,
    pub over_budget: bool,
}

impl BudgetStatus {
    pub fn new(budget: Budget, spent: f64) -> Self {
        let remaining = budget.amount - spent;
        let used_percent = if budget.amount > 0.0 {
            spent / budget.amount * 100.0
        } else {
            0.0
        };
        let over_budget = spent > budget.amount;
        Self {
            budget,
            spent,
            remaining,
            used_percent,
            over_budget,
        }
    }
}
