use anyhow::{bail, ensure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => bail!("unknown transaction type: {other}"),
        }
    }
}

/// Amounts are stored non-negative; `kind` carries the direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user_id: i64,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the time of insertion.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_amount(self.amount)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionUpdate {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionType>,
    /// Absent leaves the category alone; an explicit `null` unlinks it.
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<i64>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.amount {
            Some(amount) => validate_amount(amount),
            None => Ok(()),
        }
    }

    pub fn apply_to(self, tx: &mut Transaction) {
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(kind) = self.kind {
            tx.kind = kind;
        }
        if let Some(category_id) = self.category_id {
            tx.category_id = category_id;
        }
        if let Some(description) = self.description {
            tx.description = Some(description.trim().to_string()).filter(|s| !s.is_empty());
        }
        if let Some(occurred_at) = self.occurred_at {
            tx.occurred_at = occurred_at;
        }
    }
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_amount(amount: f64) -> anyhow::Result<()> {
    ensure!(
        amount.is_finite() && amount >= 0.0,
        "amount must be a non-negative number (got {amount})"
    );
    Ok(())
}
