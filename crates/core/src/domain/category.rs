use crate::domain::transaction::TransactionType;
use anyhow::ensure;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub kind: TransactionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub user_id: i64,
    pub name: String,
    pub kind: TransactionType,
}

impl NewCategory {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.name.trim().is_empty(), "category name must be non-empty");
        ensure!(
            self.name.trim().chars().count() <= 64,
            "category name must be at most 64 characters"
        );
        Ok(())
    }
}
