use anyhow::ensure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared appetite for risk. Drives the static allocation tables.
///
/// Parsing is lenient: anything that is not a known tag becomes `Moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] = [
        RiskTolerance::Conservative,
        RiskTolerance::Moderate,
        RiskTolerance::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "conservative" => RiskTolerance::Conservative,
            "aggressive" => RiskTolerance::Aggressive,
            "moderate" => RiskTolerance::Moderate,
            other => {
                tracing::debug!(tag = other, "unknown risk tolerance; using moderate");
                RiskTolerance::Moderate
            }
        }
    }
}

impl From<String> for RiskTolerance {
    fn from(tag: String) -> Self {
        RiskTolerance::from_tag(&tag)
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub annual_income: Option<f64>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Undeclared tolerance is treated as moderate.
    pub fn effective_risk_tolerance(&self) -> RiskTolerance {
        self.risk_tolerance.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub annual_income: Option<f64>,
    #[serde(default)]
    pub risk_tolerance: Option<RiskTolerance>,
}

impl NewUser {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.name.trim().is_empty(), "name must be non-empty");
        validate_email(&self.email)?;
        validate_profile(self.age, self.annual_income)
    }
}

/// Partial profile update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub annual_income: Option<f64>,
    #[serde(default)]
    pub risk_tolerance: Option<RiskTolerance>,
}

impl UserUpdate {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(name) = &self.name {
            ensure!(!name.trim().is_empty(), "name must be non-empty");
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        validate_profile(self.age, self.annual_income)
    }

    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = self.email {
            user.email = email.trim().to_string();
        }
        if self.age.is_some() {
            user.age = self.age;
        }
        if self.annual_income.is_some() {
            user.annual_income = self.annual_income;
        }
        if self.risk_tolerance.is_some() {
            user.risk_tolerance = self.risk_tolerance;
        }
    }
}

fn validate_email(email: &str) -> anyhow::Result<()> {
    let email = email.trim();
    ensure!(!email.is_empty(), "email must be non-empty");
    ensure!(email.contains('@'), "email must contain '@' (got {email})");
    Ok(())
}

fn validate_profile(age: Option<i32>, annual_income: Option<f64>) -> anyhow::Result<()> {
    if let Some(age) = age {
        ensure!((0..=150).contains(&age), "age must be between 0 and 150 (got {age})");
    }
    if let Some(income) = annual_income {
        ensure!(
            income.is_finite() && income >= 0.0,
            "annual_income must be a non-negative number (got {income})"
        );
    }
    Ok(())
}
