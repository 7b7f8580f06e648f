//! Domain types returned by the Finch API

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One recorded transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// "income" or "expense"
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == "expense"
    }

    /// Amount with expense sign applied
    pub fn signed_amount(&self) -> f64 {
        if self.is_expense() {
            -self.amount
        } else {
            self.amount
        }
    }
}

/// One investment position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub id: String,
    pub symbol: String,
    pub asset_type: String,
    pub shares: f64,
    pub price_per_share: f64,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub broker: Option<String>,
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub current_value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Investment {
    /// Purchase cost including fees
    pub fn cost_basis(&self) -> f64 {
        self.shares * self.price_per_share + self.fees
    }

    /// Gain/loss against current value, when the API supplied one
    pub fn performance(&self) -> Option<f64> {
        self.current_value.map(|v| v - self.cost_basis())
    }
}
