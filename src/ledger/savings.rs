use serde::{Deserialize, Serialize};

use super::{
    common::{new_id, require_non_negative, require_text, Identifiable, Record},
    lenient,
};
use crate::errors::{LedgerError, Result};

/// A piggy bank: a named balance with an optional target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename = "nombre", default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Zero means the goal has no target.
    #[serde(rename = "objetivo", default, deserialize_with = "lenient::amount")]
    pub target: f64,
    #[serde(rename = "saldo", default, deserialize_with = "lenient::amount")]
    pub balance: f64,
}

impl SavingsGoal {
    pub fn new(name: impl Into<String>, target: f64, balance: f64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            target,
            balance,
        }
    }

    pub fn has_target(&self) -> bool {
        self.target > 0.0
    }

    /// Adds to the balance. There is no upper bound.
    pub fn deposit(&mut self, amount: f64) {
        self.balance += amount;
    }

    /// Subtracts from the balance. Not capped, so the balance may go negative.
    pub fn withdraw(&mut self, amount: f64) {
        self.balance -= amount;
    }
}

impl Identifiable for SavingsGoal {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for SavingsGoal {
    const KIND: &'static str = "Savings goal";

    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_non_negative("target", self.target)?;
        if !self.balance.is_finite() {
            return Err(LedgerError::validation("balance must be a number"));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} {:.2}/{:.2}", self.name, self.balance, self.target)
    }
}
