use serde::{Deserialize, Serialize};

use super::{
    common::{new_id, require_date, require_positive, require_text, Amounted, Identifiable, Record},
    lenient,
    month::MonthKey,
};
use crate::errors::Result;

/// A dated day-to-day expense. Its free-text category is what envelopes match against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableExpense {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename = "fecha", default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(rename = "categoria", default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(rename = "desc", default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(rename = "importe", default, deserialize_with = "lenient::amount")]
    pub amount: f64,
}

impl VariableExpense {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            id: new_id(),
            date: date.into(),
            category: category.into(),
            description: description.into(),
            amount,
        }
    }

    pub fn month(&self) -> Option<MonthKey> {
        MonthKey::from_date_str(&self.date)
    }

    /// Case-insensitive exact comparison with an envelope name.
    pub fn matches_category(&self, name: &str) -> bool {
        self.category.to_lowercase() == name.to_lowercase()
    }
}

impl Identifiable for VariableExpense {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Amounted for VariableExpense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Record for VariableExpense {
    const KIND: &'static str = "Expense";

    fn validate(&self) -> Result<()> {
        require_date(&self.date)?;
        require_text("category", &self.category)?;
        require_positive(self.amount)
    }

    fn describe(&self) -> String {
        format!(
            "{} [{}] {} {:.2}",
            self.date, self.category, self.description, self.amount
        )
    }
}
