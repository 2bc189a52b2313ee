use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::{
    common::{new_id, require_positive, require_text, Amounted, Identifiable, Record},
    lenient,
    month::MonthKey,
};
use crate::errors::{LedgerError, Result};

/// Coarse grouping for recurring obligations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FixedCategory {
    Utilities,
    Loans,
    Subscriptions,
    #[default]
    Misc,
}

impl FixedCategory {
    pub const ALL: [FixedCategory; 4] = [
        FixedCategory::Utilities,
        FixedCategory::Loans,
        FixedCategory::Subscriptions,
        FixedCategory::Misc,
    ];
}

impl fmt::Display for FixedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FixedCategory::Utilities => "Utilities",
            FixedCategory::Loans => "Loans",
            FixedCategory::Subscriptions => "Subscriptions",
            FixedCategory::Misc => "Misc",
        };
        f.write_str(label)
    }
}

impl FromStr for FixedCategory {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "utilities" | "suministros" => Ok(FixedCategory::Utilities),
            "loans" | "prestamos" | "préstamos" => Ok(FixedCategory::Loans),
            "subscriptions" | "suscripciones" => Ok(FixedCategory::Subscriptions),
            "misc" | "otros" | "varios" => Ok(FixedCategory::Misc),
            other => Err(LedgerError::validation(format!(
                "unknown fixed expense category `{other}`"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for FixedCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .and_then(|value| value.parse().ok())
            .unwrap_or_default())
    }
}

/// A recurring monthly obligation, optionally terminated at an inclusive end month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedExpense {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename = "nombre", default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "categoria", default)]
    pub category: FixedCategory,
    #[serde(rename = "importe", default, deserialize_with = "lenient::amount")]
    pub amount: f64,
    /// Kept verbatim so that a malformed value survives a round-trip; see [`Self::is_active`].
    #[serde(
        rename = "endMonth",
        default,
        deserialize_with = "lenient::optional_text"
    )]
    pub end_month: Option<String>,
}

impl FixedExpense {
    pub fn new(name: impl Into<String>, category: FixedCategory, amount: f64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            category,
            amount,
            end_month: None,
        }
    }

    pub fn ending(mut self, end: MonthKey) -> Self {
        self.end_month = Some(end.to_string());
        self
    }

    pub fn end_month_key(&self) -> Option<MonthKey> {
        self.end_month.as_deref().and_then(MonthKey::parse)
    }

    /// Active in every month when open-ended; otherwise through the end month inclusive.
    /// An unparseable end month fails open and keeps the expense active. There is no start
    /// boundary, so open-ended expenses count in past months too.
    pub fn is_active(&self, month: MonthKey) -> bool {
        match self.end_month.as_deref() {
            None => true,
            Some(raw) => match MonthKey::parse(raw) {
                Some(end) => month <= end,
                None => true,
            },
        }
    }
}

impl Identifiable for FixedExpense {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Amounted for FixedExpense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Record for FixedExpense {
    const KIND: &'static str = "Fixed expense";

    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_positive(self.amount)?;
        if let Some(raw) = &self.end_month {
            if MonthKey::parse(raw).is_none() {
                return Err(LedgerError::validation(format!(
                    "end month `{raw}` is not in YYYY-MM format"
                )));
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.end_month {
            Some(end) => format!(
                "{} [{}] {:.2} until {}",
                self.name, self.category, self.amount, end
            ),
            None => format!("{} [{}] {:.2}", self.name, self.category, self.amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(raw: &str) -> MonthKey {
        raw.parse().unwrap()
    }

    #[test]
    fn open_ended_expense_is_active_everywhere() {
        let rent = FixedExpense::new("Rent", FixedCategory::Misc, 800.0);
        for raw in ["1999-01", "2025-03", "2090-12"] {
            assert!(rent.is_active(month(raw)), "inactive in {raw}");
        }
    }

    #[test]
    fn end_month_is_inclusive() {
        let loan =
            FixedExpense::new("Car loan", FixedCategory::Loans, 250.0).ending(month("2025-03"));
        assert!(loan.is_active(month("2025-01")));
        assert!(loan.is_active(month("2025-03")));
        assert!(!loan.is_active(month("2025-04")));
    }

    #[test]
    fn malformed_end_month_fails_open() {
        let mut gym = FixedExpense::new("Gym", FixedCategory::Subscriptions, 30.0);
        gym.end_month = Some("someday".into());
        assert!(gym.is_active(month("2100-01")));
        assert!(gym.validate().is_err());
    }

    #[test]
    fn unknown_category_decodes_as_misc() {
        let expense: FixedExpense = serde_json::from_str(
            r#"{"id":"a","nombre":"Water","categoria":"Plumbing","importe":20,"endMonth":null}"#,
        )
        .unwrap();
        assert_eq!(expense.category, FixedCategory::Misc);
        assert_eq!(expense.end_month, None);
    }
}
