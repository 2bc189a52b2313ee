use serde::{Deserialize, Serialize};

use super::{
    common::{new_id, require_date, require_positive, Amounted, Identifiable, Record},
    lenient,
    month::MonthKey,
};
use crate::errors::Result;

/// Recurring monthly income, identical for every month until edited.
///
/// The wire names come from the snapshots written by the original household app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseIncome {
    #[serde(rename = "juan", default, deserialize_with = "lenient::amount")]
    pub primary: f64,
    #[serde(rename = "saray", default, deserialize_with = "lenient::amount")]
    pub secondary: f64,
    #[serde(rename = "otros", default, deserialize_with = "lenient::amount")]
    pub other: f64,
}

impl BaseIncome {
    pub fn new(primary: f64, secondary: f64, other: f64) -> Self {
        Self {
            primary,
            secondary,
            other,
        }
    }

    pub fn total(&self) -> f64 {
        [self.primary, self.secondary, self.other]
            .iter()
            .filter(|value| value.is_finite())
            .sum()
    }
}

/// Income received once, counted only in the month of its date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneOffIncome {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename = "fecha", default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(rename = "desc", default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(rename = "importe", default, deserialize_with = "lenient::amount")]
    pub amount: f64,
}

impl OneOffIncome {
    pub fn new(date: impl Into<String>, description: impl Into<String>, amount: f64) -> Self {
        Self {
            id: new_id(),
            date: date.into(),
            description: description.into(),
            amount,
        }
    }

    pub fn month(&self) -> Option<MonthKey> {
        MonthKey::from_date_str(&self.date)
    }
}

impl Identifiable for OneOffIncome {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Amounted for OneOffIncome {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Record for OneOffIncome {
    const KIND: &'static str = "One-off income";

    fn validate(&self) -> Result<()> {
        require_date(&self.date)?;
        require_positive(self.amount)
    }

    fn describe(&self) -> String {
        format!("{} {} {:.2}", self.date, self.description, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_income_total_sums_all_fields() {
        assert_eq!(BaseIncome::new(2000.0, 1500.0, 0.0).total(), 3500.0);
        assert_eq!(BaseIncome::default().total(), 0.0);
    }

    #[test]
    fn one_off_income_requires_date_and_positive_amount() {
        assert!(OneOffIncome::new("2025-03-02", "Bonus", 300.0).validate().is_ok());
        assert!(OneOffIncome::new("", "Bonus", 300.0).validate().is_err());
        assert!(OneOffIncome::new("2025-03-02", "Bonus", 0.0).validate().is_err());
        assert!(OneOffIncome::new("2025-02-30", "Bonus", 10.0).validate().is_err());
    }

    #[test]
    fn decodes_legacy_string_amounts() {
        let income: OneOffIncome = serde_json::from_str(
            r#"{"id": 17, "fecha": "2025-03-02", "desc": null, "importe": "300,5"}"#,
        )
        .unwrap();
        assert_eq!(income.id, "17");
        assert_eq!(income.description, "");
        assert_eq!(income.amount, 300.5);
    }
}
