//! Shared record traits and validation helpers.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{LedgerError, Result};

/// Exposes the stable identifier of a record stored in one of the ledger collections.
pub trait Identifiable {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// A record that lives in a ledger collection and can check its own fields.
pub trait Record: Identifiable + Clone {
    /// Human label used in `NotFound` errors.
    const KIND: &'static str;

    fn validate(&self) -> Result<()>;

    /// Short single-line rendering used when two versions of a record have to be compared.
    fn describe(&self) -> String;
}

/// Generates a fresh identifier. UUIDs guarantee ids are never reused after a deletion.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn require_date(raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(LedgerError::validation("a date is required"));
    }
    parse_date(raw)
        .map(|_| ())
        .ok_or_else(|| LedgerError::validation(format!("`{raw}` is not a YYYY-MM-DD date")))
}

pub(crate) fn require_positive(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::validation("amount must be greater than 0"))
    }
}

pub(crate) fn require_non_negative(label: &str, amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(LedgerError::validation(format!(
            "{label} must be a number greater than or equal to 0"
        )))
    }
}

pub(crate) fn require_text(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(LedgerError::validation(format!("{label} cannot be empty")))
    } else {
        Ok(())
    }
}
