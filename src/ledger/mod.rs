//! Ledger domain models, persistence-friendly types, and helpers.

pub mod common;
pub mod envelope;
pub mod expense;
pub mod fixed;
pub mod income;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod lenient;
pub mod migration;
pub mod month;
pub mod savings;

pub use common::{new_id, Amounted, Identifiable, Record};
pub use envelope::Envelope;
pub use expense::VariableExpense;
pub use fixed::{FixedCategory, FixedExpense};
pub use income::{BaseIncome, OneOffIncome};
pub use ledger::{Ledger, CURRENT_SCHEMA_VERSION};
pub use migration::LoadReport;
pub use month::MonthKey;
pub use savings::SavingsGoal;
