//! Stateless query and command services over a [`Ledger`](crate::ledger::Ledger) snapshot.

pub mod budget_service;
pub mod category_service;
pub mod savings_service;
pub mod summary_service;

pub use budget_service::{BudgetService, EnvelopeReport, EnvelopeStatus};
pub use category_service::CategoryService;
pub use savings_service::{DepositOutcome, DepositPolicy, GoalProgress, SavingsService};
pub use summary_service::{BalancePolicy, MonthSummary, SummaryService};
