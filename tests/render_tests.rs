mod common;

use common::{household, month};
use family_ledger::{
    cli::formatters::{render_envelopes, render_summary, AmountFormatter},
    core::services::{BalancePolicy, BudgetService, SummaryService},
    ledger::{Ledger, VariableExpense},
};
use insta::assert_snapshot;
use regex::Regex;

#[test]
fn month_summary_layout() {
    let ledger = household();
    let summary = SummaryService::month_summary(
        &ledger,
        month("2025-03"),
        BalancePolicy::IncomeMinusExpense,
    );
    let rendered = render_summary(&summary, &AmountFormatter::new("EUR", true));
    assert_snapshot!(rendered.trim_end(), @r"
March 2025 (2025-03)
  Base income           3.500,00 EUR
  One-off income          300,00 EUR
  Total income          3.800,00 EUR
  Fixed expenses          800,00 EUR
  Variable expenses        50,00 EUR
  Total expenses          850,00 EUR
  Savings balance         400,00 EUR
  Balance               2.950,00 EUR
");
}

#[test]
fn envelope_rows_show_short_ids_and_status() {
    let ledger = household();
    let reports = BudgetService::evaluate_all(&ledger, month("2025-03"));
    let rendered = render_envelopes(&reports, &AmountFormatter::new("EUR", true));
    let row = Regex::new(r"^  [0-9a-f]{8}  Food +\[#{9}-\]  91% spent 50,00 EUR of 55,00 EUR, remaining 5,00 EUR \(near limit\)$")
        .unwrap();
    assert!(row.is_match(rendered.trim_end()), "unexpected row: {rendered}");
}

#[test]
fn generated_ids_are_uuid_v4() {
    let mut ledger = Ledger::new();
    let id = ledger
        .add_variable_expense(VariableExpense::new("2025-03-01", "Food", "", 1.0))
        .unwrap();
    let uuid_v4 =
        Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$").unwrap();
    assert!(uuid_v4.is_match(&id), "id {id} is not a v4 uuid");
}
