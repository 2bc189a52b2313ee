use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use family_ledger::core::services::{BalancePolicy, BudgetService, SummaryService};
use family_ledger::ledger::{
    BaseIncome, Envelope, FixedCategory, FixedExpense, Ledger, MonthKey, OneOffIncome,
    VariableExpense,
};
use family_ledger::storage::json_backend::{load_ledger_from_path, save_ledger_to_path};
use tempfile::tempdir;

const CATEGORIES: [&str; 6] = ["Food", "Fuel", "Kids", "Leisure", "Health", "Home"];

fn build_sample_ledger(expense_count: usize) -> Ledger {
    let mut ledger = Ledger::new();
    ledger.set_base_income(BaseIncome::new(2100.0, 1650.0, 120.0));
    for (idx, category) in CATEGORIES.iter().enumerate() {
        ledger
            .add_envelope(Envelope::new(*category, 150.0 + idx as f64 * 25.0))
            .expect("envelope");
        ledger
            .add_fixed_expense(FixedExpense::new(
                format!("Fixed {idx}"),
                FixedCategory::ALL[idx % FixedCategory::ALL.len()],
                40.0 + idx as f64,
            ))
            .expect("fixed expense");
    }

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("start date");
    for idx in 0..expense_count {
        let date = start + Duration::days((idx % 730) as i64);
        let date = date.format("%Y-%m-%d").to_string();
        ledger
            .add_variable_expense(VariableExpense::new(
                date.clone(),
                CATEGORIES[idx % CATEGORIES.len()],
                "",
                5.0 + (idx % 90) as f64,
            ))
            .expect("expense");
        if idx % 50 == 0 {
            ledger
                .add_one_off_income(OneOffIncome::new(date, "Extra", 100.0))
                .expect("income");
        }
    }
    ledger
}

fn bench_month_queries(c: &mut Criterion) {
    let ledger = build_sample_ledger(black_box(10_000));
    let month = MonthKey::new(2025, 3).expect("month");

    c.bench_function("month_summary_10k", |b| {
        b.iter(|| {
            SummaryService::month_summary(
                black_box(&ledger),
                month,
                BalancePolicy::IncomeMinusExpense,
            )
        })
    });

    c.bench_function("envelopes_10k", |b| {
        b.iter(|| BudgetService::evaluate_all(black_box(&ledger), month))
    });
}

fn bench_ledger_io(c: &mut Criterion) {
    let ledger = build_sample_ledger(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("ledger.json");

    c.bench_function("ledger_save_10k", |b| {
        b.iter(|| save_ledger_to_path(&ledger, &file_path).expect("save ledger"))
    });

    save_ledger_to_path(&ledger, &file_path).expect("seed ledger");
    c.bench_function("ledger_load_10k", |b| {
        b.iter(|| load_ledger_from_path(&file_path).expect("load ledger"))
    });
}

criterion_group!(benches, bench_month_queries, bench_ledger_io);
criterion_main!(benches);
