use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ImportMode;
use crate::errors::{LedgerError, Result};
use crate::ledger::{lenient::parse_amount, Ledger, OneOffIncome, Record, VariableExpense};

/// How rows of an imported statement are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvMode {
    /// Every row is an expense with a positive amount.
    #[default]
    ExpensesOnly,
    /// Bank-statement style: positive rows are income, negative rows are expenses.
    SignedAmounts,
}

/// Column aliases are compared with trimmed, lowercased header names; the first header that
/// matches any alias wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvImportOptions {
    pub mode: CsvMode,
    pub delimiter: char,
    pub date_columns: Vec<String>,
    pub category_columns: Vec<String>,
    pub description_columns: Vec<String>,
    pub amount_columns: Vec<String>,
}

impl Default for CsvImportOptions {
    fn default() -> Self {
        Self {
            mode: CsvMode::ExpensesOnly,
            delimiter: ';',
            date_columns: aliases(&["fecha"]),
            category_columns: aliases(&["categoria", "categoría", "concepto"]),
            description_columns: aliases(&["descripcion", "descripción", "concepto"]),
            amount_columns: aliases(&["importe"]),
        }
    }
}

fn aliases(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line in the source, header included.
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CsvBatch {
    pub expenses: Vec<VariableExpense>,
    pub incomes: Vec<OneOffIncome>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvImportReport {
    pub mode: ImportMode,
    pub expenses: usize,
    pub incomes: usize,
    pub skipped: Vec<SkippedRow>,
}

struct Columns {
    date: usize,
    amount: usize,
    category: Option<usize>,
    description: Option<usize>,
}

/// Parses CSV text into records without touching any ledger.
pub fn parse_csv(text: &str, options: &CsvImportOptions) -> Result<CsvBatch> {
    if text.trim().is_empty() {
        return Err(LedgerError::malformed("CSV file is empty"));
    }
    let delimiter = u8::try_from(options.delimiter)
        .map_err(|_| LedgerError::malformed("CSV delimiter must be a single ASCII character"))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();
    let columns = resolve_columns(&headers, options)?;

    let mut batch = CsvBatch::default();
    let mut rows = 0usize;
    for result in reader.records() {
        let record = result?;
        rows += 1;
        let line = record.position().map_or(0, |position| position.line());
        match convert_row(&record, &columns, options.mode) {
            Ok(Converted::Expense(expense)) => batch.expenses.push(expense),
            Ok(Converted::Income(income)) => batch.incomes.push(income),
            Err(reason) => {
                warn!(line, %reason, "CSV row skipped");
                batch.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    if rows == 0 {
        return Err(LedgerError::malformed("CSV file has no data rows"));
    }
    if batch.expenses.is_empty() && batch.incomes.is_empty() {
        return Err(LedgerError::malformed(format!(
            "CSV file has no valid rows ({} skipped)",
            batch.skipped.len()
        )));
    }
    Ok(batch)
}

/// Parses `text` and applies it to a copy of `ledger`.
///
/// Merge appends the new records. Overwrite replaces the collections the mode produces:
/// variable expenses, plus one-off incomes in [`CsvMode::SignedAmounts`].
pub fn import_csv(
    ledger: &Ledger,
    text: &str,
    options: &CsvImportOptions,
    mode: ImportMode,
) -> Result<(Ledger, CsvImportReport)> {
    let batch = parse_csv(text, options)?;
    let mut target = ledger.clone();
    if mode == ImportMode::Overwrite {
        target.variable_expenses.clear();
        if options.mode == CsvMode::SignedAmounts {
            target.one_off_incomes.clear();
        }
    }

    let report = CsvImportReport {
        mode,
        expenses: batch.expenses.len(),
        incomes: batch.incomes.len(),
        skipped: batch.skipped,
    };
    for expense in batch.expenses {
        target.add_variable_expense(expense)?;
    }
    for income in batch.incomes {
        target.add_one_off_income(income)?;
    }

    info!(
        ?mode,
        expenses = report.expenses,
        incomes = report.incomes,
        skipped = report.skipped.len(),
        "CSV imported"
    );
    Ok((target, report))
}

pub fn import_csv_path(
    ledger: &Ledger,
    path: &Path,
    options: &CsvImportOptions,
    mode: ImportMode,
) -> Result<(Ledger, CsvImportReport)> {
    let text = fs::read_to_string(path)?;
    import_csv(ledger, &text, options, mode)
}

fn resolve_columns(headers: &[String], options: &CsvImportOptions) -> Result<Columns> {
    let find = |candidates: &[String]| {
        headers.iter().position(|header| {
            candidates
                .iter()
                .any(|alias| alias.trim().to_lowercase() == *header)
        })
    };
    let date = find(&options.date_columns);
    let amount = find(&options.amount_columns);
    let category = find(&options.category_columns);
    let description = find(&options.description_columns);

    let mut missing = Vec::new();
    if date.is_none() {
        missing.push(options.date_columns.first().map_or("date", String::as_str));
    }
    if category.is_none() {
        missing.push(options.category_columns.first().map_or("category", String::as_str));
    }
    if amount.is_none() {
        missing.push(options.amount_columns.first().map_or("amount", String::as_str));
    }
    match (date, amount, category) {
        (Some(date), Some(amount), category @ Some(_)) => Ok(Columns {
            date,
            amount,
            category,
            description,
        }),
        _ => Err(LedgerError::malformed(format!(
            "CSV is missing required column(s): {}",
            missing.join(", ")
        ))),
    }
}

enum Converted {
    Expense(VariableExpense),
    Income(OneOffIncome),
}

fn field<'r>(record: &'r StringRecord, index: Option<usize>) -> &'r str {
    index.and_then(|index| record.get(index)).unwrap_or("").trim()
}

fn convert_row(
    record: &StringRecord,
    columns: &Columns,
    mode: CsvMode,
) -> std::result::Result<Converted, String> {
    let date = field(record, Some(columns.date));
    let category = field(record, columns.category);
    let description = field(record, columns.description);
    let raw_amount = field(record, Some(columns.amount));
    if date.is_empty() {
        return Err("missing date".into());
    }
    let amount =
        parse_amount(raw_amount).ok_or_else(|| format!("invalid amount `{raw_amount}`"))?;

    let converted = match mode {
        CsvMode::ExpensesOnly => {
            if amount <= 0.0 {
                return Err(format!("amount {amount} is not positive"));
            }
            Converted::Expense(VariableExpense::new(date, category, description, amount))
        }
        CsvMode::SignedAmounts => {
            if amount > 0.0 {
                let label = if description.is_empty() { category } else { description };
                Converted::Income(OneOffIncome::new(date, label, amount))
            } else if amount < 0.0 {
                Converted::Expense(VariableExpense::new(
                    date,
                    category,
                    description,
                    amount.abs(),
                ))
            } else {
                return Err("zero amount".into());
            }
        }
    };

    let validation = match &converted {
        Converted::Expense(expense) => expense.validate(),
        Converted::Income(income) => income.validate(),
    };
    validation.map_err(|err| err.to_string())?;
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = "Fecha;Categoria;Descripcion;Importe\n\
        2025-03-01;Food;Market;12,50\n\
        2025-03-02;Fuel;;40\n\
        2025-03-03;Food;Refund;-5\n\
        ;Food;No date;3\n";

    #[test]
    fn expenses_only_skips_invalid_rows() {
        let batch = parse_csv(STATEMENT, &CsvImportOptions::default()).unwrap();
        assert_eq!(batch.expenses.len(), 2);
        assert_eq!(batch.expenses[0].amount, 12.5);
        assert_eq!(batch.expenses[0].description, "Market");
        assert_eq!(batch.expenses[1].description, "");
        assert_eq!(batch.skipped.len(), 2);
        assert!(batch.incomes.is_empty());
    }

    #[test]
    fn signed_amounts_split_income_and_expense() {
        let options = CsvImportOptions {
            mode: CsvMode::SignedAmounts,
            ..CsvImportOptions::default()
        };
        let text = "fecha;concepto;importe\n2025-03-01;Salary;1.200,00\n2025-03-02;Food;-30,5\n2025-03-03;Nothing;0\n";
        let batch = parse_csv(text, &options).unwrap();
        assert_eq!(batch.incomes.len(), 1);
        assert_eq!(batch.incomes[0].amount, 1200.0);
        assert_eq!(batch.incomes[0].description, "Salary");
        assert_eq!(batch.expenses.len(), 1);
        assert_eq!(batch.expenses[0].amount, 30.5);
        assert_eq!(batch.expenses[0].category, "Food");
        assert_eq!(batch.skipped.len(), 1);
    }

    #[test]
    fn missing_columns_are_reported() {
        let err = parse_csv("fecha;importe\n2025-03-01;4\n", &CsvImportOptions::default())
            .unwrap_err();
        match err {
            LedgerError::MalformedInput(message) => assert!(message.contains("categoria")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn header_only_and_all_invalid_files_fail() {
        let options = CsvImportOptions::default();
        assert!(parse_csv("fecha;categoria;importe\n", &options).is_err());
        assert!(parse_csv("fecha;categoria;importe\n2025-03-01;Food;-1\n", &options).is_err());
        assert!(parse_csv("   ", &options).is_err());
    }

    #[test]
    fn overwrite_replaces_expenses_and_merge_appends() {
        let mut ledger = Ledger::new();
        ledger
            .add_variable_expense(VariableExpense::new("2025-02-01", "Old", "", 9.0))
            .unwrap();
        let options = CsvImportOptions::default();

        let (merged, report) =
            import_csv(&ledger, STATEMENT, &options, ImportMode::Merge).unwrap();
        assert_eq!(merged.variable_expenses.len(), 3);
        assert_eq!(report.expenses, 2);

        let (replaced, _) =
            import_csv(&ledger, STATEMENT, &options, ImportMode::Overwrite).unwrap();
        assert_eq!(replaced.variable_expenses.len(), 2);
        assert_eq!(ledger.variable_expenses.len(), 1);
    }
}
