use std::fmt::Write;

use crate::config::Config;
use crate::core::services::{EnvelopeReport, EnvelopeStatus, GoalProgress, MonthSummary};

const BAR_WIDTH: usize = 10;
const SHORT_ID_LEN: usize = 8;

/// Renders amounts in the configured currency and decimal style.
#[derive(Debug, Clone)]
pub struct AmountFormatter {
    currency: String,
    decimal_comma: bool,
}

impl AmountFormatter {
    pub fn new(currency: impl Into<String>, decimal_comma: bool) -> Self {
        Self {
            currency: currency.into(),
            decimal_comma,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.currency.clone(), config.uses_decimal_comma())
    }

    pub fn format(&self, amount: f64) -> String {
        let fixed = format!("{:.2}", amount.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let (group_sep, decimal_sep) = if self.decimal_comma {
            ('.', ',')
        } else {
            (',', '.')
        };
        let mut grouped = String::new();
        for (index, digit) in whole.chars().enumerate() {
            if index > 0 && (whole.len() - index) % 3 == 0 {
                grouped.push(group_sep);
            }
            grouped.push(digit);
        }
        let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
        format!("{sign}{grouped}{decimal_sep}{cents} {}", self.currency)
    }
}

/// First characters of an id, enough to type back as a prefix.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((index, _)) => &id[..index],
        None => id,
    }
}

pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64)
        .round()
        .clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn render_summary(summary: &MonthSummary, amounts: &AmountFormatter) -> String {
    let rows = [
        ("Base income", summary.base_income),
        ("One-off income", summary.one_off_income),
        ("Total income", summary.total_income),
        ("Fixed expenses", summary.fixed_expense),
        ("Variable expenses", summary.variable_expense),
        ("Total expenses", summary.total_expense),
        ("Savings balance", summary.savings_balance),
        ("Balance", summary.balance),
    ];
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", summary.month.label(), summary.month);
    for (label, value) in rows {
        let _ = writeln!(out, "  {:<18}{:>16}", label, amounts.format(value));
    }
    out
}

pub fn render_envelopes(reports: &[EnvelopeReport], amounts: &AmountFormatter) -> String {
    let mut out = String::new();
    for report in reports {
        let detail = match report.status {
            EnvelopeStatus::UndefinedBudget => format!(
                "spent {} (no budget)",
                amounts.format(report.spent)
            ),
            status => format!(
                "{} {:>3.0}% spent {} of {}, remaining {} ({})",
                progress_bar(report.display_percent),
                report.display_percent,
                amounts.format(report.spent),
                amounts.format(report.budget),
                amounts.format(report.remaining),
                status
            ),
        };
        let _ = writeln!(
            out,
            "  {}  {:<16} {}",
            short_id(&report.envelope_id),
            report.name,
            detail
        );
    }
    out
}

pub fn render_goals(goals: &[GoalProgress], amounts: &AmountFormatter) -> String {
    let mut out = String::new();
    for goal in goals {
        let detail = match goal.ratio {
            None => format!("{} (no target)", amounts.format(goal.balance)),
            Some(_) => format!(
                "{} {:>3.0}% {} of {}{}",
                progress_bar(goal.display_percent),
                goal.display_percent,
                amounts.format(goal.balance),
                amounts.format(goal.target),
                if goal.reached { " reached" } else { "" }
            ),
        };
        let _ = writeln!(
            out,
            "  {}  {:<16} {}",
            short_id(&goal.goal_id),
            goal.name,
            detail
        );
    }
    out
}
