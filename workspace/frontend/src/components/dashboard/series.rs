//! Client-side shaping of the aggregates before they are plotted.

use chrono::{Datelike, NaiveDate};
use common::{CashOutflow, InvoiceTrend};
use std::collections::BTreeMap;

/// Spend and invoice count of one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    /// `YYYY-MM`
    pub month: String,
    pub spend: f64,
    pub invoices: i64,
}

fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Folds the per-date trend rows into months, oldest first.
pub fn monthly_trends(trends: &[InvoiceTrend]) -> Vec<MonthBucket> {
    let mut months: BTreeMap<String, MonthBucket> = BTreeMap::new();
    for trend in trends {
        let key = month_key(trend.date.date_naive());
        let bucket = months.entry(key.clone()).or_insert_with(|| MonthBucket {
            month: key,
            spend: 0.0,
            invoices: 0,
        });
        bucket.spend += trend.total_spend;
        bucket.invoices += trend.invoice_count;
    }
    months.into_values().collect()
}

/// Folds the daily outflow into months, oldest first. Rows with an unparsable date are dropped.
pub fn monthly_outflow(outflow: &[CashOutflow]) -> Vec<(String, f64)> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for day in outflow {
        match NaiveDate::parse_from_str(&day.date, "%Y-%m-%d") {
            Ok(date) => *months.entry(month_key(date)).or_default() += day.amount,
            Err(_) => log::warn!("Ignoring outflow row with date {:?}", day.date),
        }
    }
    months.into_iter().collect()
}

/// Formats an amount as euros with thousands separators, e.g. `€1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}€{grouped}.{cents}")
}
