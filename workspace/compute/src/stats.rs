//! Dashboard headline statistics: all-time totals, month-over-month deltas and
//! the short daily series behind the overview sparklines.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use common::converters::{average, decimal_to_f64, percent_change};
use common::{DailyStat, StatsResponse};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};
use crate::repository::DashboardRepository;

/// Length of the sparkline series in days.
pub const TREND_DAYS: u64 = 10;

/// Half-open interval `[start, end)` of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Window covering the whole days `first..=last`.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        let end = last
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ComputeError::Query(format!("date out of range: {}", last)))?;
        Ok(Self {
            start: midnight(first),
            end: midnight(end),
        })
    }

    /// The calendar month containing `day`.
    pub fn month_of(day: NaiveDate) -> Result<Self> {
        let first = first_of_month(day)?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| ComputeError::Query(format!("date out of range: {}", day)))?;
        Ok(Self {
            start: midnight(first),
            end: midnight(next),
        })
    }

    /// The calendar month before the one containing `day`.
    pub fn previous_month_of(day: NaiveDate) -> Result<Self> {
        let first = first_of_month(day)?
            .checked_sub_months(Months::new(1))
            .ok_or_else(|| ComputeError::Query(format!("date out of range: {}", day)))?;
        Self::month_of(first)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Invoice count and summed invoice totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpendTotals {
    pub total: Decimal,
    pub count: i64,
}

impl SpendTotals {
    pub fn spend(&self) -> f64 {
        decimal_to_f64(self.total)
    }

    pub fn average(&self) -> f64 {
        average(self.spend(), self.count)
    }
}

fn first_of_month(day: NaiveDate) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(day.year(), day.month(), 1)
        .ok_or_else(|| ComputeError::Query(format!("invalid month for {}", day)))
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Buckets invoice amounts into one entry per day of `first..=last`,
/// filling days without invoices with zeros.
pub fn daily_series(
    amounts: &[(DateTime<Utc>, Decimal)],
    first: NaiveDate,
    last: NaiveDate,
) -> Vec<DailyStat> {
    let mut buckets: BTreeMap<NaiveDate, (Decimal, i64)> = first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|day| (day, (Decimal::ZERO, 0)))
        .collect();

    for (instant, amount) in amounts {
        if let Some((sum, count)) = buckets.get_mut(&instant.date_naive()) {
            *sum += *amount;
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, (sum, count))| {
            let spend = decimal_to_f64(sum);
            DailyStat {
                date,
                spend,
                invoices: count,
                average: average(spend, count),
            }
        })
        .collect()
}

/// Computes the overview statistics as of `today` (UTC).
#[instrument(skip(repo))]
pub async fn dashboard_stats(
    repo: &dyn DashboardRepository,
    today: NaiveDate,
) -> Result<StatsResponse> {
    let all_time = repo.spend_totals(None).await?;
    let current = repo.spend_totals(Some(DateWindow::month_of(today)?)).await?;
    let previous = repo
        .spend_totals(Some(DateWindow::previous_month_of(today)?))
        .await?;

    let first_day = today
        .checked_sub_days(Days::new(TREND_DAYS - 1))
        .ok_or_else(|| ComputeError::Query(format!("date out of range: {}", today)))?;
    let amounts = repo
        .invoice_amounts(DateWindow::days(first_day, today)?)
        .await?;
    let trend = daily_series(&amounts, first_day, today);

    debug!(
        total = %all_time.total,
        count = all_time.count,
        current = %current.total,
        previous = %previous.total,
        "Computed spend totals"
    );

    Ok(StatsResponse {
        total_spend: all_time.spend(),
        total_invoices: all_time.count,
        documents_uploaded: all_time.count,
        average_invoice_value: all_time.average(),
        current_month_spend: current.spend(),
        last_month_spend: previous.spend(),
        spend_change: percent_change(current.spend(), previous.spend()),
        current_month_invoices: current.count,
        last_month_invoices: previous.count,
        invoices_change: percent_change(current.count as f64, previous.count as f64),
        current_month_average: current.average(),
        last_month_average: previous.average(),
        average_change: percent_change(current.average(), previous.average()),
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_windows() {
        let window = DateWindow::month_of(date(2025, 3, 14)).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap());

        let previous = DateWindow::previous_month_of(date(2025, 1, 31)).unwrap();
        assert_eq!(previous.start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(previous.end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_is_half_open() {
        let window = DateWindow::month_of(date(2025, 2, 10)).unwrap();
        assert!(window.contains(Utc.with_ymd_and_hms(2025, 2, 28, 23, 59, 59).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_daily_series_is_zero_filled() {
        let amounts = vec![
            (Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(), Decimal::new(10000, 2)),
            (Utc.with_ymd_and_hms(2025, 3, 10, 17, 30, 0).unwrap(), Decimal::new(5000, 2)),
            (Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap(), Decimal::new(2500, 2)),
            // Outside the series, ignored
            (Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(), Decimal::new(99900, 2)),
        ];
        let series = daily_series(&amounts, date(2025, 3, 7), date(2025, 3, 10));

        assert_eq!(series.len(), 4);
        assert_eq!(series[0].date, date(2025, 3, 7));
        assert_eq!(series[0].spend, 0.0);
        assert_eq!(series[0].average, 0.0);
        assert_eq!(series[1].spend, 25.0);
        assert_eq!(series[3].invoices, 2);
        assert_eq!(series[3].spend, 150.0);
        assert_eq!(series[3].average, 75.0);
    }
}
