use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Headline figures for the overview cards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Sum of all invoice totals
    pub total_spend: f64,
    pub total_invoices: i64,
    /// Every invoice originates from one uploaded document
    pub documents_uploaded: i64,
    pub average_invoice_value: f64,

    pub current_month_spend: f64,
    pub last_month_spend: f64,
    /// Signed month-over-month change, e.g. "+12.5%"
    pub spend_change: String,

    pub current_month_invoices: i64,
    pub last_month_invoices: i64,
    pub invoices_change: String,

    pub current_month_average: f64,
    pub last_month_average: f64,
    pub average_change: String,

    /// Zero-filled daily series of the last days, oldest first
    pub trend: Vec<DailyStat>,
}

/// One day of the sparkline series.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub spend: f64,
    pub invoices: i64,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTrend {
    pub date: DateTime<Utc>,
    pub total_spend: f64,
    pub invoice_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorSpend {
    pub name: String,
    pub total_spend: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub category: String,
    pub spend: f64,
}

/// Expected outflow for one calendar day (UTC), keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CashOutflow {
    pub date: String,
    pub amount: f64,
}
