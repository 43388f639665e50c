use crate::api_client;
use common::{CashOutflow, CategorySpend, InvoiceTrend, StatsResponse, VendorSpend};

pub async fn get_stats() -> Result<StatsResponse, String> {
    log::trace!("Fetching overview stats");
    api_client::get::<StatsResponse>("/stats").await
}

pub async fn get_invoice_trends() -> Result<Vec<InvoiceTrend>, String> {
    log::trace!("Fetching invoice trends");
    api_client::get::<Vec<InvoiceTrend>>("/invoice-trends").await
}

pub async fn get_top_vendors() -> Result<Vec<VendorSpend>, String> {
    log::trace!("Fetching top vendors");
    api_client::get::<Vec<VendorSpend>>("/vendors/top10").await
}

pub async fn get_category_spend() -> Result<Vec<CategorySpend>, String> {
    log::trace!("Fetching category spend");
    api_client::get::<Vec<CategorySpend>>("/category-spend").await
}

pub async fn get_cash_outflow() -> Result<Vec<CashOutflow>, String> {
    log::trace!("Fetching cash outflow");
    api_client::get::<Vec<CashOutflow>>("/cash-outflow").await
}
