use axum::{extract::State, response::Json};
use chrono::Utc;
use common::{CashOutflow, CategorySpend, InvoiceTrend, StatsResponse, VendorSpend};
use compute::dashboard_stats;
use tracing::{debug, instrument, trace};

use crate::error::ApiError;
use crate::schemas::{AppState, CachedData};

const TOP_VENDOR_LIMIT: u64 = 10;

/// Overview statistics with month-over-month changes
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Overview statistics", body = StatsResponse),
        (status = 500, description = "Query failed", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let cache_key = "stats".to_string();
    if let Some(CachedData::Stats(stats)) = state.cache.get(&cache_key).await {
        trace!("Serving stats from cache");
        return Ok(Json(stats));
    }

    let today = Utc::now().date_naive();
    let stats = dashboard_stats(state.repo.as_ref(), today)
        .await
        .map_err(ApiError::from_compute("Error fetching stats"))?;

    state.cache.insert(cache_key, CachedData::Stats(stats.clone())).await;
    Ok(Json(stats))
}

/// Invoice totals per invoice date
#[utoipa::path(
    get,
    path = "/api/invoice-trends",
    tag = "dashboard",
    responses(
        (status = 200, description = "Totals per invoice date, oldest first", body = Vec<InvoiceTrend>),
        (status = 500, description = "Query failed", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_invoice_trends(
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceTrend>>, ApiError> {
    let cache_key = "invoice-trends".to_string();
    if let Some(CachedData::InvoiceTrends(trends)) = state.cache.get(&cache_key).await {
        trace!("Serving invoice trends from cache");
        return Ok(Json(trends));
    }

    let trends = state
        .repo
        .invoice_trends()
        .await
        .map_err(ApiError::from_compute("Error fetching invoice trends"))?;
    debug!("Computed {} trend points", trends.len());

    state
        .cache
        .insert(cache_key, CachedData::InvoiceTrends(trends.clone()))
        .await;
    Ok(Json(trends))
}

/// The ten vendors with the highest spend
#[utoipa::path(
    get,
    path = "/api/vendors/top10",
    tag = "dashboard",
    responses(
        (status = 200, description = "Vendors by spend, highest first", body = Vec<VendorSpend>),
        (status = 500, description = "Query failed", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_top_vendors(
    State(state): State<AppState>,
) -> Result<Json<Vec<VendorSpend>>, ApiError> {
    let cache_key = "vendors-top10".to_string();
    if let Some(CachedData::TopVendors(vendors)) = state.cache.get(&cache_key).await {
        trace!("Serving top vendors from cache");
        return Ok(Json(vendors));
    }

    let vendors = state
        .repo
        .top_vendors(TOP_VENDOR_LIMIT)
        .await
        .map_err(ApiError::from_compute("Error fetching top 10 vendors"))?;

    state
        .cache
        .insert(cache_key, CachedData::TopVendors(vendors.clone()))
        .await;
    Ok(Json(vendors))
}

/// Line item spend per ledger category
#[utoipa::path(
    get,
    path = "/api/category-spend",
    tag = "dashboard",
    responses(
        (status = 200, description = "Spend per category, highest first", body = Vec<CategorySpend>),
        (status = 500, description = "Query failed", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category_spend(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategorySpend>>, ApiError> {
    let cache_key = "category-spend".to_string();
    if let Some(CachedData::CategorySpend(spend)) = state.cache.get(&cache_key).await {
        trace!("Serving category spend from cache");
        return Ok(Json(spend));
    }

    let spend = state
        .repo
        .category_spend()
        .await
        .map_err(ApiError::from_compute("Error fetching category spend"))?;

    state
        .cache
        .insert(cache_key, CachedData::CategorySpend(spend.clone()))
        .await;
    Ok(Json(spend))
}

/// Expected payments per due date
#[utoipa::path(
    get,
    path = "/api/cash-outflow",
    tag = "dashboard",
    responses(
        (status = 200, description = "Invoice totals per payment due day", body = Vec<CashOutflow>),
        (status = 500, description = "Query failed", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_cash_outflow(
    State(state): State<AppState>,
) -> Result<Json<Vec<CashOutflow>>, ApiError> {
    let cache_key = "cash-outflow".to_string();
    if let Some(CachedData::CashOutflow(outflow)) = state.cache.get(&cache_key).await {
        trace!("Serving cash outflow from cache");
        return Ok(Json(outflow));
    }

    let outflow = state
        .repo
        .cash_outflow()
        .await
        .map_err(ApiError::from_compute("Error fetching cash outflow"))?;

    state
        .cache
        .insert(cache_key, CachedData::CashOutflow(outflow.clone()))
        .await;
    Ok(Json(outflow))
}
