use chrono::{DateTime, Utc};
use common::{
    CashOutflow, CategorySpend, ChatChunk, ChatHistoryDto, ChatRequest, CustomerDto, DailyStat,
    ExportRequest, InvoiceDto, InvoiceSortKey, InvoiceTrend, PaymentDto, SortOrder, StatsResponse,
    VendorDto, VendorSpend,
};
use compute::DashboardRepository;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Invoice store
    pub repo: Arc<dyn DashboardRepository>,
    /// Cache for aggregate responses, keyed by route name
    pub cache: Cache<String, CachedData>,
    /// Client for the AI service
    pub http: reqwest::Client,
    pub config: Arc<AppConfig>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Stats(StatsResponse),
    InvoiceTrends(Vec<InvoiceTrend>),
    TopVendors(Vec<VendorSpend>),
    CategorySpend(Vec<CategorySpend>),
    CashOutflow(Vec<CashOutflow>),
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::dashboard::get_stats,
        crate::handlers::dashboard::get_invoice_trends,
        crate::handlers::dashboard::get_top_vendors,
        crate::handlers::dashboard::get_category_spend,
        crate::handlers::dashboard::get_cash_outflow,
        crate::handlers::invoices::get_invoices,
        crate::handlers::history::get_history,
        crate::handlers::chat::chat_with_data,
        crate::handlers::export::export_csv,
        crate::handlers::export::export_excel,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            StatsResponse,
            DailyStat,
            InvoiceTrend,
            VendorSpend,
            CategorySpend,
            CashOutflow,
            InvoiceDto,
            VendorDto,
            CustomerDto,
            PaymentDto,
            InvoiceSortKey,
            SortOrder,
            ChatRequest,
            ChatChunk,
            ChatHistoryDto,
            ExportRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Aggregated spend statistics"),
        (name = "invoices", description = "Invoice search"),
        (name = "chat", description = "Natural-language questions over the invoice data"),
        (name = "export", description = "Query result export"),
    ),
    info(
        title = "Invoice Dashboard API",
        description = "Analytics over extracted invoice documents",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
