use axum::{
    extract::{Query, State},
    response::Json,
};
use common::InvoiceDto;
use compute::InvoiceQuery;
use serde::Deserialize;
use tracing::{debug, instrument};
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::schemas::AppState;

/// Query string of the invoice list
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct InvoiceListParams {
    /// Case-insensitive substring of the invoice number or vendor name
    pub search: Option<String>,
    /// One of invoiceNumber, invoiceDate, deliveryDate, invoiceTotal, subTotal,
    /// totalTax, status, currencySymbol, documentType, createdAt
    pub sort_by: Option<String>,
    /// asc or desc
    pub sort_order: Option<String>,
}

/// Search and sort invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "invoices",
    params(InvoiceListParams),
    responses(
        (status = 200, description = "Matching invoices with vendor, customer and payment", body = Vec<InvoiceDto>),
        (status = 400, description = "Unknown sort key or direction", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Query failed", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_invoices(
    Query(params): Query<InvoiceListParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceDto>>, ApiError> {
    let query = InvoiceQuery::parse(
        params.search.as_deref(),
        params.sort_by.as_deref(),
        params.sort_order.as_deref(),
    )
    .map_err(|e| ApiError::Validation(e.to_string()))?;

    let invoices = state
        .repo
        .search_invoices(&query)
        .await
        .map_err(ApiError::from_compute("Error fetching invoices"))?;
    debug!("Returning {} invoices", invoices.len());

    Ok(Json(invoices))
}
