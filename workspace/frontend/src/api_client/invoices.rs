use crate::api_client;
use common::{InvoiceDto, InvoiceSortKey, SortOrder};

/// Search text and ordering of the invoice table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvoiceFilter {
    pub search: String,
    pub sort_by: Option<InvoiceSortKey>,
    pub sort_order: SortOrder,
}

pub async fn search_invoices(filter: &InvoiceFilter) -> Result<Vec<InvoiceDto>, String> {
    log::trace!("Fetching invoices with {:?}", filter);
    let sort_by = filter.sort_by.map(|key| key.as_str());
    let sort_order = sort_by.map(|_| filter.sort_order.as_str());
    let query = api_client::query_string(&[
        ("search", Some(filter.search.trim())),
        ("sortBy", sort_by),
        ("sortOrder", sort_order),
    ]);

    let result = api_client::get::<Vec<InvoiceDto>>(&format!("/invoices{}", query)).await;
    match &result {
        Ok(invoices) => log::info!("Loaded {} invoices", invoices.len()),
        Err(e) => log::error!("Failed to fetch invoices: {}", e),
    }
    result
}
