//! Common transport-layer types shared between backend and frontend.
//! These structs mirror the backend handlers' request/response payloads
//! so the frontend can deserialize API responses without duplicating shapes.
//! Field names are camelCase on the wire.

mod chat;
pub mod converters;
mod dashboard;
mod invoices;
pub mod ndjson;

pub use chat::{ChatChunk, ChatHistoryDto, ChatRequest, ExportRequest};
pub use dashboard::{CashOutflow, CategorySpend, DailyStat, InvoiceTrend, StatsResponse, VendorSpend};
pub use invoices::{
    CustomerDto, InvoiceDto, InvoiceSortKey, PaymentDto, SortOrder, UnknownSortValue, VendorDto,
};

/// Vendor name reported when an aggregate references a vendor that does not resolve.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

/// Category code reported when a line item has no resolvable category.
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";
