//! Query, aggregation, export and ingestion logic behind the invoice dashboard.

pub mod error;
pub mod export;
pub mod ingest;
pub mod invoices;
pub mod repository;
pub mod sql_guard;
pub mod stats;

pub use error::{ComputeError, Result};
pub use export::ExportFormat;
pub use ingest::{IngestSummary, RawDocument, clear_invoice_data, ingest_documents};
pub use invoices::InvoiceQuery;
pub use repository::{DashboardRepository, SeaOrmRepository};
pub use stats::dashboard_stats;
