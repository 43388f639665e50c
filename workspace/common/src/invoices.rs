use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorDto {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub party_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    pub id: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub payment_terms: Option<String>,
    pub bank_account_number: Option<String>,
    pub discounted_total: Option<f64>,
}

/// An invoice with its vendor, customer and payment embedded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
    pub id: i32,
    pub document_id: Option<String>,
    pub invoice_number: String,
    pub invoice_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub sub_total: Option<f64>,
    pub total_tax: Option<f64>,
    pub invoice_total: f64,
    pub currency_symbol: Option<String>,
    pub document_type: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub vendor: Option<VendorDto>,
    pub customer: Option<CustomerDto>,
    pub payment: Option<PaymentDto>,
}

/// Error returned when a `sortBy` or `sortOrder` value is not one of the permitted ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortValue(pub String);

impl fmt::Display for UnknownSortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported sort value '{}'", self.0)
    }
}

impl std::error::Error for UnknownSortValue {}

/// Columns the invoice list may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum InvoiceSortKey {
    InvoiceNumber,
    InvoiceDate,
    DeliveryDate,
    InvoiceTotal,
    SubTotal,
    TotalTax,
    Status,
    CurrencySymbol,
    DocumentType,
    CreatedAt,
}

impl InvoiceSortKey {
    pub const ALL: [InvoiceSortKey; 10] = [
        InvoiceSortKey::InvoiceNumber,
        InvoiceSortKey::InvoiceDate,
        InvoiceSortKey::DeliveryDate,
        InvoiceSortKey::InvoiceTotal,
        InvoiceSortKey::SubTotal,
        InvoiceSortKey::TotalTax,
        InvoiceSortKey::Status,
        InvoiceSortKey::CurrencySymbol,
        InvoiceSortKey::DocumentType,
        InvoiceSortKey::CreatedAt,
    ];

    /// The query-string spelling of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceSortKey::InvoiceNumber => "invoiceNumber",
            InvoiceSortKey::InvoiceDate => "invoiceDate",
            InvoiceSortKey::DeliveryDate => "deliveryDate",
            InvoiceSortKey::InvoiceTotal => "invoiceTotal",
            InvoiceSortKey::SubTotal => "subTotal",
            InvoiceSortKey::TotalTax => "totalTax",
            InvoiceSortKey::Status => "status",
            InvoiceSortKey::CurrencySymbol => "currencySymbol",
            InvoiceSortKey::DocumentType => "documentType",
            InvoiceSortKey::CreatedAt => "createdAt",
        }
    }
}

impl FromStr for InvoiceSortKey {
    type Err = UnknownSortValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceSortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSortValue(s.to_string()))
    }
}

impl fmt::Display for InvoiceSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(UnknownSortValue(s.to_string())),
        }
    }
}
