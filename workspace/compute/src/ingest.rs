//! Batch ingestion of extracted invoice documents.
//!
//! The extraction pipeline emits one JSON object per document in which every
//! leaf is wrapped as `{"value": ...}`. Vendors, customers and categories are
//! de-duplicated by natural key (connect-or-create); each document is written
//! in its own transaction so a broken document never leaves partial rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::entities::{category, customer, invoice, line_item, payment, vendor};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{ComputeError, Result};

pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// A leaf wrapped by the extraction pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Wrapped<T> {
    #[serde(default = "Option::default")]
    pub value: Option<T>,
}

type Field = Option<Wrapped<Value>>;

#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    #[serde(rename = "_id", default)]
    pub id: Value,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<Value>,
    #[serde(rename = "extractedData", default)]
    pub extracted_data: Option<ExtractedData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedData {
    #[serde(rename = "llmData", default)]
    pub llm_data: Option<LlmData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmData {
    pub invoice: Option<Wrapped<InvoiceFields>>,
    pub vendor: Option<Wrapped<VendorFields>>,
    pub customer: Option<Wrapped<CustomerFields>>,
    pub payment: Option<Wrapped<PaymentFields>>,
    pub summary: Option<Wrapped<SummaryFields>>,
    pub line_items: Option<Wrapped<LineItemsFields>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceFields {
    pub invoice_id: Field,
    pub invoice_date: Field,
    pub delivery_date: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorFields {
    pub vendor_name: Field,
    pub vendor_address: Field,
    pub vendor_tax_id: Field,
    pub vendor_party_number: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerFields {
    pub customer_name: Field,
    pub customer_address: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentFields {
    pub due_date: Field,
    pub payment_terms: Field,
    pub bank_account_number: Field,
    pub discounted_total: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryFields {
    pub document_type: Field,
    pub sub_total: Field,
    pub total_tax: Field,
    pub invoice_total: Field,
    pub currency_symbol: Field,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LineItemsFields {
    pub items: Option<Wrapped<Vec<LineItemFields>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LineItemFields {
    pub description: Field,
    pub quantity: Field,
    #[serde(rename = "unitPrice")]
    pub unit_price: Field,
    #[serde(rename = "totalPrice")]
    pub total_price: Field,
    /// Ledger account code, delivered either as string or number
    #[serde(rename = "Sachkonto")]
    pub sachkonto: Field,
    #[serde(rename = "BUSchluessel")]
    pub bu_schluessel: Field,
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub created: usize,
    /// Documents without invoice number, date or total
    pub skipped: usize,
    /// Documents whose write failed and was rolled back
    pub failed: usize,
}

fn leaf(field: &Field) -> Option<&Value> {
    field
        .as_ref()
        .and_then(|wrapped| wrapped.value.as_ref())
        .filter(|value| !value.is_null())
}

/// Renders a string or number leaf as text; empty strings count as missing.
fn text(field: &Field) -> Option<String> {
    match leaf(field)? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn decimal(field: &Field) -> Option<Decimal> {
    match leaf(field)? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Accepts RFC 3339 timestamps, naive date-times and plain dates (taken as UTC midnight).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
}

fn instant(field: &Field) -> Option<DateTime<Utc>> {
    text(field).as_deref().and_then(parse_instant)
}

impl RawDocument {
    /// Document id as text; exports sometimes wrap it as `{"$oid": ...}`.
    pub fn document_id(&self) -> Option<String> {
        match &self.id {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        match self.created_at.as_ref()? {
            Value::String(s) => parse_instant(s),
            Value::Object(map) => map.get("$date").and_then(Value::as_str).and_then(parse_instant),
            _ => None,
        }
    }

    fn llm(&self) -> Option<&LlmData> {
        self.extracted_data.as_ref()?.llm_data.as_ref()
    }
}

/// Fields an invoice row cannot exist without.
struct Essentials {
    invoice_number: String,
    invoice_date: DateTime<Utc>,
    invoice_total: Decimal,
}

fn essentials(llm: &LlmData) -> Option<Essentials> {
    let invoice = llm.invoice.as_ref()?.value.as_ref()?;
    let summary = llm.summary.as_ref()?.value.as_ref()?;
    Some(Essentials {
        invoice_number: text(&invoice.invoice_id)?,
        invoice_date: instant(&invoice.invoice_date)?,
        invoice_total: decimal(&summary.invoice_total)?,
    })
}

/// Deletes all invoice data (but not the chat history).
#[instrument(skip(db))]
pub async fn clear_invoice_data(db: &DatabaseConnection) -> Result<()> {
    info!("Clearing existing invoice data");
    line_item::Entity::delete_many().exec(db).await?;
    payment::Entity::delete_many().exec(db).await?;
    invoice::Entity::delete_many().exec(db).await?;
    vendor::Entity::delete_many().exec(db).await?;
    customer::Entity::delete_many().exec(db).await?;
    category::Entity::delete_many().exec(db).await?;
    Ok(())
}

/// Ingests `documents`, one transaction per document.
#[instrument(skip(db, documents), fields(documents = documents.len()))]
pub async fn ingest_documents(
    db: &DatabaseConnection,
    documents: &[RawDocument],
) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for doc in documents {
        let id = doc.document_id().unwrap_or_default();
        let Some((llm, essentials)) = doc.llm().and_then(|llm| Some((llm, essentials(llm)?))) else {
            warn!(
                document = %id,
                "Skipping document with missing invoice number, invoice date or invoice total"
            );
            summary.skipped += 1;
            continue;
        };

        let txn = db.begin().await?;
        match insert_document(&txn, doc, llm, essentials).await {
            Ok(invoice_id) => {
                txn.commit().await?;
                debug!(document = %id, invoice_id, "Ingested document");
                summary.created += 1;
            }
            Err(e) => {
                txn.rollback().await?;
                warn!(document = %id, error = %e, "Failed to ingest document");
                summary.failed += 1;
            }
        }
    }

    info!(
        created = summary.created,
        skipped = summary.skipped,
        failed = summary.failed,
        "Ingestion finished"
    );
    Ok(summary)
}

async fn insert_document<C: ConnectionTrait>(
    db: &C,
    doc: &RawDocument,
    llm: &LlmData,
    essentials: Essentials,
) -> Result<i32> {
    let vendor_fields = llm.vendor.as_ref().and_then(|w| w.value.clone()).unwrap_or_default();
    let customer_fields = llm.customer.as_ref().and_then(|w| w.value.clone()).unwrap_or_default();
    let summary_fields = llm.summary.as_ref().and_then(|w| w.value.clone()).unwrap_or_default();
    let invoice_fields = llm.invoice.as_ref().and_then(|w| w.value.clone()).unwrap_or_default();

    let vendor_id = connect_or_create_vendor(db, &vendor_fields).await?;
    let customer_id = connect_or_create_customer(db, &customer_fields).await?;

    let created_invoice = invoice::ActiveModel {
        document_id: Set(doc.document_id()),
        invoice_number: Set(essentials.invoice_number),
        invoice_date: Set(essentials.invoice_date),
        delivery_date: Set(instant(&invoice_fields.delivery_date)),
        sub_total: Set(decimal(&summary_fields.sub_total)),
        total_tax: Set(decimal(&summary_fields.total_tax)),
        invoice_total: Set(essentials.invoice_total),
        currency_symbol: Set(text(&summary_fields.currency_symbol)),
        document_type: Set(text(&summary_fields.document_type)),
        status: Set(doc.status.clone()),
        created_at: Set(doc.created_at().unwrap_or_else(Utc::now)),
        vendor_id: Set(Some(vendor_id)),
        customer_id: Set(Some(customer_id)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    trace!(invoice_id = created_invoice.id, "Inserted invoice");

    if let Some(fields) = llm.payment.as_ref().and_then(|w| w.value.as_ref()) {
        payment::ActiveModel {
            invoice_id: Set(created_invoice.id),
            due_date: Set(instant(&fields.due_date)),
            payment_terms: Set(text(&fields.payment_terms)),
            bank_account_number: Set(text(&fields.bank_account_number)),
            discounted_total: Set(decimal(&fields.discounted_total)),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    let items = llm
        .line_items
        .as_ref()
        .and_then(|w| w.value.as_ref())
        .and_then(|fields| fields.items.as_ref())
        .and_then(|w| w.value.as_ref());
    for item in items.into_iter().flatten() {
        let code = text(&item.sachkonto).unwrap_or_else(|| common::UNKNOWN_CATEGORY.to_string());
        let category_id = connect_or_create_category(db, &code).await?;
        let total_price = decimal(&item.total_price).ok_or_else(|| {
            ComputeError::Ingest(format!(
                "line item of invoice {} has no total price",
                created_invoice.invoice_number
            ))
        })?;

        line_item::ActiveModel {
            invoice_id: Set(created_invoice.id),
            description: Set(text(&item.description)),
            quantity: Set(decimal(&item.quantity)),
            unit_price: Set(decimal(&item.unit_price)),
            total_price: Set(total_price),
            bu_key: Set(text(&item.bu_schluessel)),
            category_id: Set(Some(category_id)),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(created_invoice.id)
}

async fn connect_or_create_vendor<C: ConnectionTrait>(db: &C, fields: &VendorFields) -> Result<i32> {
    let name = text(&fields.vendor_name).unwrap_or_else(|| common::UNKNOWN_VENDOR.to_string());
    if let Some(existing) = vendor::Model::find_by_name(db, &name).await? {
        return Ok(existing.id);
    }
    let created = vendor::ActiveModel {
        name: Set(name),
        address: Set(text(&fields.vendor_address)),
        tax_id: Set(text(&fields.vendor_tax_id)),
        party_number: Set(text(&fields.vendor_party_number)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    trace!(vendor_id = created.id, name = %created.name, "Created vendor");
    Ok(created.id)
}

async fn connect_or_create_customer<C: ConnectionTrait>(
    db: &C,
    fields: &CustomerFields,
) -> Result<i32> {
    let name = text(&fields.customer_name).unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
    if let Some(existing) = customer::Model::find_by_name(db, &name).await? {
        return Ok(existing.id);
    }
    let created = customer::ActiveModel {
        name: Set(name),
        address: Set(text(&fields.customer_address)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created.id)
}

async fn connect_or_create_category<C: ConnectionTrait>(db: &C, code: &str) -> Result<i32> {
    if let Some(existing) = category::Model::find_by_code(db, code).await? {
        return Ok(existing.id);
    }
    let created = category::ActiveModel {
        code: Set(code.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created.id)
}
