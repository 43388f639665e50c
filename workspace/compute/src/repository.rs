//! Data access for the dashboard.
//!
//! Handlers never talk to the ORM directly: they receive a
//! [`DashboardRepository`] through the application state. The SeaORM
//! implementation owns the connection pool and is opened once at start-up and
//! closed explicitly on shutdown.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::converters::{decimal_to_f64, opt_decimal_to_f64};
use common::{
    CashOutflow, CategorySpend, ChatHistoryDto, CustomerDto, InvoiceDto, InvoiceSortKey,
    InvoiceTrend, PaymentDto, SortOrder, UNKNOWN_CATEGORY, UNKNOWN_VENDOR, VendorDto, VendorSpend,
};
use model::entities::{category, chat_history, customer, invoice, line_item, payment, vendor};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseBackend,
    DatabaseConnection, EntityTrait, FromQueryResult, JsonValue, Order, QueryFilter, QueryOrder,
    QuerySelect, Set, Statement, TransactionTrait,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument, trace};

use crate::error::Result;
use crate::invoices::InvoiceQuery;
use crate::sql_guard::ensure_read_only;
use crate::stats::{DateWindow, SpendTotals};

/// Everything the HTTP layer reads from, or appends to, the invoice store.
#[async_trait]
pub trait DashboardRepository: Send + Sync + std::fmt::Debug {
    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<()>;

    /// Sum and count of invoice totals, optionally restricted to invoices dated inside `window`.
    async fn spend_totals(&self, window: Option<DateWindow>) -> Result<SpendTotals>;

    /// Date and total of every invoice dated inside `window`.
    async fn invoice_amounts(&self, window: DateWindow) -> Result<Vec<(DateTime<Utc>, Decimal)>>;

    /// Invoice totals grouped by invoice date, oldest first.
    async fn invoice_trends(&self) -> Result<Vec<InvoiceTrend>>;

    /// Vendors ranked by summed invoice totals, highest first.
    async fn top_vendors(&self, limit: u64) -> Result<Vec<VendorSpend>>;

    /// Line item totals grouped by category, highest first.
    async fn category_spend(&self) -> Result<Vec<CategorySpend>>;

    /// Invoice totals of payments with a due date, bucketed per due day.
    async fn cash_outflow(&self) -> Result<Vec<CashOutflow>>;

    async fn search_invoices(&self, query: &InvoiceQuery) -> Result<Vec<InvoiceDto>>;

    /// Chat questions, newest first.
    async fn chat_history(&self) -> Result<Vec<ChatHistoryDto>>;

    /// Appends a question and the SQL generated for it.
    async fn record_chat(&self, question: &str, sql: &str) -> Result<ChatHistoryDto>;

    /// Runs a caller-supplied statement after checking it is a single read-only query.
    /// Every row is returned as a JSON object keyed by column name.
    async fn run_read_only(&self, sql: &str) -> Result<Vec<JsonValue>>;

    /// Releases the underlying connections.
    async fn close(&self) -> Result<()>;
}

/// SeaORM-backed repository.
#[derive(Debug, Clone)]
pub struct SeaOrmRepository {
    db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    total: Option<Decimal>,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct TrendRow {
    invoice_date: DateTime<Utc>,
    total: Option<Decimal>,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct VendorTotalRow {
    vendor_id: Option<i32>,
    total: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
struct CategoryTotalRow {
    category_id: Option<i32>,
    total: Option<Decimal>,
}

impl SeaOrmRepository {
    /// Opens a connection pool for `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        trace!("Opening database connection pool");
        let db = Database::connect(database_url).await?;
        info!("Connected to database");
        Ok(Self { db })
    }

    /// Wraps an already open connection, e.g. one the migrator has just used.
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Executes `statement` in a transaction the database itself treats as read-only,
    /// then rolls it back. Catches side effects the keyword scan cannot see.
    pub(crate) async fn query_in_read_only_transaction(
        &self,
        statement: &str,
    ) -> Result<Vec<JsonValue>> {
        let backend = self.db.get_database_backend();
        let txn = self.db.begin().await?;
        match backend {
            DatabaseBackend::Postgres => {
                txn.execute_unprepared("SET TRANSACTION READ ONLY").await?;
            }
            DatabaseBackend::Sqlite => {
                txn.execute_unprepared("PRAGMA query_only = ON").await?;
            }
            _ => {}
        }

        let rows = JsonValue::find_by_statement(Statement::from_string(backend, statement))
            .all(&txn)
            .await;

        // query_only is connection state and outlives the transaction
        if backend == DatabaseBackend::Sqlite {
            txn.execute_unprepared("PRAGMA query_only = OFF").await?;
        }
        txn.rollback().await?;
        Ok(rows?)
    }
}

/// Unicode-aware, case-insensitive substring match on invoice number or vendor name.
/// Done in Rust because SQLite's `lower()` only folds ASCII.
fn matches_search(needle: &str, invoice_number: &str, vendor_name: Option<&str>) -> bool {
    invoice_number.to_lowercase().contains(needle)
        || vendor_name.is_some_and(|name| name.to_lowercase().contains(needle))
}

fn sort_column(key: InvoiceSortKey) -> invoice::Column {
    match key {
        InvoiceSortKey::InvoiceNumber => invoice::Column::InvoiceNumber,
        InvoiceSortKey::InvoiceDate => invoice::Column::InvoiceDate,
        InvoiceSortKey::DeliveryDate => invoice::Column::DeliveryDate,
        InvoiceSortKey::InvoiceTotal => invoice::Column::InvoiceTotal,
        InvoiceSortKey::SubTotal => invoice::Column::SubTotal,
        InvoiceSortKey::TotalTax => invoice::Column::TotalTax,
        InvoiceSortKey::Status => invoice::Column::Status,
        InvoiceSortKey::CurrencySymbol => invoice::Column::CurrencySymbol,
        InvoiceSortKey::DocumentType => invoice::Column::DocumentType,
        InvoiceSortKey::CreatedAt => invoice::Column::CreatedAt,
    }
}

fn order_of(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

fn vendor_dto(model: vendor::Model) -> VendorDto {
    VendorDto {
        id: model.id,
        name: model.name,
        address: model.address,
        tax_id: model.tax_id,
        party_number: model.party_number,
    }
}

fn customer_dto(model: customer::Model) -> CustomerDto {
    CustomerDto {
        id: model.id,
        name: model.name,
        address: model.address,
    }
}

fn payment_dto(model: payment::Model) -> PaymentDto {
    PaymentDto {
        id: model.id,
        due_date: model.due_date,
        payment_terms: model.payment_terms,
        bank_account_number: model.bank_account_number,
        discounted_total: model.discounted_total.map(decimal_to_f64),
    }
}

fn chat_history_dto(model: chat_history::Model) -> ChatHistoryDto {
    ChatHistoryDto {
        id: model.id,
        question: model.question,
        sql: model.sql,
        created_at: model.created_at,
    }
}

#[async_trait]
impl DashboardRepository for SeaOrmRepository {
    async fn ping(&self) -> Result<()> {
        Ok(self.db.ping().await?)
    }

    #[instrument(skip(self))]
    async fn spend_totals(&self, window: Option<DateWindow>) -> Result<SpendTotals> {
        let mut select = invoice::Entity::find()
            .select_only()
            .column_as(invoice::Column::InvoiceTotal.sum(), "total")
            .column_as(invoice::Column::Id.count(), "count");
        if let Some(window) = window {
            select = select
                .filter(invoice::Column::InvoiceDate.gte(window.start))
                .filter(invoice::Column::InvoiceDate.lt(window.end));
        }

        let row = select.into_model::<TotalsRow>().one(&self.db).await?;
        let totals = row
            .map(|row| SpendTotals {
                total: row.total.unwrap_or_default(),
                count: row.count,
            })
            .unwrap_or_default();
        trace!(?totals, "Spend totals");
        Ok(totals)
    }

    #[instrument(skip(self))]
    async fn invoice_amounts(&self, window: DateWindow) -> Result<Vec<(DateTime<Utc>, Decimal)>> {
        let rows = invoice::Entity::find()
            .select_only()
            .column(invoice::Column::InvoiceDate)
            .column(invoice::Column::InvoiceTotal)
            .filter(invoice::Column::InvoiceDate.gte(window.start))
            .filter(invoice::Column::InvoiceDate.lt(window.end))
            .into_tuple::<(DateTime<Utc>, Decimal)>()
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn invoice_trends(&self) -> Result<Vec<InvoiceTrend>> {
        let rows = invoice::Entity::find()
            .select_only()
            .column(invoice::Column::InvoiceDate)
            .column_as(invoice::Column::InvoiceTotal.sum(), "total")
            .column_as(invoice::Column::Id.count(), "count")
            .group_by(invoice::Column::InvoiceDate)
            .order_by_asc(invoice::Column::InvoiceDate)
            .into_model::<TrendRow>()
            .all(&self.db)
            .await?;

        debug!("Loaded {} trend points", rows.len());
        Ok(rows
            .into_iter()
            .map(|row| InvoiceTrend {
                date: row.invoice_date,
                total_spend: opt_decimal_to_f64(row.total),
                invoice_count: row.count,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn top_vendors(&self, limit: u64) -> Result<Vec<VendorSpend>> {
        let totals = invoice::Entity::find()
            .select_only()
            .column(invoice::Column::VendorId)
            .column_as(invoice::Column::InvoiceTotal.sum(), "total")
            .group_by(invoice::Column::VendorId)
            .order_by_desc(invoice::Column::InvoiceTotal.sum())
            .limit(limit)
            .into_model::<VendorTotalRow>()
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = totals.iter().filter_map(|row| row.vendor_id).collect();
        let names: HashMap<i32, String> = vendor::Entity::find()
            .filter(vendor::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|v| (v.id, v.name))
            .collect();

        Ok(totals
            .into_iter()
            .map(|row| VendorSpend {
                name: row
                    .vendor_id
                    .and_then(|id| names.get(&id).cloned())
                    .unwrap_or_else(|| UNKNOWN_VENDOR.to_string()),
                total_spend: opt_decimal_to_f64(row.total),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn category_spend(&self) -> Result<Vec<CategorySpend>> {
        let totals = line_item::Entity::find()
            .select_only()
            .column(line_item::Column::CategoryId)
            .column_as(line_item::Column::TotalPrice.sum(), "total")
            .group_by(line_item::Column::CategoryId)
            .order_by_desc(line_item::Column::TotalPrice.sum())
            .into_model::<CategoryTotalRow>()
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = totals.iter().filter_map(|row| row.category_id).collect();
        let codes: HashMap<i32, String> = category::Entity::find()
            .filter(category::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.code))
            .collect();

        Ok(totals
            .into_iter()
            .map(|row| CategorySpend {
                category: row
                    .category_id
                    .and_then(|id| codes.get(&id).cloned())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
                spend: opt_decimal_to_f64(row.total),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn cash_outflow(&self) -> Result<Vec<CashOutflow>> {
        let payments = payment::Entity::find()
            .filter(payment::Column::DueDate.is_not_null())
            .find_also_related(invoice::Entity)
            .all(&self.db)
            .await?;

        let mut buckets: BTreeMap<chrono::NaiveDate, Decimal> = BTreeMap::new();
        for (payment, invoice) in payments {
            let (Some(due), Some(invoice)) = (payment.due_date, invoice) else {
                continue;
            };
            *buckets.entry(due.date_naive()).or_default() += invoice.invoice_total;
        }

        Ok(buckets
            .into_iter()
            .map(|(day, amount)| CashOutflow {
                date: day.format("%Y-%m-%d").to_string(),
                amount: decimal_to_f64(amount),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn search_invoices(&self, query: &InvoiceQuery) -> Result<Vec<InvoiceDto>> {
        let mut select = invoice::Entity::find().find_also_related(vendor::Entity);
        select = match query.sort {
            Some((key, order)) => select.order_by(sort_column(key), order_of(order)),
            None => select.order_by_desc(invoice::Column::InvoiceDate),
        };
        let mut rows = select
            .order_by_asc(invoice::Column::Id)
            .all(&self.db)
            .await?;

        if let Some(term) = query.search_term() {
            let needle = term.to_lowercase();
            rows.retain(|(inv, vendor)| {
                matches_search(&needle, &inv.invoice_number, vendor.as_ref().map(|v| v.name.as_str()))
            });
        }
        debug!("Invoice search matched {} rows", rows.len());

        let invoice_ids: Vec<i32> = rows.iter().map(|(inv, _)| inv.id).collect();
        let customer_ids: Vec<i32> = rows.iter().filter_map(|(inv, _)| inv.customer_id).collect();

        let customers: HashMap<i32, customer::Model> = customer::Entity::find()
            .filter(customer::Column::Id.is_in(customer_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let mut payments: HashMap<i32, payment::Model> = payment::Entity::find()
            .filter(payment::Column::InvoiceId.is_in(invoice_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.invoice_id, p))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(inv, vendor)| {
                let customer = inv
                    .customer_id
                    .and_then(|id| customers.get(&id).cloned());
                InvoiceDto {
                    payment: payments.remove(&inv.id).map(payment_dto),
                    customer: customer.map(customer_dto),
                    vendor: vendor.map(vendor_dto),
                    id: inv.id,
                    document_id: inv.document_id,
                    invoice_number: inv.invoice_number,
                    invoice_date: inv.invoice_date,
                    delivery_date: inv.delivery_date,
                    sub_total: inv.sub_total.map(decimal_to_f64),
                    total_tax: inv.total_tax.map(decimal_to_f64),
                    invoice_total: decimal_to_f64(inv.invoice_total),
                    currency_symbol: inv.currency_symbol,
                    document_type: inv.document_type,
                    status: inv.status,
                    created_at: inv.created_at,
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn chat_history(&self) -> Result<Vec<ChatHistoryDto>> {
        let rows = chat_history::Entity::find()
            .order_by_desc(chat_history::Column::CreatedAt)
            .order_by_desc(chat_history::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(chat_history_dto).collect())
    }

    #[instrument(skip(self, sql))]
    async fn record_chat(&self, question: &str, sql: &str) -> Result<ChatHistoryDto> {
        let saved = chat_history::ActiveModel {
            question: Set(question.to_string()),
            sql: Set(sql.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        debug!(id = saved.id, "Recorded chat history entry");
        Ok(chat_history_dto(saved))
    }

    #[instrument(skip(self))]
    async fn run_read_only(&self, sql: &str) -> Result<Vec<JsonValue>> {
        let statement = ensure_read_only(sql)?;
        let rows = self.query_in_read_only_transaction(statement).await?;
        debug!("Read-only query returned {} rows", rows.len());
        Ok(rows)
    }

    async fn close(&self) -> Result<()> {
        info!("Closing database connection pool");
        Ok(self.db.close_by_ref().await?)
    }
}
