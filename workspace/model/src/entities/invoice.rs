use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{customer, line_item, payment, vendor};

/// An extracted invoice document.
///
/// `invoice_total` is the figure every spend aggregate is computed from.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Identifier of the uploaded source document.
    pub document_id: Option<String>,
    pub invoice_number: String,
    pub invoice_date: DateTimeUtc,
    pub delivery_date: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub sub_total: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub total_tax: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub invoice_total: Decimal,
    pub currency_symbol: Option<String>,
    pub document_type: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTimeUtc,
    pub vendor_id: Option<i32>,
    pub customer_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "vendor::Entity",
        from = "Column::VendorId",
        to = "vendor::Column::Id",
        on_delete = "SetNull"
    )]
    Vendor,
    #[sea_orm(
        belongs_to = "customer::Entity",
        from = "Column::CustomerId",
        to = "customer::Column::Id",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(has_one = "payment::Entity")]
    Payment,
    #[sea_orm(has_many = "line_item::Entity")]
    LineItem,
}

impl Related<vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl Related<line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
