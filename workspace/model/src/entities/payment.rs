use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::invoice;

/// Payment terms attached to exactly one invoice.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub invoice_id: i32,
    /// Payments without a due date are left out of cash outflow forecasts.
    pub due_date: Option<DateTimeUtc>,
    pub payment_terms: Option<String>,
    pub bank_account_number: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub discounted_total: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "invoice::Entity",
        from = "Column::InvoiceId",
        to = "invoice::Column::Id",
        on_delete = "Cascade"
    )]
    Invoice,
}

impl Related<invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
