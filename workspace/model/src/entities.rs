//! Root of all SeaORM entity modules.
//! The schema describes extracted invoice documents together with the parties,
//! payments and line items they reference, plus the chat question log.

pub mod category;
pub mod chat_history;
pub mod customer;
pub mod invoice;
pub mod line_item;
pub mod payment;
pub mod vendor;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::category::Entity as Category;
    pub use super::chat_history::Entity as ChatHistory;
    pub use super::customer::Entity as Customer;
    pub use super::invoice::Entity as Invoice;
    pub use super::line_item::Entity as LineItem;
    pub use super::payment::Entity as Payment;
    pub use super::vendor::Entity as Vendor;
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let issued = Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap();

        let acme = vendor::ActiveModel {
            name: Set("ACME GmbH".to_string()),
            tax_id: Set(Some("DE123456789".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let buyer = customer::ActiveModel {
            name: Set("Flowbit AG".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let office = category::ActiveModel {
            code: Set("4930".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let inv = invoice::ActiveModel {
            document_id: Set(Some("doc-1".to_string())),
            invoice_number: Set("INV-001".to_string()),
            invoice_date: Set(issued),
            invoice_total: Set(Decimal::new(11900, 2)),
            sub_total: Set(Some(Decimal::new(10000, 2))),
            total_tax: Set(Some(Decimal::new(1900, 2))),
            currency_symbol: Set(Some("EUR".to_string())),
            created_at: Set(issued),
            vendor_id: Set(Some(acme.id)),
            customer_id: Set(Some(buyer.id)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        payment::ActiveModel {
            invoice_id: Set(inv.id),
            due_date: Set(Some(Utc.with_ymd_and_hms(2025, 4, 14, 0, 0, 0).unwrap())),
            payment_terms: Set(Some("30 days net".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        line_item::ActiveModel {
            invoice_id: Set(inv.id),
            description: Set(Some("Paper".to_string())),
            total_price: Set(Decimal::new(10000, 2)),
            category_id: Set(Some(office.id)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Relations resolve in both directions
        let vendor_of_invoice = inv.find_related(Vendor).one(&db).await?;
        assert_eq!(vendor_of_invoice.map(|v| v.name), Some("ACME GmbH".to_string()));

        let invoices_of_vendor = acme.find_related(Invoice).all(&db).await?;
        assert_eq!(invoices_of_vendor.len(), 1);
        assert_eq!(invoices_of_vendor[0].invoice_total, Decimal::new(11900, 2));

        let pay = inv.find_related(Payment).one(&db).await?;
        assert!(pay.and_then(|p| p.due_date).is_some());

        let items = office.find_related(LineItem).all(&db).await?;
        assert_eq!(items.len(), 1);

        // A second payment for the same invoice violates the one-to-one constraint
        let second_payment = payment::ActiveModel {
            invoice_id: Set(inv.id),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(second_payment.is_err());

        // Deleting the invoice cascades to its payment and line items
        Invoice::delete_by_id(inv.id).exec(&db).await?;
        assert_eq!(Payment::find().all(&db).await?.len(), 0);
        assert_eq!(
            LineItem::find()
                .filter(line_item::Column::InvoiceId.eq(inv.id))
                .all(&db)
                .await?
                .len(),
            0
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_vendor_name_is_unique() -> Result<(), DbErr> {
        let db = setup_db().await?;

        vendor::ActiveModel {
            name: Set("Duplicate".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let again = vendor::ActiveModel {
            name: Set("Duplicate".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(again.is_err());

        let found = vendor::Model::find_by_name(&db, "Duplicate").await?;
        assert!(found.is_some());
        Ok(())
    }
}
