use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create vendors table
        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(pk_auto(Vendors::Id))
                    .col(string(Vendors::Name).unique_key())
                    .col(string_null(Vendors::Address))
                    .col(string_null(Vendors::TaxId))
                    .col(string_null(Vendors::PartyNumber))
                    .to_owned(),
            )
            .await?;

        // Create customers table
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(pk_auto(Customers::Id))
                    .col(string(Customers::Name).unique_key())
                    .col(string_null(Customers::Address))
                    .to_owned(),
            )
            .await?;

        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string(Categories::Code).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create invoices table
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(pk_auto(Invoices::Id))
                    .col(string_null(Invoices::DocumentId))
                    .col(string(Invoices::InvoiceNumber))
                    .col(timestamp_with_time_zone(Invoices::InvoiceDate))
                    .col(timestamp_with_time_zone_null(Invoices::DeliveryDate))
                    .col(decimal_len_null(Invoices::SubTotal, 16, 4))
                    .col(decimal_len_null(Invoices::TotalTax, 16, 4))
                    .col(decimal_len(Invoices::InvoiceTotal, 16, 4))
                    .col(string_null(Invoices::CurrencySymbol))
                    .col(string_null(Invoices::DocumentType))
                    .col(string_null(Invoices::Status))
                    .col(timestamp_with_time_zone(Invoices::CreatedAt))
                    .col(integer_null(Invoices::VendorId))
                    .col(integer_null(Invoices::CustomerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_vendor")
                            .from(Invoices::Table, Invoices::VendorId)
                            .to(Vendors::Table, Vendors::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_customer")
                            .from(Invoices::Table, Invoices::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Aggregations filter and group on these
        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_invoice_date")
                    .table(Invoices::Table)
                    .col(Invoices::InvoiceDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_vendor_id")
                    .table(Invoices::Table)
                    .col(Invoices::VendorId)
                    .to_owned(),
            )
            .await?;

        // Create payments table (one per invoice)
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_auto(Payments::Id))
                    .col(integer(Payments::InvoiceId).unique_key())
                    .col(timestamp_with_time_zone_null(Payments::DueDate))
                    .col(string_null(Payments::PaymentTerms))
                    .col(string_null(Payments::BankAccountNumber))
                    .col(decimal_len_null(Payments::DiscountedTotal, 16, 4))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_invoice")
                            .from(Payments::Table, Payments::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create line_items table
        manager
            .create_table(
                Table::create()
                    .table(LineItems::Table)
                    .if_not_exists()
                    .col(pk_auto(LineItems::Id))
                    .col(integer(LineItems::InvoiceId))
                    .col(string_null(LineItems::Description))
                    .col(decimal_len_null(LineItems::Quantity, 16, 4))
                    .col(decimal_len_null(LineItems::UnitPrice, 16, 4))
                    .col(decimal_len(LineItems::TotalPrice, 16, 4))
                    .col(string_null(LineItems::BuKey))
                    .col(integer_null(LineItems::CategoryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_item_invoice")
                            .from(LineItems::Table, LineItems::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_item_category")
                            .from(LineItems::Table, LineItems::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(LineItems::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Vendors {
    Table,
    Id,
    Name,
    Address,
    TaxId,
    PartyNumber,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Name,
    Address,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Code,
}

#[derive(DeriveIden)]
enum Invoices {
    Table,
    Id,
    DocumentId,
    InvoiceNumber,
    InvoiceDate,
    DeliveryDate,
    SubTotal,
    TotalTax,
    InvoiceTotal,
    CurrencySymbol,
    DocumentType,
    Status,
    CreatedAt,
    VendorId,
    CustomerId,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    InvoiceId,
    DueDate,
    PaymentTerms,
    BankAccountNumber,
    DiscountedTotal,
}

#[derive(DeriveIden)]
enum LineItems {
    Table,
    Id,
    InvoiceId,
    Description,
    Quantity,
    UnitPrice,
    TotalPrice,
    BuKey,
    CategoryId,
}
