#[cfg(test)]
pub mod test_utils {
    use crate::config::{AppConfig, initialize_app_state};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use chrono::{DateTime, Utc};
    use compute::SeaOrmRepository;
    use migration::{Migrator, MigratorTrait};
    use model::entities::{category, invoice, line_item, payment, vendor};
    use rust_decimal::Decimal;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState around `db` with the given configuration
    pub fn app_state_for(db: DatabaseConnection, config: AppConfig) -> AppState {
        let repo = Arc::new(SeaOrmRepository::from_connection(db));
        initialize_app_state(config, repo).expect("Failed to initialize app state")
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        app_state_for(db, AppConfig::default())
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing over an empty database
    pub async fn setup_test_app() -> Router {
        let state = setup_test_app_state().await;
        create_router(state)
    }

    pub async fn seed_vendor(db: &DatabaseConnection, name: &str) -> i32 {
        vendor::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create vendor")
        .id
    }

    /// Inserts an invoice; `total` is in cents.
    pub async fn seed_invoice(
        db: &DatabaseConnection,
        number: &str,
        date: DateTime<Utc>,
        total: i64,
        vendor_id: Option<i32>,
    ) -> i32 {
        invoice::ActiveModel {
            invoice_number: Set(number.to_string()),
            invoice_date: Set(date),
            invoice_total: Set(Decimal::new(total, 2)),
            currency_symbol: Set(Some("EUR".to_string())),
            status: Set(Some("processed".to_string())),
            created_at: Set(Utc::now()),
            vendor_id: Set(vendor_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create invoice")
        .id
    }

    pub async fn seed_payment(db: &DatabaseConnection, invoice_id: i32, due: Option<DateTime<Utc>>) {
        payment::ActiveModel {
            invoice_id: Set(invoice_id),
            due_date: Set(due),
            payment_terms: Set(Some("30 days".to_string())),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create payment");
    }

    /// Inserts a line item under a category with `code`; `total` is in cents.
    pub async fn seed_line_item(db: &DatabaseConnection, invoice_id: i32, code: &str, total: i64) {
        let category = match category::Model::find_by_code(db, code)
            .await
            .expect("Failed to look up category")
        {
            Some(existing) => existing,
            None => category::ActiveModel {
                code: Set(code.to_string()),
                ..Default::default()
            }
            .insert(db)
            .await
            .expect("Failed to create category"),
        };

        line_item::ActiveModel {
            invoice_id: Set(invoice_id),
            description: Set(Some("Item".to_string())),
            total_price: Set(Decimal::new(total, 2)),
            category_id: Set(Some(category.id)),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create line item");
    }
}
