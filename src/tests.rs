#[cfg(test)]
mod integration_tests {
    use crate::config::AppConfig;
    use crate::router::create_router;
    use crate::schemas::{ErrorResponse, HealthResponse};
    use crate::test_utils::test_utils::{
        app_state_for, init_test_tracing, seed_invoice, seed_line_item, seed_payment,
        seed_vendor, setup_test_app, setup_test_db,
    };
    use axum::{
        Json, Router,
        body::Body,
        http::{StatusCode, header},
        response::IntoResponse,
        routing::post,
    };
    use axum_test::TestServer;
    use bytes::Bytes;
    use chrono::{Datelike, Duration, TimeZone, Utc};
    use common::{
        CashOutflow, CategorySpend, ChatHistoryDto, InvoiceDto, InvoiceTrend, StatsResponse,
        VendorSpend,
    };
    use futures::stream;
    use sea_orm::DatabaseConnection;
    use serde_json::{Value, json};
    use std::convert::Infallible;
    use tokio::net::TcpListener;

    fn server_for(db: DatabaseConnection, config: AppConfig) -> TestServer {
        TestServer::new(create_router(app_state_for(db, config))).unwrap()
    }

    /// Starts a fake AI service that answers every question with `chunks`.
    async fn spawn_ai_service(chunks: Vec<&'static str>) -> String {
        let app = Router::new().route(
            "/api/v1/chat",
            post(move |Json(body): Json<Value>| {
                let chunks = chunks.clone();
                async move {
                    if body["question"] != "What did we spend on ACME?" {
                        return (StatusCode::BAD_REQUEST, "unexpected question").into_response();
                    }
                    let parts = chunks
                        .into_iter()
                        .map(|chunk| Ok::<_, Infallible>(Bytes::from_static(chunk.as_bytes())));
                    Body::from_stream(stream::iter(parts)).into_response()
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", address)
    }

    #[tokio::test]
    async fn test_health_check() {
        let _guard = init_test_tracing();
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "connected");
    }

    #[tokio::test]
    async fn test_unknown_route_returns_json_404() {
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server.get("/api/does-not-exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert!(!body.success);
        assert_eq!(body.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_stats_on_empty_database() {
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server.get("/api/stats").await;

        response.assert_status(StatusCode::OK);
        let stats: StatsResponse = response.json();
        assert_eq!(stats.total_spend, 0.0);
        assert_eq!(stats.total_invoices, 0);
        assert_eq!(stats.average_invoice_value, 0.0);
        assert_eq!(stats.spend_change, "0.0%");
        assert_eq!(stats.invoices_change, "0.0%");
        assert_eq!(stats.average_change, "0.0%");
        assert_eq!(stats.trend.len(), 10);
        assert!(stats.trend.iter().all(|day| day.invoices == 0));
    }

    #[tokio::test]
    async fn test_stats_month_over_month() {
        let db = setup_test_db().await;
        let now = Utc::now();
        let this_month = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .unwrap();
        let last_month = this_month - Duration::days(1);
        seed_invoice(&db, "NOW-1", now, 10_000, None).await;
        seed_invoice(&db, "OLD-1", last_month, 5_000, None).await;
        let server = server_for(db, AppConfig::default());

        let stats: StatsResponse = server.get("/api/stats").await.json();

        assert_eq!(stats.total_spend, 150.0);
        assert_eq!(stats.total_invoices, 2);
        assert_eq!(stats.documents_uploaded, 2);
        assert_eq!(stats.current_month_spend, 100.0);
        assert_eq!(stats.last_month_spend, 50.0);
        assert_eq!(stats.spend_change, "+100.0%");
        assert_eq!(stats.current_month_invoices, 1);
        assert_eq!(stats.invoices_change, "0.0%");
        let today = stats.trend.last().unwrap();
        assert_eq!(today.date, now.date_naive());
        assert_eq!(today.invoices, 1);
        assert_eq!(today.spend, 100.0);
    }

    #[tokio::test]
    async fn test_stats_are_cached() {
        let db = setup_test_db().await;
        seed_invoice(&db, "A", Utc::now(), 1_000, None).await;
        let server = server_for(db.clone(), AppConfig::default());

        let first: StatsResponse = server.get("/api/stats").await.json();
        seed_invoice(&db, "B", Utc::now(), 1_000, None).await;
        let second: StatsResponse = server.get("/api/stats").await.json();

        assert_eq!(first.total_invoices, 1);
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_invoice_trends_group_by_date() {
        let db = setup_test_db().await;
        let day = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        seed_invoice(&db, "A", day, 1_000, None).await;
        seed_invoice(&db, "B", day, 2_000, None).await;
        seed_invoice(&db, "C", day + Duration::days(1), 500, None).await;
        let server = server_for(db, AppConfig::default());

        let trends: Vec<InvoiceTrend> = server.get("/api/invoice-trends").await.json();

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].date, day);
        assert_eq!(trends[0].total_spend, 30.0);
        assert_eq!(trends[0].invoice_count, 2);
        assert_eq!(trends[1].invoice_count, 1);
    }

    #[tokio::test]
    async fn test_top_vendors_returns_ten_highest() {
        let db = setup_test_db().await;
        let day = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let mut total_spend = 0.0;
        for i in 1..=12 {
            let vendor = seed_vendor(&db, &format!("Vendor {:02}", i)).await;
            seed_invoice(&db, &format!("INV-{}", i), day, i * 1_000, Some(vendor)).await;
            total_spend += (i * 10) as f64;
        }
        let server = server_for(db, AppConfig::default());

        let response = server.get("/api/vendors/top10").await;

        response.assert_status(StatusCode::OK);
        let vendors: Vec<VendorSpend> = response.json();
        assert_eq!(vendors.len(), 10);
        assert_eq!(vendors[0].name, "Vendor 12");
        assert_eq!(vendors[0].total_spend, 120.0);
        assert!(vendors.windows(2).all(|w| w[0].total_spend >= w[1].total_spend));
        assert!(vendors.iter().map(|v| v.total_spend).sum::<f64>() <= total_spend);
    }

    #[tokio::test]
    async fn test_category_spend() {
        let db = setup_test_db().await;
        let invoice = seed_invoice(&db, "A", Utc::now(), 10_000, None).await;
        seed_line_item(&db, invoice, "4930", 2_500).await;
        seed_line_item(&db, invoice, "4930", 2_500).await;
        seed_line_item(&db, invoice, "6815", 7_000).await;
        let server = server_for(db, AppConfig::default());

        let spend: Vec<CategorySpend> = server.get("/api/category-spend").await.json();

        assert_eq!(spend.len(), 2);
        assert_eq!(spend[0].category, "6815");
        assert_eq!(spend[0].spend, 70.0);
        assert_eq!(spend[1].category, "4930");
        assert_eq!(spend[1].spend, 50.0);
    }

    #[tokio::test]
    async fn test_cash_outflow_sums_invoices_with_due_dates() {
        let db = setup_test_db().await;
        let issued = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let a = seed_invoice(&db, "A", issued, 10_000, None).await;
        let b = seed_invoice(&db, "B", issued, 2_550, None).await;
        let c = seed_invoice(&db, "C", issued, 99_900, None).await;
        let d = seed_invoice(&db, "D", issued, 1_000, None).await;
        seed_payment(&db, a, Some(due)).await;
        seed_payment(&db, b, Some(due)).await;
        seed_payment(&db, c, None).await;
        seed_payment(&db, d, Some(due + Duration::days(3))).await;
        let server = server_for(db, AppConfig::default());

        let outflow: Vec<CashOutflow> = server.get("/api/cash-outflow").await.json();

        assert_eq!(outflow.len(), 2);
        assert_eq!(outflow[0].date, "2025-04-01");
        assert_eq!(outflow[0].amount, 125.5);
        assert_eq!(outflow[1].date, "2025-04-04");
        assert_eq!(outflow.iter().map(|o| o.amount).sum::<f64>(), 135.5);
    }

    #[tokio::test]
    async fn test_invoice_search_and_sort() {
        let db = setup_test_db().await;
        let acme = seed_vendor(&db, "ACME Supplies").await;
        let globex = seed_vendor(&db, "Globex").await;
        let day = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let first = seed_invoice(&db, "RE-1001", day, 30_000, Some(acme)).await;
        seed_invoice(&db, "RE-1002", day + Duration::days(1), 10_000, Some(globex)).await;
        seed_payment(&db, first, Some(day + Duration::days(30))).await;
        let server = server_for(db, AppConfig::default());

        let all: Vec<InvoiceDto> = server.get("/api/invoices").await.json();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].invoice_number, "RE-1002");

        let found: Vec<InvoiceDto> = server
            .get("/api/invoices")
            .add_query_param("search", "acme")
            .await
            .json();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].vendor.as_ref().unwrap().name, "ACME Supplies");
        assert!(found[0].payment.is_some());

        let sorted: Vec<InvoiceDto> = server
            .get("/api/invoices")
            .add_query_param("sortBy", "invoiceTotal")
            .add_query_param("sortOrder", "desc")
            .await
            .json();
        assert_eq!(sorted[0].invoice_total, 300.0);
        assert_eq!(sorted[1].invoice_total, 100.0);
    }

    #[tokio::test]
    async fn test_invoice_search_without_match_is_empty() {
        let db = setup_test_db().await;
        seed_invoice(&db, "RE-1", Utc::now(), 1_000, None).await;
        let server = server_for(db, AppConfig::default());

        let response = server
            .get("/api/invoices")
            .add_query_param("search", "no such invoice")
            .await;

        response.assert_status(StatusCode::OK);
        let invoices: Vec<InvoiceDto> = response.json();
        assert!(invoices.is_empty());
    }

    #[tokio::test]
    async fn test_invoice_unknown_sort_key_is_rejected() {
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server
            .get("/api/invoices")
            .add_query_param("sortBy", "vendor_id; DROP TABLE invoices")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");

        let response = server
            .get("/api/invoices")
            .add_query_param("sortBy", "invoiceDate")
            .add_query_param("sortOrder", "sideways")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_is_empty_initially() {
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server.get("/api/history").await;

        response.assert_status(StatusCode::OK);
        let history: Vec<ChatHistoryDto> = response.json();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_export_requires_sql() {
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server.post("/api/export/csv").json(&json!({})).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "SQL query is required");
    }

    #[tokio::test]
    async fn test_export_without_rows_is_not_found() {
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server
            .post("/api/export/csv")
            .json(&json!({ "sql": "SELECT invoice_number FROM invoices" }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "No data to export");
    }

    #[tokio::test]
    async fn test_export_rejects_writes() {
        let db = setup_test_db().await;
        seed_invoice(&db, "A", Utc::now(), 1_000, None).await;
        let server = server_for(db, AppConfig::default());

        let response = server
            .post("/api/export/excel")
            .json(&json!({ "sql": "DELETE FROM invoices" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/export/csv")
            .json(&json!({ "sql": "SELECT 1; DROP TABLE invoices" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let invoices: Vec<InvoiceDto> = server.get("/api/invoices").await.json();
        assert_eq!(invoices.len(), 1);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let db = setup_test_db().await;
        let acme = seed_vendor(&db, "ACME").await;
        seed_invoice(&db, "RE-1", Utc::now(), 1_250, Some(acme)).await;
        let server = server_for(db, AppConfig::default());

        let response = server
            .post("/api/export/csv")
            .json(&json!({
                "sql": "SELECT i.invoice_number, v.name FROM invoices i JOIN vendors v ON v.id = i.vendor_id"
            }))
            .await;

        response.assert_status(StatusCode::OK);
        assert!(
            response
                .header(header::CONTENT_DISPOSITION)
                .to_str()
                .unwrap()
                .contains("export.csv")
        );
        assert_eq!(response.text(), "invoice_number,name\nRE-1,ACME\n");
    }

    #[tokio::test]
    async fn test_export_excel() {
        let db = setup_test_db().await;
        seed_invoice(&db, "RE-1", Utc::now(), 1_250, None).await;
        let server = server_for(db, AppConfig::default());

        let response = server
            .post("/api/export/excel")
            .json(&json!({ "sql": "SELECT invoice_number, invoice_total FROM invoices" }))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.header(header::CONTENT_TYPE),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        // XLSX files are zip archives
        assert!(response.as_bytes().starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_chat_requires_query() {
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server
            .post("/api/chat-with-data")
            .json(&json!({ "query": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_json_errors() {
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server
            .post("/api/chat-with-data")
            .json(&json!({ "query": 42 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert!(!body.success);

        let response = server
            .post("/api/export/csv")
            .text("SELECT * FROM invoices")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert!(body.error.contains("Content-Type"));

        let response = server
            .post("/api/export/excel")
            .bytes(Bytes::from_static(b"{not json"))
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_chat_with_unreachable_ai_service() {
        let db = setup_test_db().await;
        let config = AppConfig {
            // Nothing listens on the discard port
            ai_service_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let server = server_for(db, config);

        let response = server
            .post("/api/chat-with-data")
            .json(&json!({ "query": "What did we spend on ACME?" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Error proxying request to AI service");
    }

    #[tokio::test]
    async fn test_chat_with_failing_ai_service() {
        let ai_service = spawn_ai_service(vec![]).await;
        let db = setup_test_db().await;
        let server = server_for(
            db,
            AppConfig {
                ai_service_url: ai_service,
                ..Default::default()
            },
        );

        let response = server
            .post("/api/chat-with-data")
            .json(&json!({ "query": "An unexpected question" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = response.json();
        assert!(body.error.contains("400"));
    }

    #[tokio::test]
    async fn test_chat_relays_stream_and_records_history() {
        let ai_service = spawn_ai_service(vec![
            "{\"type\":\"sql\",\"data\":\"SELECT 1\"}\n{\"type\":\"da",
            "ta\",\"data\":{\"total\":42}}\n",
        ])
        .await;
        let db = setup_test_db().await;
        let server = server_for(
            db,
            AppConfig {
                ai_service_url: ai_service,
                ..Default::default()
            },
        );

        let response = server
            .post("/api/chat-with-data")
            .json(&json!({ "query": "What did we spend on ACME?" }))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.header(header::CONTENT_TYPE), "application/x-ndjson");
        assert_eq!(
            response.text(),
            "{\"type\":\"sql\",\"data\":\"SELECT 1\"}\n{\"type\":\"data\",\"data\":{\"total\":42}}\n"
        );

        // The history write runs in the background
        let mut history: Vec<ChatHistoryDto> = Vec::new();
        for _ in 0..50 {
            history = server.get("/api/history").await.json();
            if !history.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "What did we spend on ACME?");
        assert_eq!(history[0].sql, "SELECT 1");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let server = TestServer::new(setup_test_app().await).unwrap();

        let response = server.get("/api-docs/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let document: Value = response.json();
        assert!(document["paths"]["/api/stats"].is_object());
        assert!(document["paths"]["/api/chat-with-data"].is_object());
    }
}
