use crate::error::error_body;
use crate::handlers::{
    chat::{NDJSON_CONTENT_TYPE, chat_with_data},
    dashboard::{get_cash_outflow, get_category_spend, get_invoice_trends, get_stats, get_top_vendors},
    export::{export_csv, export_excel},
    health::health_check,
    history::get_history,
    invoices::get_invoices,
    openapi::openapi_json,
};
use crate::schemas::AppState;
use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, StatusCode},
    response::Response,
    routing::{get, post},
};
use std::any::Any;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::{
        CompressionLayer,
        predicate::{DefaultPredicate, NotForContentType, Predicate},
    },
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    // The chat relay is added after the timeout layer: the AI service may take
    // long to produce its first byte.
    let api = Router::new()
        .route("/stats", get(get_stats))
        .route("/invoice-trends", get(get_invoice_trends))
        .route("/vendors/top10", get(get_top_vendors))
        .route("/category-spend", get(get_category_spend))
        .route("/cash-outflow", get(get_cash_outflow))
        .route("/invoices", get(get_invoices))
        .route("/history", get(get_history))
        .route("/export/csv", post(export_csv))
        .route("/export/excel", post(export_excel))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(REQUEST_TIMEOUT),
        )
        .route("/chat-with-data", post(chat_with_data));

    // Streamed ndjson must reach the client line by line
    let compression = CompressionLayer::new().compress_when(
        DefaultPredicate::new().and(NotForContentType::const_new(NDJSON_CONTENT_TYPE)),
    );

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api)
        .fallback(not_found)
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TraceLayer::new_for_http())
                .layer(compression)
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin.trim() == "*" {
        return CorsLayer::permissive();
    }
    match origin.trim().parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin),
        Err(e) => {
            warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
            CorsLayer::new()
        }
    }
}

async fn not_found() -> Response {
    error_body(StatusCode::NOT_FOUND, "NOT_FOUND", "Not found")
}

async fn handle_timeout(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!("Request exceeded {:?}", REQUEST_TIMEOUT);
        error_body(StatusCode::REQUEST_TIMEOUT, "TIMEOUT", "Request timed out")
    } else {
        error!("Unhandled middleware error: {}", err);
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
    }
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);
    error_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::ErrorResponse;
    use axum::body::to_bytes;
    use tower::timeout::error::Elapsed;

    #[tokio::test]
    async fn test_timeout_has_json_body() {
        let response = handle_timeout(Box::new(Elapsed::new())).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "TIMEOUT");
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_other_middleware_errors_are_internal() {
        let response = handle_timeout("boom".into()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
