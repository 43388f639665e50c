use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use common::ExportRequest;
use compute::ExportFormat;
use tracing::{debug, error, info, instrument};

use crate::error::{ApiError, JsonBody};
use crate::schemas::AppState;

/// Export a query result as CSV
#[utoipa::path(
    post,
    path = "/api/export/csv",
    tag = "export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "CSV attachment with a header row", content_type = "text/csv"),
        (status = 400, description = "Missing or non read-only SQL", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Query returned no rows", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Query or rendering failed", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn export_csv(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ExportRequest>,
) -> Result<Response, ApiError> {
    export(&state, request, ExportFormat::Csv, "Error exporting to CSV").await
}

/// Export a query result as an Excel workbook
#[utoipa::path(
    post,
    path = "/api/export/excel",
    tag = "export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "XLSX attachment with a `Results` sheet", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Missing or non read-only SQL", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Query returned no rows", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Query or rendering failed", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn export_excel(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ExportRequest>,
) -> Result<Response, ApiError> {
    export(&state, request, ExportFormat::Excel, "Error exporting to Excel").await
}

async fn export(
    state: &AppState,
    request: ExportRequest,
    format: ExportFormat,
    context: &'static str,
) -> Result<Response, ApiError> {
    if request.sql.trim().is_empty() {
        return Err(ApiError::Validation("SQL query is required".to_string()));
    }

    let rows = state
        .repo
        .run_read_only(&request.sql)
        .await
        .map_err(ApiError::from_compute(context))?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("No data to export".to_string()));
    }
    debug!("Exporting {} rows as {:?}", rows.len(), format);

    // Workbook generation is CPU bound
    let file = tokio::task::spawn_blocking(move || format.render(&rows))
        .await
        .map_err(|e| {
            error!("Export task failed: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from_compute(context))?;
    info!(bytes = file.len(), "Export rendered");

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        file,
    )
        .into_response())
}
