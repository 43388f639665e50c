use async_stream::stream;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use common::ndjson::LineDecoder;
use common::{ChatChunk, ChatRequest};
use compute::DashboardRepository;
use futures::{Stream, StreamExt};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::{ApiError, JsonBody};
use crate::schemas::AppState;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Ask a question about the invoice data
///
/// The question is forwarded to the AI service and its ndjson answer is relayed
/// line by line. The first generated SQL statement is saved to the chat history.
#[utoipa::path(
    post,
    path = "/api/chat-with-data",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Newline-delimited ChatChunk objects", content_type = "application/x-ndjson", body = ChatChunk),
        (status = 400, description = "Missing query", body = crate::schemas::ErrorResponse),
        (status = 500, description = "AI service unavailable", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn chat_with_data(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ChatRequest>,
) -> Result<Response, ApiError> {
    let question = request.query.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::Validation("Query is required".to_string()));
    }
    info!("Forwarding question to AI service");

    let upstream = state
        .http
        .post(state.config.chat_endpoint())
        .json(&json!({ "question": question }))
        .send()
        .await
        .map_err(|e| ApiError::Upstream {
            message: "Error proxying request to AI service".to_string(),
            detail: e.to_string(),
        })?;

    let status = upstream.status();
    if !status.is_success() {
        return Err(ApiError::Upstream {
            message: format!("AI service responded with status {}", status),
            detail: upstream.text().await.unwrap_or_default(),
        });
    }
    debug!("AI service accepted the question, relaying answer");

    let body = Body::from_stream(relay(upstream.bytes_stream(), question, state.repo.clone()));
    Ok(([(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)], body).into_response())
}

/// Remembers whether the generated SQL was already handed to the history writer.
struct SqlCapture {
    question: String,
    repo: Arc<dyn DashboardRepository>,
    recorded: bool,
}

impl SqlCapture {
    /// Validates one upstream line. Returns the line to forward, with its terminator,
    /// or `None` when it is blank or not JSON.
    fn inspect(&mut self, line: String) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }
        let value: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Dropping malformed line from AI service: {}", e);
                return None;
            }
        };

        if !self.recorded && value.get("type").and_then(Value::as_str) == Some("sql") {
            if let Some(sql) = value.get("data").and_then(Value::as_str) {
                self.recorded = true;
                self.record(sql.to_string());
            }
        }

        let mut line = line;
        line.push('\n');
        Some(line)
    }

    /// Saves the question in the background; the relay never waits for it.
    fn record(&self, sql: String) {
        let repo = self.repo.clone();
        let question = self.question.clone();
        tokio::spawn(async move {
            match repo.record_chat(&question, &sql).await {
                Ok(saved) => debug!(id = saved.id, "Saved chat history"),
                Err(e) => error!("Failed to save chat history: {}", e),
            }
        });
    }
}

/// Re-frames an upstream byte stream into complete ndjson lines.
pub fn relay<S, E>(
    upstream: S,
    question: String,
    repo: Arc<dyn DashboardRepository>,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    stream! {
        let mut upstream = Box::pin(upstream);
        let mut decoder = LineDecoder::new();
        let mut capture = SqlCapture { question, repo, recorded: false };
        let mut forwarded = 0usize;

        while let Some(chunk) = upstream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    error!("AI service stream failed: {}", e);
                    let chunk = ChatChunk::Error { error: "Upstream stream interrupted".to_string() };
                    yield Ok(Bytes::from(chunk.to_line()));
                    return;
                }
            };
            trace!("Received {} bytes from AI service", chunk.len());

            for line in decoder.push(&chunk) {
                if let Some(line) = capture.inspect(line) {
                    forwarded += 1;
                    yield Ok(Bytes::from(line));
                }
            }
        }

        if let Some(rest) = decoder.finish() {
            if let Some(line) = capture.inspect(rest) {
                forwarded += 1;
                yield Ok(Bytes::from(line));
            }
        }
        debug!(lines = forwarded, "AI service stream finished");
    }
}
