use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Body of `POST /api/chat-with-data`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: String,
}

/// Body of the export routes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct ExportRequest {
    #[serde(default)]
    pub sql: String,
}

/// One line of the chat ndjson stream.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatChunk {
    /// The SQL statement generated for the question
    Sql { data: String },
    /// One result row
    Data {
        #[schema(value_type = Object)]
        data: Value,
    },
    Error { error: String },
    Done,
}

impl ChatChunk {
    /// Serializes the chunk as a newline-terminated ndjson line.
    pub fn to_line(&self) -> String {
        // Serializing these variants cannot fail
        let mut line = serde_json::to_string(self).unwrap_or_default();
        line.push('\n');
        line
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryDto {
    pub id: i32,
    pub question: String,
    pub sql: String,
    pub created_at: DateTime<Utc>,
}
