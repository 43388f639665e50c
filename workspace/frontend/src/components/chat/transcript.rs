use std::rc::Rc;

use common::ChatChunk;
use serde_json::Value;
use yew::Reducible;

/// What the chat page has received for the current question.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    pub question: String,
    pub sql: Option<String>,
    pub rows: Vec<Value>,
    pub error: Option<String>,
    pub streaming: bool,
}

pub enum ChatAction {
    /// A new question was submitted; previous results are discarded
    Start(String),
    Chunk(ChatChunk),
    Failed(String),
    Finished,
}

impl Reducible for Transcript {
    type Action = ChatAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ChatAction::Start(question) => {
                next = Transcript {
                    question,
                    streaming: true,
                    ..Transcript::default()
                };
            }
            ChatAction::Chunk(ChatChunk::Sql { data }) => {
                if next.sql.is_none() {
                    next.sql = Some(data);
                }
            }
            ChatAction::Chunk(ChatChunk::Data { data }) => next.rows.push(data),
            ChatAction::Chunk(ChatChunk::Error { error }) | ChatAction::Failed(error) => {
                next.error = Some(error);
                next.streaming = false;
            }
            ChatAction::Chunk(ChatChunk::Done) | ChatAction::Finished => next.streaming = false,
        }
        Rc::new(next)
    }
}

/// Column names across all object rows, in first-seen order.
pub fn columns(rows: &[Value]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !names.iter().any(|n| n == key) {
                    names.push(key.clone());
                }
            }
        }
    }
    names
}

/// Text shown in a result cell.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(state: Transcript, actions: Vec<ChatAction>) -> Transcript {
        let mut state = Rc::new(state);
        for action in actions {
            state = state.reduce(action);
        }
        (*state).clone()
    }

    #[test]
    fn test_stream_builds_transcript() {
        let transcript = apply(
            Transcript::default(),
            vec![
                ChatAction::Start("Top vendor?".to_string()),
                ChatAction::Chunk(ChatChunk::Sql { data: "SELECT 1".to_string() }),
                ChatAction::Chunk(ChatChunk::Sql { data: "SELECT 2".to_string() }),
                ChatAction::Chunk(ChatChunk::Data { data: json!({"name": "ACME"}) }),
                ChatAction::Chunk(ChatChunk::Data { data: json!({"name": "Globex"}) }),
            ],
        );
        assert_eq!(transcript.question, "Top vendor?");
        assert_eq!(transcript.sql.as_deref(), Some("SELECT 1"));
        assert_eq!(transcript.rows.len(), 2);
        assert!(transcript.streaming);

        let finished = apply(transcript, vec![ChatAction::Chunk(ChatChunk::Done)]);
        assert!(!finished.streaming);
        assert_eq!(finished.error, None);
    }

    #[test]
    fn test_start_discards_previous_answer() {
        let previous = Transcript {
            question: "old".to_string(),
            sql: Some("SELECT 1".to_string()),
            rows: vec![json!({"a": 1})],
            error: Some("boom".to_string()),
            streaming: false,
        };
        let transcript = apply(previous, vec![ChatAction::Start("new".to_string())]);
        assert_eq!(transcript.question, "new");
        assert_eq!(transcript.sql, None);
        assert!(transcript.rows.is_empty());
        assert_eq!(transcript.error, None);
        assert!(transcript.streaming);
    }

    #[test]
    fn test_error_chunk_stops_streaming() {
        let transcript = apply(
            Transcript::default(),
            vec![
                ChatAction::Start("q".to_string()),
                ChatAction::Chunk(ChatChunk::Error { error: "Upstream stream interrupted".to_string() }),
            ],
        );
        assert_eq!(transcript.error.as_deref(), Some("Upstream stream interrupted"));
        assert!(!transcript.streaming);
    }

    #[test]
    fn test_columns_union_in_order() {
        let rows = vec![json!({"b": 1, "a": 2}), json!({"a": 3, "c": null}), json!(5)];
        let cols = columns(&rows);
        assert_eq!(cols.len(), 3);
        assert!(cols.contains(&"a".to_string()));
        assert!(cols.contains(&"c".to_string()));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(Some(&json!("ACME"))), "ACME");
        assert_eq!(cell_text(Some(&json!(12.5))), "12.5");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(None), "");
    }
}
