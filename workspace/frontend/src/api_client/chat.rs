use crate::api_client;
use common::ndjson::LineDecoder;
use common::{ChatChunk, ChatHistoryDto, ChatRequest};
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Parses one ndjson line of the chat stream. Blank and malformed lines yield `None`.
pub fn parse_line(line: &str) -> Option<ChatChunk> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<ChatChunk>(line) {
        Ok(chunk) => Some(chunk),
        Err(e) => {
            log::warn!("Skipping malformed chat line: {}", e);
            None
        }
    }
}

/// Posts `question` and feeds every decoded chunk to `on_chunk` as it arrives.
pub async fn stream_chat<F>(question: &str, mut on_chunk: F) -> Result<(), String>
where
    F: FnMut(ChatChunk),
{
    let request = ChatRequest { query: question.to_string() };
    let response = api_client::post_raw("/chat-with-data", &request).await?;
    let body = response
        .body()
        .ok_or_else(|| "AI service returned an empty response".to_string())?;
    let reader: ReadableStreamDefaultReader = body.get_reader().unchecked_into();

    let mut decoder = LineDecoder::new();
    loop {
        let result = JsFuture::from(reader.read()).await.map_err(js_error)?;
        let done = Reflect::get(&result, &JsValue::from_str("done"))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        if done {
            break;
        }

        let value = Reflect::get(&result, &JsValue::from_str("value")).map_err(js_error)?;
        let bytes = Uint8Array::new(&value).to_vec();
        log::trace!("Chat stream read {} bytes", bytes.len());
        for line in decoder.push(&bytes) {
            if let Some(chunk) = parse_line(&line) {
                on_chunk(chunk);
            }
        }
    }

    if let Some(chunk) = decoder.finish().as_deref().and_then(parse_line) {
        on_chunk(chunk);
    }
    Ok(())
}

pub async fn get_history() -> Result<Vec<ChatHistoryDto>, String> {
    log::trace!("Fetching chat history");
    api_client::get::<Vec<ChatHistoryDto>>("/history").await
}
