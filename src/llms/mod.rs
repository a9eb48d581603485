//! Streaming generation layer.
//!
//! One provider (Gemini) behind a small client trait; requests carry the
//! repo snapshot plus a window of conversation history, flattened into a
//! single user turn the way the generation API expects.

pub mod error;
pub mod gemini;

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use serde::Serialize;

use crate::constants::HISTORY_WINDOW_MESSAGES;
use crate::state::message::Message;
pub use error::LlmError;

/// Events emitted during streaming
#[derive(Debug)]
pub enum StreamEvent {
    /// Text chunk from the response
    Chunk(String),
    /// Stream completed; token count from the final usage report
    Done { output_tokens: usize },
    /// Error occurred
    Error(String),
}

/// A stream event tagged with the generation that produced it. The event
/// loop discards envelopes from superseded generations, so a newer `send`
/// deterministically replaces an older in-flight stream.
#[derive(Debug)]
pub struct StreamEnvelope {
    pub generation: u64,
    pub event: StreamEvent,
}

/// One role-tagged turn in the wire format.
#[derive(Debug, Clone, Serialize)]
pub struct ApiContent {
    pub role: String,
    pub parts: Vec<ApiPart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiPart {
    pub text: String,
}

/// A fully built generation request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub contents: Vec<ApiContent>,
}

/// Trait for streaming providers.
pub trait LlmClient: Send + Sync {
    /// Stream a generation, emitting each text chunk in arrival order.
    /// Returns the output token count on success.
    fn stream(&self, request: &LlmRequest, emit: &mut dyn FnMut(String)) -> Result<usize, LlmError>;
}

/// Run one streaming generation on a worker thread, tagging every event
/// with `generation`.
pub fn start_streaming(
    client: Arc<dyn LlmClient>,
    request: LlmRequest,
    generation: u64,
    tx: Sender<StreamEnvelope>,
) {
    thread::spawn(move || {
        let mut emit = |text: String| {
            let _ = tx.send(StreamEnvelope { generation, event: StreamEvent::Chunk(text) });
        };
        let event = match client.stream(&request, &mut emit) {
            Ok(output_tokens) => StreamEvent::Done { output_tokens },
            Err(e) => StreamEvent::Error(e.to_string()),
        };
        let _ = tx.send(StreamEnvelope { generation, event });
    });
}

/// Build a conversational request: repo snapshot plus the serialized tail of
/// the history, flattened into one user turn.
pub fn build_chat_request(model: &str, snapshot: &str, messages: &[Message]) -> LlmRequest {
    let window_start = messages.len().saturating_sub(HISTORY_WINDOW_MESSAGES);
    let mut prompt = format!("Repo Content:\n\n{}\n\nConversation:\n", snapshot);
    for msg in &messages[window_start..] {
        prompt.push_str(msg.role.wire_name());
        prompt.push_str(": ");
        prompt.push_str(&msg.content);
        prompt.push('\n');
    }
    single_user_request(model, prompt)
}

/// Build the single-shot documentation request: fixed instruction plus the
/// repo snapshot, no conversation history.
pub fn build_document_request(model: &str, instruction: &str, snapshot: &str) -> LlmRequest {
    single_user_request(model, format!("{}\n\n{}", instruction, snapshot))
}

fn single_user_request(model: &str, text: String) -> LlmRequest {
    LlmRequest {
        model: model.to_string(),
        contents: vec![ApiContent { role: "user".to_string(), parts: vec![ApiPart { text }] }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::message::Message;

    #[test]
    fn chat_request_carries_snapshot_and_history() {
        let messages =
            vec![Message::user("What does this repo do?".into()), Message::assistant("It's a parser.".into())];
        let request = build_chat_request("gemini-1.5-flash", "File: a.ts\n\nX\n\n", &messages);

        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role, "user");
        let text = &request.contents[0].parts[0].text;
        assert!(text.starts_with("Repo Content:\n\nFile: a.ts"));
        assert!(text.contains("user: What does this repo do?\n"));
        assert!(text.contains("model: It's a parser.\n"));
    }

    #[test]
    fn chat_request_windows_history() {
        let messages: Vec<Message> = (0..HISTORY_WINDOW_MESSAGES + 5)
            .map(|i| Message::user(format!("turn-{}", i)))
            .collect();
        let request = build_chat_request("m", "", &messages);
        let text = &request.contents[0].parts[0].text;

        assert!(!text.contains("turn-0\n"));
        assert!(!text.contains("turn-4\n"));
        assert!(text.contains("turn-5\n"));
        assert!(text.contains(&format!("turn-{}\n", HISTORY_WINDOW_MESSAGES + 4)));
        assert_eq!(text.matches("user: ").count(), HISTORY_WINDOW_MESSAGES);
    }

    #[test]
    fn document_request_is_single_shot() {
        let request = build_document_request("m", "Generate documentation.", "File: a.ts\n\nX\n\n");
        assert_eq!(request.contents.len(), 1);
        let text = &request.contents[0].parts[0].text;
        assert!(text.starts_with("Generate documentation.\n\nFile: a.ts"));
        assert!(!text.contains("Conversation:"));
    }
}
