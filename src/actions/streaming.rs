//! Stream event handling for the chat and documentation generations.

use std::path::PathBuf;

use crate::export::ExportError;
use crate::logging::log_error;
use crate::state::State;

/// Append a chat chunk to the live draft (superseded generations drop out
/// inside `append_chunk`).
pub fn handle_chunk(state: &mut State, generation: u64, text: &str) {
    state.append_chunk(generation, text);
}

/// Finalize a successful chat stream.
pub fn handle_stream_done(state: &mut State, generation: u64, output_tokens: usize) {
    if generation == state.stream_generation {
        state.last_output_tokens = output_tokens;
    }
    state.finish_stream(generation, None);
}

/// Finalize a failed chat stream: log, then append the placeholder.
pub fn handle_stream_error(state: &mut State, generation: u64, error: &str) {
    let report = log_error(error);
    if generation == state.stream_generation {
        state.notice = Some(format!("Generation failed (see {})", report));
    }
    state.finish_stream(generation, Some(error));
}

/// Accumulate a documentation chunk. Runs superseded by a repo switch or a
/// newer documentation request drop out on the generation check.
pub fn handle_doc_chunk(state: &mut State, generation: u64, text: &str) {
    if generation == state.doc_generation && state.doc_pending {
        state.doc_buffer.push_str(text);
        state.dirty = true;
    }
}

/// Documentation stream finished: hand the accumulated text to the caller
/// for export. `doc_pending` stays up until the export result lands.
pub fn handle_doc_done(state: &mut State, generation: u64) -> Option<String> {
    if generation != state.doc_generation || !state.doc_pending {
        return None;
    }
    state.dirty = true;
    Some(state.doc_buffer.clone())
}

pub fn handle_doc_error(state: &mut State, generation: u64, error: &str) {
    if generation != state.doc_generation {
        return;
    }
    let report = log_error(error);
    state.doc_pending = false;
    state.doc_buffer.clear();
    state.notice = Some(format!("Documentation failed (see {})", report));
    state.dirty = true;
}

/// The export thread came back: surface where the PDF went (or why not).
pub fn handle_export_result(state: &mut State, generation: u64, result: Result<Option<PathBuf>, ExportError>) {
    if generation != state.doc_generation {
        return;
    }
    state.doc_pending = false;
    state.dirty = true;
    match result {
        Ok(Some(path)) => state.notice = Some(format!("Documentation saved to {}", path.display())),
        Ok(None) => state.notice = Some("Documentation came back empty; nothing exported".to_string()),
        Err(e) => {
            let report = log_error(&e.to_string());
            state.notice = Some(format!("Export failed (see {})", report));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STREAM_ERROR_PLACEHOLDER;

    #[test]
    fn done_records_output_tokens_for_current_generation_only() {
        let mut state = State::new();
        state.submit_prompt("hi");
        let generation = state.stream_generation;
        handle_chunk(&mut state, generation, "answer");
        handle_stream_done(&mut state, generation, 42);
        assert_eq!(state.last_output_tokens, 42);
        assert_eq!(state.messages.last().unwrap().content, "answer");

        state.submit_prompt("again");
        handle_stream_done(&mut state, generation, 99); // stale
        assert_eq!(state.last_output_tokens, 42);
    }

    #[test]
    fn error_appends_placeholder() {
        let mut state = State::new();
        state.submit_prompt("hi");
        let generation = state.stream_generation;
        handle_stream_error(&mut state, generation, "boom");
        assert_eq!(state.messages.last().unwrap().content, STREAM_ERROR_PLACEHOLDER);
        assert!(!state.pending);
    }

    #[test]
    fn doc_chunks_only_accumulate_while_pending() {
        let mut state = State::new();
        let generation = state.doc_generation;
        handle_doc_chunk(&mut state, generation, "ignored");
        assert!(state.doc_buffer.is_empty());
        assert!(handle_doc_done(&mut state, generation).is_none());

        state.doc_pending = true;
        handle_doc_chunk(&mut state, generation, "Title\n");
        handle_doc_chunk(&mut state, generation, "Body");
        assert_eq!(handle_doc_done(&mut state, generation).as_deref(), Some("Title\nBody"));
        assert!(state.doc_pending); // cleared only by the export result
    }

    #[test]
    fn superseded_doc_run_mutates_nothing() {
        let mut state = State::new();
        state.doc_pending = true;
        state.doc_generation += 1;
        let stale = state.doc_generation - 1;

        handle_doc_chunk(&mut state, stale, "old run");
        assert!(state.doc_buffer.is_empty());
        assert!(handle_doc_done(&mut state, stale).is_none());
        handle_doc_error(&mut state, stale, "old failure");
        assert!(state.doc_pending); // the live run is untouched
    }

    #[test]
    fn export_result_clears_pending_and_sets_notice() {
        let mut state = State::new();
        state.doc_pending = true;
        let generation = state.doc_generation;
        handle_export_result(&mut state, generation, Ok(None));
        assert!(!state.doc_pending);
        assert!(state.notice.as_deref().unwrap().contains("nothing exported"));
    }

    #[test]
    fn stale_export_result_is_dropped() {
        let mut state = State::new();
        state.doc_pending = true;
        state.doc_generation += 1;
        let stale = state.doc_generation - 1;
        handle_export_result(&mut state, stale, Ok(None));
        assert!(state.doc_pending);
        assert!(state.notice.is_none());
    }
}
