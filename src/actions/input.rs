//! Chat input editing, submission, and stream control.

use super::ActionResult;
use crate::state::State;

pub fn handle_input_char(state: &mut State, c: char) -> ActionResult {
    state.input.insert(state.input_cursor, c);
    state.input_cursor += c.len_utf8();
    state.dirty = true;
    ActionResult::Nothing
}

pub fn handle_input_backspace(state: &mut State) -> ActionResult {
    if state.input_cursor > 0 {
        let prev = state.input[..state.input_cursor].chars().next_back().map(|c| c.len_utf8()).unwrap_or(0);
        state.input_cursor -= prev;
        state.input.remove(state.input_cursor);
        state.dirty = true;
    }
    ActionResult::Nothing
}

/// Submit the input line as a prompt. Whitespace-only input stays put and
/// nothing is sent. Submitting while a stream is pending supersedes it: the
/// old stream's events are orphaned by the generation bump.
pub fn handle_input_submit(state: &mut State) -> ActionResult {
    let prompt = std::mem::take(&mut state.input);
    state.input_cursor = 0;
    if !state.submit_prompt(&prompt) {
        state.input = prompt; // keep what was typed (maybe mid-thought)
        state.input_cursor = state.input.len();
        return ActionResult::Nothing;
    }
    ActionResult::StartChatStream
}

/// Kick off documentation generation. One at a time; the pending export
/// simply keeps running if asked again.
pub fn handle_generate_doc(state: &mut State) -> ActionResult {
    if state.doc_pending {
        return ActionResult::Nothing;
    }
    state.doc_pending = true;
    state.doc_buffer.clear();
    state.doc_generation += 1;
    state.notice = Some("Generating documentation...".to_string());
    state.dirty = true;
    ActionResult::StartDocStream
}

/// Cancel the in-flight chat stream. The draft is discarded and no assistant
/// message is appended; the next send starts a fresh generation.
pub fn handle_stop_stream(state: &mut State) -> ActionResult {
    if state.pending {
        state.stream_generation += 1;
        state.pending = false;
        state.draft.clear();
        state.dirty = true;
    }
    ActionResult::Nothing
}
