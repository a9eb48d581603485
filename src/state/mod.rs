//! Application state. All mutation happens on the UI thread, either from a
//! user action or when the event loop drains a background channel.

pub mod message;
pub mod tree;

pub use message::{Message, Role, now_ms};
pub use tree::{FileTree, Toggle};

use crate::constants::{CHARS_PER_TOKEN, STREAM_ERROR_PLACEHOLDER};
use crate::github::RepoRef;
use crate::platform::{Repo, RolePost, User};

/// Which screen is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Repos,
    Explorer,
}

/// Which Explorer pane has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    File,
    Chat,
}

/// Session lifecycle, threaded through the app explicitly.
#[derive(Debug, Clone)]
pub enum AuthPhase {
    Uninitialized,
    Loading,
    /// Session resolved: `Some` = signed in, `None` = signed out
    Ready(Option<User>),
}

/// The one file open in the read-only viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: String,
    pub content: String,
}

pub struct State {
    pub screen: Screen,
    pub focus: Focus,
    pub auth: AuthPhase,

    // Repos screen
    pub repos: Vec<Repo>,
    pub postings: Vec<RolePost>,
    pub repos_loading: bool,
    pub repo_cursor: usize,

    // Explorer: tree + file view
    pub repo: Option<RepoRef>,
    pub tree: FileTree,
    pub tree_cursor: usize,
    pub selected_file: Option<SelectedFile>,
    /// Path of a content fetch in flight, if any
    pub file_pending: Option<String>,
    pub file_scroll: u16,

    // Assistant
    pub snapshot: Option<String>,
    pub snapshot_pending: bool,
    pub messages: Vec<Message>,
    /// Live accumulation of the current stream; appended to `messages`
    /// exactly once when the stream finishes
    pub draft: String,
    pub pending: bool,
    /// Increments on every `send`; events from older generations are dropped
    pub stream_generation: u64,
    pub input: String,
    pub input_cursor: usize,
    /// Chat scroll as distance from the bottom; 0 = following new output
    pub chat_scroll_back: u16,
    pub last_output_tokens: usize,

    // Documentation export
    pub doc_pending: bool,
    pub doc_buffer: String,
    /// Increments on every documentation run; events from older runs are
    /// dropped
    pub doc_generation: u64,

    /// One-line status notice (export result, error pointer)
    pub notice: Option<String>,
    pub dirty: bool,
}

impl State {
    pub fn new() -> Self {
        Self {
            screen: Screen::Repos,
            focus: Focus::Tree,
            auth: AuthPhase::Uninitialized,
            repos: Vec::new(),
            postings: Vec::new(),
            repos_loading: false,
            repo_cursor: 0,
            repo: None,
            tree: FileTree::new(),
            tree_cursor: 0,
            selected_file: None,
            file_pending: None,
            file_scroll: 0,
            snapshot: None,
            snapshot_pending: false,
            messages: Vec::new(),
            draft: String::new(),
            pending: false,
            stream_generation: 0,
            input: String::new(),
            input_cursor: 0,
            chat_scroll_back: 0,
            last_output_tokens: 0,
            doc_pending: false,
            doc_buffer: String::new(),
            doc_generation: 0,
            notice: None,
            dirty: true,
        }
    }

    /// Whether the chat viewport is pinned to the newest output.
    pub fn chat_at_bottom(&self) -> bool {
        self.chat_scroll_back == 0
    }

    /// Switch the Explorer to a repository, resetting everything scoped to
    /// the previous one. Conversation history is per-repo.
    pub fn enter_repo(&mut self, repo: RepoRef) {
        self.repo = Some(repo);
        self.screen = Screen::Explorer;
        self.focus = Focus::Tree;
        self.tree = FileTree::new();
        self.tree_cursor = 0;
        self.selected_file = None;
        self.file_pending = None;
        self.file_scroll = 0;
        self.snapshot = None;
        self.snapshot_pending = false;
        self.messages.clear();
        self.draft.clear();
        self.pending = false;
        self.stream_generation += 1; // orphan any stream still running
        self.input.clear();
        self.input_cursor = 0;
        self.chat_scroll_back = 0;
        self.doc_pending = false;
        self.doc_buffer.clear();
        self.doc_generation += 1;
        self.dirty = true;
    }

    /// Accept a user prompt for sending. Whitespace-only input is a no-op:
    /// no message appended, no request issued. On acceptance the user turn
    /// is in history, the pending flag is up, and the generation counter
    /// identifies the stream to listen to.
    pub fn submit_prompt(&mut self, prompt: &str) -> bool {
        if prompt.trim().is_empty() {
            return false;
        }
        self.messages.push(Message::user(prompt.to_string()));
        self.draft.clear();
        self.pending = true;
        self.stream_generation += 1;
        self.dirty = true;
        true
    }

    /// Append a streamed chunk to the live draft. Chunks from superseded
    /// generations are discarded.
    pub fn append_chunk(&mut self, generation: u64, text: &str) {
        if generation != self.stream_generation || !self.pending {
            return;
        }
        self.draft.push_str(text);
        self.dirty = true;
    }

    /// Finalize a stream: exactly one assistant message lands in history,
    /// the accumulated draft on success or a fixed placeholder on error. The
    /// pending flag clears unconditionally.
    pub fn finish_stream(&mut self, generation: u64, error: Option<&str>) {
        if generation != self.stream_generation {
            return; // superseded stream: its draft was already discarded
        }
        let content = match error {
            None => std::mem::take(&mut self.draft),
            Some(_) => {
                self.draft.clear();
                STREAM_ERROR_PLACEHOLDER.to_string()
            }
        };
        self.messages.push(Message::assistant(content));
        self.pending = false;
        self.dirty = true;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// Rough token estimate for status display.
pub fn estimate_tokens(text: &str) -> usize {
    (text.len() as f32 / CHARS_PER_TOKEN).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_prompts_are_rejected() {
        let mut state = State::new();
        assert!(!state.submit_prompt(""));
        assert!(!state.submit_prompt("   "));
        assert!(!state.submit_prompt("\n\t"));
        assert!(state.messages.is_empty());
        assert!(!state.pending);
        assert_eq!(state.stream_generation, 0);
    }

    #[test]
    fn final_message_is_chunk_concatenation() {
        let mut state = State::new();
        assert!(state.submit_prompt("What does this repo do?"));
        let generation = state.stream_generation;

        for chunk in ["The ", "repo ", "is..."] {
            state.append_chunk(generation, chunk);
        }
        state.finish_stream(generation, None);

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].role, Role::Assistant);
        assert_eq!(state.messages[1].content, "The repo is...");
        assert!(!state.pending);
        assert!(state.draft.is_empty());
    }

    #[test]
    fn failed_stream_appends_placeholder_and_clears_pending() {
        let mut state = State::new();
        state.submit_prompt("hi");
        let generation = state.stream_generation;
        state.append_chunk(generation, "partial ");
        state.finish_stream(generation, Some("API error 500: boom"));

        assert_eq!(state.messages.last().unwrap().content, STREAM_ERROR_PLACEHOLDER);
        assert!(!state.pending);
    }

    #[test]
    fn superseded_stream_mutates_nothing() {
        let mut state = State::new();
        state.submit_prompt("first");
        let old = state.stream_generation;
        state.append_chunk(old, "old ");

        // A second send supersedes the first stream
        state.submit_prompt("second");
        let new = state.stream_generation;
        assert!(state.draft.is_empty());

        state.append_chunk(old, "stale");
        assert!(state.draft.is_empty());
        state.finish_stream(old, None);
        assert_eq!(state.messages.len(), 2); // both user turns, no assistant
        assert!(state.pending);

        state.append_chunk(new, "fresh");
        state.finish_stream(new, None);
        assert_eq!(state.messages.last().unwrap().content, "fresh");
        assert!(!state.pending);
    }

    #[test]
    fn entering_a_repo_resets_scoped_state() {
        let mut state = State::new();
        state.submit_prompt("hello");
        state.snapshot = Some("old".into());
        state.enter_repo(RepoRef { owner: "octocat".into(), name: "hello".into() });

        assert_eq!(state.screen, Screen::Explorer);
        assert!(state.messages.is_empty());
        assert!(state.snapshot.is_none());
        assert!(!state.pending);
        assert!(state.selected_file.is_none());
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
