//! Action handling split into domain-focused modules.
//!
//! - `input` - chat input editing, submission, stream cancellation
//! - `nav` - tree/file/repos navigation and activation
//! - `streaming` - chat stream event handling

pub mod input;
pub mod nav;
pub mod streaming;

use crate::remote::RemoteRequest;
use crate::state::{Focus, Screen, State};

/// Everything a key press can mean, resolved per focused pane.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    // Chat input
    InputChar(char),
    InputBackspace,
    InputSubmit,
    // Pane navigation
    FocusNext,
    TreeUp,
    TreeDown,
    TreeActivate,
    FileScrollUp(u16),
    FileScrollDown(u16),
    ChatScrollUp(u16),
    ChatScrollDown(u16),
    RepoUp,
    RepoDown,
    RepoActivate,
    BackToRepos,
    // Assistant
    GenerateDoc,
    StopStream,
}

/// What the event loop must do after an action mutated state.
#[derive(Debug, PartialEq)]
pub enum ActionResult {
    Nothing,
    /// Run one remote request in the background
    Dispatch(RemoteRequest),
    /// A repo was entered: fetch its root listing and snapshot
    OpenedRepo,
    /// Start a chat generation for the current state
    StartChatStream,
    /// Start the documentation generation
    StartDocStream,
}

pub fn apply_action(state: &mut State, action: Action) -> ActionResult {
    match action {
        Action::None => ActionResult::Nothing,
        Action::InputChar(c) => input::handle_input_char(state, c),
        Action::InputBackspace => input::handle_input_backspace(state),
        Action::InputSubmit => input::handle_input_submit(state),
        Action::FocusNext => {
            if state.screen == Screen::Explorer {
                state.focus = match state.focus {
                    Focus::Tree => Focus::File,
                    Focus::File => Focus::Chat,
                    Focus::Chat => Focus::Tree,
                };
                state.dirty = true;
            }
            ActionResult::Nothing
        }
        Action::TreeUp => nav::handle_tree_move(state, -1),
        Action::TreeDown => nav::handle_tree_move(state, 1),
        Action::TreeActivate => nav::handle_tree_activate(state),
        Action::FileScrollUp(n) => {
            state.file_scroll = state.file_scroll.saturating_sub(n);
            state.dirty = true;
            ActionResult::Nothing
        }
        Action::FileScrollDown(n) => {
            state.file_scroll = state.file_scroll.saturating_add(n);
            state.dirty = true;
            ActionResult::Nothing
        }
        Action::ChatScrollUp(n) => {
            state.chat_scroll_back = state.chat_scroll_back.saturating_add(n);
            state.dirty = true;
            ActionResult::Nothing
        }
        Action::ChatScrollDown(n) => {
            state.chat_scroll_back = state.chat_scroll_back.saturating_sub(n);
            state.dirty = true;
            ActionResult::Nothing
        }
        Action::RepoUp => nav::handle_repo_move(state, -1),
        Action::RepoDown => nav::handle_repo_move(state, 1),
        Action::RepoActivate => nav::handle_repo_activate(state),
        Action::BackToRepos => nav::handle_back_to_repos(state),
        Action::GenerateDoc => input::handle_generate_doc(state),
        Action::StopStream => input::handle_stop_stream(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_through_panes() {
        let mut state = State::new();
        state.screen = Screen::Explorer;
        state.focus = Focus::Tree;
        apply_action(&mut state, Action::FocusNext);
        assert_eq!(state.focus, Focus::File);
        apply_action(&mut state, Action::FocusNext);
        assert_eq!(state.focus, Focus::Chat);
        apply_action(&mut state, Action::FocusNext);
        assert_eq!(state.focus, Focus::Tree);
    }

    #[test]
    fn chat_scroll_up_disengages_follow() {
        let mut state = State::new();
        assert!(state.chat_at_bottom());
        apply_action(&mut state, Action::ChatScrollUp(3));
        assert!(!state.chat_at_bottom());
        apply_action(&mut state, Action::ChatScrollDown(2));
        assert!(!state.chat_at_bottom());
        apply_action(&mut state, Action::ChatScrollDown(5));
        assert!(state.chat_at_bottom());
    }
}
