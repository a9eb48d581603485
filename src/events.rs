//! Keyboard dispatch: raw crossterm events become `Action`s based on the
//! current screen and focused pane. Returning `None` quits.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::actions::Action;
use crate::constants::{SCROLL_ARROW_AMOUNT, SCROLL_PAGE_AMOUNT};
use crate::state::{Focus, Screen, State};

pub fn handle_event(event: &Event, state: &State) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(key, state),
        _ => Some(Action::None),
    }
}

fn handle_key(key: &KeyEvent, state: &State) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global shortcuts first
    if ctrl {
        match key.code {
            KeyCode::Char('q') => return None, // Quit
            KeyCode::Char('g') if state.screen == Screen::Explorer => {
                return Some(Action::GenerateDoc);
            }
            _ => {}
        }
    }

    // Escape stops a running stream, otherwise backs out of the Explorer
    if key.code == KeyCode::Esc {
        if state.pending {
            return Some(Action::StopStream);
        }
        if state.screen == Screen::Explorer {
            return Some(Action::BackToRepos);
        }
        return Some(Action::None);
    }

    match state.screen {
        Screen::Repos => Some(handle_repos_key(key)),
        Screen::Explorer => Some(handle_explorer_key(key, state)),
    }
}

fn handle_repos_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Up => Action::RepoUp,
        KeyCode::Down => Action::RepoDown,
        KeyCode::Enter => Action::RepoActivate,
        _ => Action::None,
    }
}

fn handle_explorer_key(key: &KeyEvent, state: &State) -> Action {
    if key.code == KeyCode::Tab {
        return Action::FocusNext;
    }

    match state.focus {
        Focus::Tree => match key.code {
            KeyCode::Up => Action::TreeUp,
            KeyCode::Down => Action::TreeDown,
            KeyCode::Enter => Action::TreeActivate,
            _ => Action::None,
        },
        Focus::File => match key.code {
            KeyCode::Up => Action::FileScrollUp(SCROLL_ARROW_AMOUNT),
            KeyCode::Down => Action::FileScrollDown(SCROLL_ARROW_AMOUNT),
            KeyCode::PageUp => Action::FileScrollUp(SCROLL_PAGE_AMOUNT),
            KeyCode::PageDown => Action::FileScrollDown(SCROLL_PAGE_AMOUNT),
            _ => Action::None,
        },
        Focus::Chat => match key.code {
            KeyCode::Enter => Action::InputSubmit,
            KeyCode::Backspace => Action::InputBackspace,
            KeyCode::Up => Action::ChatScrollUp(SCROLL_ARROW_AMOUNT),
            KeyCode::Down => Action::ChatScrollDown(SCROLL_ARROW_AMOUNT),
            KeyCode::PageUp => Action::ChatScrollUp(SCROLL_PAGE_AMOUNT),
            KeyCode::PageDown => Action::ChatScrollDown(SCROLL_PAGE_AMOUNT),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => Action::InputChar(c),
            _ => Action::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::from(code))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    #[test]
    fn ctrl_q_quits() {
        let state = State::new();
        assert!(handle_event(&ctrl('q'), &state).is_none());
    }

    #[test]
    fn escape_prefers_stopping_a_stream() {
        let mut state = State::new();
        state.screen = Screen::Explorer;
        assert_eq!(handle_event(&key(KeyCode::Esc), &state), Some(Action::BackToRepos));
        state.pending = true;
        assert_eq!(handle_event(&key(KeyCode::Esc), &state), Some(Action::StopStream));
    }

    #[test]
    fn typing_goes_to_input_only_with_chat_focus() {
        let mut state = State::new();
        state.screen = Screen::Explorer;
        state.focus = Focus::Tree;
        assert_eq!(handle_event(&key(KeyCode::Char('a')), &state), Some(Action::None));
        state.focus = Focus::Chat;
        assert_eq!(handle_event(&key(KeyCode::Char('a')), &state), Some(Action::InputChar('a')));
    }

    #[test]
    fn enter_activates_per_screen() {
        let mut state = State::new();
        assert_eq!(handle_event(&key(KeyCode::Enter), &state), Some(Action::RepoActivate));
        state.screen = Screen::Explorer;
        state.focus = Focus::Tree;
        assert_eq!(handle_event(&key(KeyCode::Enter), &state), Some(Action::TreeActivate));
        state.focus = Focus::Chat;
        assert_eq!(handle_event(&key(KeyCode::Enter), &state), Some(Action::InputSubmit));
    }

    #[test]
    fn generate_doc_only_in_explorer() {
        let mut state = State::new();
        assert_eq!(handle_event(&ctrl('g'), &state), Some(Action::None));
        state.screen = Screen::Explorer;
        assert_eq!(handle_event(&ctrl('g'), &state), Some(Action::GenerateDoc));
    }
}
