//! Tree, file and repos-screen navigation.

use super::ActionResult;
use crate::github::{EntryKind, RepoRef};
use crate::remote::RemoteRequest;
use crate::state::{Screen, State};

/// Selectable rows of the repos screen: linked repositories first, then
/// postings that carry a repo link.
pub fn repo_choices(state: &State) -> Vec<(String, RepoRef)> {
    let mut choices = Vec::new();
    for repo in &state.repos {
        if let Some(repo_ref) = RepoRef::parse(&repo.full_name) {
            let label = if repo.private {
                format!("{} (private)", repo.full_name)
            } else {
                repo.full_name.clone()
            };
            choices.push((label, repo_ref));
        }
    }
    for posting in &state.postings {
        if let Some(repo_ref) = RepoRef::parse(&posting.repo_link) {
            let roles = if posting.roles.is_empty() { "posting".to_string() } else { posting.roles.join(", ") };
            let mut label = roles;
            if !posting.tech_stack.is_empty() {
                label.push_str(&format!(" ({})", posting.tech_stack.join(", ")));
            }
            if !posting.address.is_empty() {
                label.push_str(&format!(" · {}", posting.address));
            }
            label.push_str(&format!(" -> {}", repo_ref));
            choices.push((label, repo_ref));
        }
    }
    choices
}

pub fn handle_repo_move(state: &mut State, delta: isize) -> ActionResult {
    let len = repo_choices(state).len();
    if len == 0 {
        return ActionResult::Nothing;
    }
    let cursor = state.repo_cursor as isize + delta;
    state.repo_cursor = cursor.clamp(0, len as isize - 1) as usize;
    state.dirty = true;
    ActionResult::Nothing
}

pub fn handle_repo_activate(state: &mut State) -> ActionResult {
    let choices = repo_choices(state);
    let Some((_, repo_ref)) = choices.get(state.repo_cursor) else {
        return ActionResult::Nothing;
    };
    state.enter_repo(repo_ref.clone());
    ActionResult::OpenedRepo
}

pub fn handle_back_to_repos(state: &mut State) -> ActionResult {
    state.screen = Screen::Repos;
    state.dirty = true;
    ActionResult::Nothing
}

pub fn handle_tree_move(state: &mut State, delta: isize) -> ActionResult {
    let len = state.tree.visible().len();
    if len == 0 {
        return ActionResult::Nothing;
    }
    let cursor = state.tree_cursor as isize + delta;
    state.tree_cursor = cursor.clamp(0, len as isize - 1) as usize;
    state.dirty = true;
    ActionResult::Nothing
}

/// Enter on a tree row. Directories toggle (dispatching at most one listing
/// fetch); files start a content fetch unless the same path is already on
/// its way.
pub fn handle_tree_activate(state: &mut State) -> ActionResult {
    let rows = state.tree.visible();
    let Some(&(id, _)) = rows.get(state.tree_cursor) else {
        return ActionResult::Nothing;
    };
    let (path, kind) = {
        let node = state.tree.node(id);
        (node.path.clone(), node.kind)
    };
    state.dirty = true;

    if kind == EntryKind::Dir {
        return match state.tree.toggle(&path) {
            crate::state::Toggle::Fetch => ActionResult::Dispatch(RemoteRequest::Listing { path }),
            _ => ActionResult::Nothing,
        };
    }

    if state.file_pending.as_deref() == Some(path.as_str()) {
        return ActionResult::Nothing;
    }
    state.file_pending = Some(path.clone());
    ActionResult::Dispatch(RemoteRequest::FileContent { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::ContentsEntry;
    use crate::platform::{Repo, RolePost};
    use crate::state::tree::ROOT_PATH;

    fn state_with_root() -> State {
        let mut state = State::new();
        state.enter_repo(RepoRef { owner: "octocat".into(), name: "hello".into() });
        state.tree.insert_listing(
            ROOT_PATH,
            &[
                ContentsEntry { name: "src".into(), path: "src".into(), kind: EntryKind::Dir },
                ContentsEntry { name: "README.md".into(), path: "README.md".into(), kind: EntryKind::File },
            ],
        );
        state
    }

    #[test]
    fn activating_unfetched_dir_dispatches_listing() {
        let mut state = state_with_root();
        state.tree_cursor = 0;
        let result = handle_tree_activate(&mut state);
        assert_eq!(result, ActionResult::Dispatch(RemoteRequest::Listing { path: "src".into() }));
        // second activation while fetching: nothing new
        assert_eq!(handle_tree_activate(&mut state), ActionResult::Nothing);
    }

    #[test]
    fn activating_file_dedupes_in_flight_content_fetch() {
        let mut state = state_with_root();
        state.tree_cursor = 1;
        let result = handle_tree_activate(&mut state);
        assert_eq!(result, ActionResult::Dispatch(RemoteRequest::FileContent { path: "README.md".into() }));
        assert_eq!(handle_tree_activate(&mut state), ActionResult::Nothing);
    }

    #[test]
    fn tree_cursor_clamps_to_visible_rows() {
        let mut state = state_with_root();
        handle_tree_move(&mut state, -5);
        assert_eq!(state.tree_cursor, 0);
        handle_tree_move(&mut state, 10);
        assert_eq!(state.tree_cursor, 1);
    }

    #[test]
    fn repo_choices_combine_repos_and_linked_postings() {
        let mut state = State::new();
        state.repos.push(Repo { full_name: "octocat/hello".into(), private: false });
        state.postings.push(RolePost {
            id: "1".into(),
            roles: vec!["Backend".into()],
            tech_stack: vec!["Node".into()],
            address: "Berlin".into(),
            repo_link: "https://github.com/acme/board".into(),
        });
        state.postings.push(RolePost {
            id: "2".into(),
            roles: vec![],
            tech_stack: vec![],
            address: String::new(),
            repo_link: String::new(), // no repo, not selectable
        });

        let choices = repo_choices(&state);
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].1.to_string(), "octocat/hello");
        assert_eq!(choices[1].1.to_string(), "acme/board");
        assert_eq!(choices[1].0, "Backend (Node) · Berlin -> acme/board");
    }
}
