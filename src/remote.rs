//! Background remote operations.
//!
//! Every fetch runs on its own worker thread and reports back through one
//! `mpsc` channel the UI loop drains. The UI thread stays the only place
//! state is mutated.

use std::sync::mpsc::Sender;
use std::thread;

use secrecy::SecretString;

use crate::github::{ContentsEntry, GithubClient, GithubError, RepoRef};
use crate::platform::{PlatformClient, PlatformError, Repo, RolePost, User};

/// A remote operation the UI asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    /// Resolve the session to a user (or signed-out)
    Session,
    /// Exchange the session for the GitHub bearer token
    AccessToken,
    /// Linked repositories for the repos screen
    Repos,
    /// Open postings for the repos screen
    Postings,
    /// Directory listing under `path` (root = `""`)
    Listing { path: String },
    /// Decoded content of the file at `path`
    FileContent { path: String },
    /// Concatenated top-level file contents for the assistant
    Snapshot,
}

/// Completion of a remote operation. Repo-scoped updates carry the repo they
/// were fetched for, so results landing after a repo switch are discarded
/// instead of leaking into the new repo's state.
pub enum RemoteUpdate {
    Session(Result<Option<User>, PlatformError>),
    AccessToken(Result<SecretString, PlatformError>),
    Repos(Result<Vec<Repo>, PlatformError>),
    Postings(Result<Vec<RolePost>, PlatformError>),
    Listing { repo: RepoRef, path: String, result: Result<Vec<ContentsEntry>, GithubError> },
    FileContent { repo: RepoRef, path: String, result: Result<String, GithubError> },
    Snapshot { repo: RepoRef, result: Result<String, GithubError> },
}

/// Run one request on a worker thread. Repo-scoped requests need `repo`;
/// without one they are dropped (the Explorer never dispatches them before
/// a repo is entered).
pub fn dispatch(
    request: RemoteRequest,
    github: GithubClient,
    platform: PlatformClient,
    repo: Option<RepoRef>,
    tx: Sender<RemoteUpdate>,
) {
    thread::spawn(move || {
        let update = match request {
            RemoteRequest::Session => RemoteUpdate::Session(resolve_session(&platform)),
            RemoteRequest::AccessToken => RemoteUpdate::AccessToken(platform.access_token()),
            RemoteRequest::Repos => RemoteUpdate::Repos(platform.repos()),
            RemoteRequest::Postings => RemoteUpdate::Postings(platform.postings()),
            RemoteRequest::Listing { path } => {
                let Some(repo) = repo else { return };
                let result = github.list_dir(&repo, &path);
                RemoteUpdate::Listing { repo, path, result }
            }
            RemoteRequest::FileContent { path } => {
                let Some(repo) = repo else { return };
                let result = github.file_content(&repo, &path);
                RemoteUpdate::FileContent { repo, path, result }
            }
            RemoteRequest::Snapshot => {
                let Some(repo) = repo else { return };
                let result = github.build_snapshot(&repo);
                RemoteUpdate::Snapshot { repo, result }
            }
        };
        let _ = tx.send(update);
    });
}

/// A missing cookie or a 401 both mean "signed out", not an error.
fn resolve_session(platform: &PlatformClient) -> Result<Option<User>, PlatformError> {
    match platform.current_user() {
        Ok(user) => Ok(Some(user)),
        Err(PlatformError::NoSession) | Err(PlatformError::Api { status: 401, .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessionless_resolution_is_signed_out() {
        let platform = PlatformClient::new("http://localhost:5000".into(), None);
        assert!(matches!(resolve_session(&platform), Ok(None)));
    }
}
