//! GitHub contents API client.
//!
//! Listings and file bodies come from the same endpoint: a directory path
//! returns a JSON array of entries, a file path returns an object whose
//! `content` field is base64 with embedded newlines.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::constants::{GITHUB_API_ROOT, GITHUB_USER_AGENT};

/// Typed error for contents API operations.
#[derive(Debug)]
pub enum GithubError {
    /// Network-level failure (DNS, connection, timeout)
    Network(String),
    /// API returned a non-success HTTP status
    Api { status: u16, body: String },
    /// Response body did not match the expected shape
    Parse(String),
    /// File content failed base64 or UTF-8 decoding
    Decode(String),
}

impl fmt::Display for GithubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GithubError::Network(msg) => write!(f, "GitHub network error: {}", msg),
            GithubError::Api { status, body } => write!(f, "GitHub API error {}: {}", status, body),
            GithubError::Parse(msg) => write!(f, "GitHub parse error: {}", msg),
            GithubError::Decode(msg) => write!(f, "GitHub content decode error: {}", msg),
        }
    }
}

impl std::error::Error for GithubError {}

impl From<reqwest::Error> for GithubError {
    fn from(e: reqwest::Error) -> Self {
        GithubError::Network(e.to_string())
    }
}

/// Entry kind as reported by the contents endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks and submodules; browsable as leaves, skipped by the snapshot
    #[serde(other)]
    Other,
}

/// One row of a directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Deserialize)]
struct FileBody {
    content: String,
}

/// Identifies the repository every request is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl RepoRef {
    /// Parse `owner/name`, with or without a `https://github.com/` prefix
    /// (postings store the full repo link).
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim().trim_start_matches("https://").trim_start_matches("http://");
        let trimmed = trimmed.strip_prefix("github.com/").unwrap_or(trimmed);
        let mut parts = trimmed.trim_end_matches('/').splitn(2, '/');
        let owner = parts.next()?.trim();
        let name = parts.next()?.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self { owner: owner.to_string(), name: name.to_string() })
    }
}

/// Blocking contents client. Cheap to clone; requests run on worker threads.
#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    token: Option<SecretString>,
}

impl GithubClient {
    /// Without a token, requests go out unauthenticated (public repos only).
    pub fn new(token: Option<SecretString>) -> Self {
        Self { http: Client::new(), token }
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, GithubError> {
        let mut req = self.http.get(url).header("User-Agent", GITHUB_USER_AGENT);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", token.expose_secret()));
        }
        let response = req.send()?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(GithubError::Api { status, body });
        }
        Ok(response)
    }

    fn contents_url(repo: &RepoRef, path: &str) -> String {
        format!("{}/repos/{}/{}/contents/{}", GITHUB_API_ROOT, repo.owner, repo.name, path)
    }

    /// Fetch the directory listing under `path` (root = `""`), in API order.
    pub fn list_dir(&self, repo: &RepoRef, path: &str) -> Result<Vec<ContentsEntry>, GithubError> {
        let response = self.get(&Self::contents_url(repo, path))?;
        response.json::<Vec<ContentsEntry>>().map_err(|e| GithubError::Parse(e.to_string()))
    }

    /// Fetch and decode the file at `path` to plain text.
    pub fn file_content(&self, repo: &RepoRef, path: &str) -> Result<String, GithubError> {
        let response = self.get(&Self::contents_url(repo, path))?;
        let body = response.json::<FileBody>().map_err(|e| GithubError::Parse(e.to_string()))?;
        decode_content(&body.content)
    }

    /// Build the assistant's context snapshot: every top-level plain file,
    /// fetched in listing order and concatenated with a `File:` separator.
    /// Any single failure aborts the whole build.
    pub fn build_snapshot(&self, repo: &RepoRef) -> Result<String, GithubError> {
        let entries = self.list_dir(repo, "")?;
        let mut snapshot = String::new();
        for entry in entries.iter().filter(|e| e.kind == EntryKind::File) {
            let content = self.file_content(repo, &entry.path)?;
            push_snapshot_block(&mut snapshot, &entry.name, &content);
        }
        Ok(snapshot)
    }
}

/// Append one `File: <name>` block to a snapshot under construction.
fn push_snapshot_block(snapshot: &mut String, name: &str, content: &str) {
    snapshot.push_str("File: ");
    snapshot.push_str(name);
    snapshot.push_str("\n\n");
    snapshot.push_str(content);
    snapshot.push_str("\n\n");
}

/// Decode a contents-API base64 body. The API wraps base64 at 60 columns, so
/// whitespace is stripped before decoding.
fn decode_content(raw: &str) -> Result<String, GithubError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(compact.as_bytes()).map_err(|e| GithubError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| GithubError::Decode(e.to_string()))
}
