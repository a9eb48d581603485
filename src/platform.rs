//! RoleHub platform REST client.
//!
//! The platform endpoints are consumed as opaque JSON: session-cookie auth,
//! no retries, tolerant models. The one privileged call is the access-token
//! exchange, which yields the GitHub bearer token for the contents client.

use std::fmt;

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Typed error for platform API operations.
#[derive(Debug)]
pub enum PlatformError {
    /// No session cookie configured; the endpoint requires one
    NoSession,
    /// Network-level failure
    Network(String),
    /// API returned a non-success HTTP status
    Api { status: u16, body: String },
    /// Response body did not match the expected shape
    Parse(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::NoSession => write!(f, "Platform error: no session cookie configured"),
            PlatformError::Network(msg) => write!(f, "Platform network error: {}", msg),
            PlatformError::Api { status, body } => write!(f, "Platform API error {}: {}", status, body),
            PlatformError::Parse(msg) => write!(f, "Platform parse error: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

impl From<reqwest::Error> for PlatformError {
    fn from(e: reqwest::Error) -> Self {
        PlatformError::Network(e.to_string())
    }
}

/// Signed-in platform user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(alias = "login")]
    pub username: String,
}

/// A GitHub repository linked to the signed-in account.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    #[serde(rename = "full_name")]
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
}

/// A job posting ("role") on the board. Only the fields the client shows;
/// the rest of the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePost {
    pub id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub address: String,
    /// Full GitHub link of the repository attached to the posting
    #[serde(default)]
    pub repo_link: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenBody {
    access_token: String,
}

/// Blocking platform client. Cheap to clone; requests run on worker threads.
#[derive(Clone)]
pub struct PlatformClient {
    http: Client,
    base_url: String,
    session_cookie: Option<SecretString>,
}

impl PlatformClient {
    pub fn new(base_url: String, session_cookie: Option<SecretString>) -> Self {
        Self { http: Client::new(), base_url, session_cookie }
    }

    fn get(&self, path: &str, needs_session: bool) -> Result<reqwest::blocking::Response, PlatformError> {
        let mut req = self.http.get(format!("{}{}", self.base_url, path));
        match &self.session_cookie {
            Some(cookie) => req = req.header("Cookie", cookie.expose_secret()),
            None if needs_session => return Err(PlatformError::NoSession),
            None => {}
        }
        let response = req.send()?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(PlatformError::Api { status, body });
        }
        Ok(response)
    }

    /// Who the session cookie belongs to. A 401 means "signed out", which
    /// callers map to `Ready(None)` rather than an error state.
    pub fn current_user(&self) -> Result<User, PlatformError> {
        let response = self.get("/auth/user", true)?;
        response.json::<User>().map_err(|e| PlatformError::Parse(e.to_string()))
    }

    /// Exchange the session for the GitHub bearer token.
    pub fn access_token(&self) -> Result<SecretString, PlatformError> {
        let response = self.get("/auth/access-token", true)?;
        let body = response.json::<AccessTokenBody>().map_err(|e| PlatformError::Parse(e.to_string()))?;
        Ok(SecretString::from(body.access_token))
    }

    /// Repositories linked to the signed-in account.
    pub fn repos(&self) -> Result<Vec<Repo>, PlatformError> {
        let response = self.get("/auth/github/repos", true)?;
        response.json::<Vec<Repo>>().map_err(|e| PlatformError::Parse(e.to_string()))
    }

    /// All open postings on the board (public endpoint).
    pub fn postings(&self) -> Result<Vec<RolePost>, PlatformError> {
        let response = self.get("/api/rolepost/", false)?;
        response.json::<Vec<RolePost>>().map_err(|e| PlatformError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_accepts_login_alias() {
        let u: User = serde_json::from_str(r#"{"login": "octocat"}"#).unwrap();
        assert_eq!(u.username, "octocat");
    }

    #[test]
    fn repo_parses_github_shape_ignoring_extras() {
        let json = r#"{"name": "hello", "full_name": "octocat/hello", "private": true, "html_url": "https://github.com/octocat/hello"}"#;
        let r: Repo = serde_json::from_str(json).unwrap();
        assert_eq!(r.full_name, "octocat/hello");
        assert!(r.private);
    }

    #[test]
    fn role_post_tolerates_missing_fields() {
        let json = r#"{"id": "42", "roles": ["Backend"], "repoLink": "https://github.com/octocat/hello"}"#;
        let p: RolePost = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, "42");
        assert_eq!(p.roles, vec!["Backend".to_string()]);
        assert_eq!(p.repo_link, "https://github.com/octocat/hello");
        assert!(p.tech_stack.is_empty());
        assert!(p.address.is_empty());
    }

    #[test]
    fn access_token_body_is_camel_case() {
        let b: AccessTokenBody = serde_json::from_str(r#"{"accessToken": "gho_abc"}"#).unwrap();
        assert_eq!(b.access_token, "gho_abc");
    }

    #[test]
    fn sessionless_client_refuses_privileged_calls() {
        let client = PlatformClient::new("http://localhost:5000".into(), None);
        assert!(matches!(client.current_user(), Err(PlatformError::NoSession)));
        assert!(matches!(client.access_token(), Err(PlatformError::NoSession)));
    }
}
