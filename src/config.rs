//! Configuration: environment variables and the YAML prompts file.

use std::env;
use std::fs;

use lazy_static::lazy_static;
use secrecy::SecretString;
use serde::Deserialize;

use crate::constants::DEFAULT_SERVER_URL;

// ============================================================================
// Prompts Configuration
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PromptsConfig {
    /// Fixed instruction prefixed to the repo snapshot for documentation
    /// generation
    pub documentation_prompt: String,
    /// Section-title vocabulary for the document export (matched whole-line,
    /// case-insensitive)
    pub section_titles: Vec<String>,
}

fn load_yaml<T: for<'de> Deserialize<'de>>(path: &str) -> T {
    let content = fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
    serde_yaml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e))
}

lazy_static! {
    pub static ref PROMPTS: PromptsConfig = load_yaml("yamls/prompts.yaml");
}

// ============================================================================
// Environment Configuration
// ============================================================================

/// Values read once at startup from the environment (.env supported).
/// GEMINI_API_KEY is read by the Gemini client itself.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// RoleHub session cookie, verbatim Cookie header value
    pub session_cookie: Option<SecretString>,
    /// Platform server base URL
    pub server_url: String,
}

impl EnvConfig {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self {
            session_cookie: env::var("ROLEHUB_SESSION").ok().filter(|c| !c.is_empty()).map(SecretString::from),
            server_url: env::var("ROLEHUB_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
        }
    }
}
