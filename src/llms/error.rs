use std::fmt;

/// Typed error for generation streaming.
#[derive(Debug)]
pub enum LlmError {
    /// GEMINI_API_KEY not configured
    MissingKey,
    /// Network-level failure (DNS, connection, timeout)
    Network(String),
    /// API returned a non-success HTTP status
    Api { status: u16, body: String },
    /// Error reading from the SSE stream
    StreamRead(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::MissingKey => write!(f, "GEMINI_API_KEY not set"),
            LlmError::Network(msg) => write!(f, "Network error: {}", msg),
            LlmError::Api { status, body } => write!(f, "API error {}: {}", status, body),
            LlmError::StreamRead(msg) => write!(f, "Stream read error: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_key() {
        assert_eq!(LlmError::MissingKey.to_string(), "GEMINI_API_KEY not set");
    }

    #[test]
    fn display_api() {
        let e = LlmError::Api { status: 429, body: "quota".into() };
        assert_eq!(e.to_string(), "API error 429: quota");
    }
}
