// =============================================================================
// REMOTE SERVICES
// =============================================================================

/// GitHub REST API root
pub const GITHUB_API_ROOT: &str = "https://api.github.com";

/// User-Agent sent on every GitHub request (the API rejects anonymous agents)
pub const GITHUB_USER_AGENT: &str = "rolehub-ai/0.1";

/// Gemini generateContent API root
pub const GEMINI_API_ROOT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for chat and documentation generation
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default RoleHub platform server (overridden by ROLEHUB_SERVER_URL)
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

// =============================================================================
// CONTEXT & TOKEN MANAGEMENT
// =============================================================================

/// Average characters per token for token estimation
pub const CHARS_PER_TOKEN: f32 = 4.0;

/// Number of most recent conversation messages serialized into each
/// generation request. The full log stays in memory for display; only this
/// window rides along as request context.
pub const HISTORY_WINDOW_MESSAGES: usize = 20;

// =============================================================================
// SCROLLING
// =============================================================================

/// Scroll amount for arrow keys
pub const SCROLL_ARROW_AMOUNT: u16 = 1;

/// Scroll amount for PageUp/PageDown
pub const SCROLL_PAGE_AMOUNT: u16 = 10;

// =============================================================================
// EVENT LOOP
// =============================================================================

/// Timeout for the crossterm event poll between background-channel drains
/// (milliseconds)
pub const EVENT_POLL_MS: u64 = 50;

/// Minimum interval between renders while streaming (milliseconds)
pub const RENDER_THROTTLE_MS: u64 = 33;

// =============================================================================
// CHAT
// =============================================================================

/// Placeholder appended to history when a stream fails
pub const STREAM_ERROR_PLACEHOLDER: &str = "An error occurred. Please try again.";
