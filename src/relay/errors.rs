// Error types for the relay and its collaborators

use thiserror::Error;

use super::models::Platform;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Request arrived without a URL
    #[error("No URL provided")]
    MissingInput,

    /// Instagram URL that matches none of the known content shapes
    #[error("{0}")]
    UnsupportedContentType(String),

    /// Content was classified but cannot be delivered in the requested kind
    /// (e.g. an image-only post requested as video)
    #[error("{0}")]
    UnsupportedMediaKind(String),

    /// Requested download format is neither mp4 nor mp3
    #[error("Unsupported format: {0}")]
    InvalidFormat(String),

    /// Profile, story or highlight does not exist or has expired
    #[error("{0}")]
    NotFound(String),

    /// Login required
    #[error("{0}")]
    Unauthorized(String),

    /// Private content the relay cannot see
    #[error("{0}")]
    Forbidden(String),

    /// Upstream platform throttled the request
    #[error("{0}")]
    RateLimited(String),

    /// Collaborator reported success but the output file is missing or empty
    #[error("File not downloaded")]
    FileNotProduced(String),

    /// yt-dlp, python or instaloader is not installed
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Any other collaborator failure, message passed through
    #[error("{0}")]
    Upstream(String),

    /// Staging directory could not be prepared
    #[error("Staging error: {0}")]
    Staging(String),
}

impl RelayError {
    pub fn story_not_found() -> Self {
        Self::NotFound("Story not found or has expired".to_string())
    }

    pub fn highlight_not_found() -> Self {
        Self::NotFound("Highlight not found".to_string())
    }

    pub fn highlight_empty() -> Self {
        Self::NotFound("Highlight is empty".to_string())
    }

    pub fn unsupported_instagram() -> Self {
        Self::UnsupportedContentType("Unsupported Instagram content type".to_string())
    }

    /// Give generic upstream failures the platform's wording.
    /// Classified conditions (not found, rate limited, ...) are left untouched.
    pub fn for_platform(self, platform: Platform) -> Self {
        match (self, platform) {
            (Self::Upstream(msg), Platform::Instagram)
                if !msg.starts_with("Failed to fetch Instagram content") =>
            {
                Self::Upstream(format!("Failed to fetch Instagram content: {}", msg))
            }
            (other, _) => other,
        }
    }
}

impl From<std::io::Error> for RelayError {
    fn from(e: std::io::Error) -> Self {
        Self::Staging(e.to_string())
    }
}
