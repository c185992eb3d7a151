// Upstream diagnostics - classifies collaborator failures
//
// Analyzes error text from yt-dlp / instaloader to determine:
// - Which platform condition caused it (not found, private, throttled, ...)
// - Which relay error it maps to

use regex::Regex;

use crate::relay::errors::RelayError;

/// Conditions an upstream platform can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamCondition {
    /// Profile / media does not exist (HTTP 404, deleted, expired)
    NotFound,

    /// Login required to see the content
    LoginRequired,

    /// Private profile not followed by the session
    PrivateContent,

    /// HTTP 403 Forbidden - general access denied
    Forbidden,

    /// Rate limiting (429) or the platform blocking the request
    RateLimited,

    /// Network timeout
    NetworkTimeout,

    /// Anything else
    Unknown,
}

impl UpstreamCondition {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Content not found",
            Self::LoginRequired => "Login required",
            Self::PrivateContent => "Private content",
            Self::Forbidden => "Access denied (HTTP 403)",
            Self::RateLimited => "Rate limited by the platform",
            Self::NetworkTimeout => "Network timeout",
            Self::Unknown => "Unknown upstream error",
        }
    }

    /// Map to the relay taxonomy, keeping `message` for the pass-through cases
    pub fn into_error(self, message: &str) -> RelayError {
        match self {
            Self::NotFound => RelayError::NotFound(message.to_string()),
            Self::LoginRequired => RelayError::Unauthorized(message.to_string()),
            Self::PrivateContent | Self::Forbidden => RelayError::Forbidden(message.to_string()),
            Self::RateLimited => RelayError::RateLimited(message.to_string()),
            Self::NetworkTimeout | Self::Unknown => RelayError::Upstream(message.to_string()),
        }
    }
}

lazy_static::lazy_static! {
    static ref HTTP_STATUS_RE: Regex = Regex::new(r"(?i)HTTP(?: Error)?\s*:?\s*(\d{3})").unwrap();
}

/// Extract an HTTP status code mentioned in the error text
pub fn http_status(error: &str) -> Option<u16> {
    HTTP_STATUS_RE
        .captures(error)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Analyze error message and return the upstream condition
pub fn diagnose_error(error: &str) -> Option<UpstreamCondition> {
    if error.trim().is_empty() {
        return None;
    }

    let lower = error.to_lowercase();

    // Explicit status codes are the most reliable signal
    match http_status(error) {
        Some(404) | Some(410) => return Some(UpstreamCondition::NotFound),
        Some(401) => return Some(UpstreamCondition::LoginRequired),
        Some(429) => return Some(UpstreamCondition::RateLimited),
        _ => {}
    }

    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("profile is private")
        || lower.contains("private profile")
        || lower.contains("sign in if you've been granted access")
    {
        return Some(UpstreamCondition::PrivateContent);
    }

    if lower.contains("login required")
        || lower.contains("login_required")
        || lower.contains("sign in to confirm")
        || lower.contains("requires login")
        || lower.contains("use --cookies")
    {
        return Some(UpstreamCondition::LoginRequired);
    }

    if lower.contains("does not exist")
        || lower.contains("not found")
        || lower.contains("video unavailable")
        || lower.contains("video is unavailable")
        || lower.contains("has been removed")
        || lower.contains("no longer available")
    {
        return Some(UpstreamCondition::NotFound);
    }

    if lower.contains("rate limit")
        || lower.contains("too many requests")
        || lower.contains("please wait a few minutes")
        || lower.contains("unusual traffic")
    {
        return Some(UpstreamCondition::RateLimited);
    }

    if http_status(error) == Some(403) || lower.contains("forbidden") {
        return Some(UpstreamCondition::Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
    {
        return Some(UpstreamCondition::NetworkTimeout);
    }

    Some(UpstreamCondition::Unknown)
}

/// Classify collaborator stderr into a relay error.
/// Keeps the first `ERROR:` line (or the first line) as the user-facing message.
pub fn classify_failure(error: &str) -> RelayError {
    let message = error
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| error.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("Unknown error")
        .to_string();

    let condition = diagnose_error(error).unwrap_or(UpstreamCondition::Unknown);
    tracing::warn!("{}: {}", condition.description(), message);
    condition.into_error(&message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_429_detection() {
        let error = "ERROR: [youtube] abc: HTTP Error 429: Too Many Requests";
        assert_eq!(diagnose_error(error), Some(UpstreamCondition::RateLimited));
    }

    #[test]
    fn test_404_detection() {
        let error = "ERROR: Unable to download webpage: HTTP Error 404: Not Found";
        assert_eq!(diagnose_error(error), Some(UpstreamCondition::NotFound));
    }

    #[test]
    fn test_403_detection() {
        let error = "ERROR: unable to download video data: HTTP Error 403: Forbidden";
        assert_eq!(diagnose_error(error), Some(UpstreamCondition::Forbidden));
    }

    #[test]
    fn test_private_detection() {
        let error = "ERROR: [youtube] xyz: Private video. Sign in if you've been granted access";
        assert_eq!(diagnose_error(error), Some(UpstreamCondition::PrivateContent));
    }

    #[test]
    fn test_login_detection() {
        let error = "ERROR: [Instagram] abc: Requested content is not available, rate-limit reached or login required. Use --cookies";
        assert_eq!(diagnose_error(error), Some(UpstreamCondition::LoginRequired));
    }

    #[test]
    fn test_unavailable_detection() {
        let error = "ERROR: [youtube] xyz: Video unavailable";
        assert_eq!(diagnose_error(error), Some(UpstreamCondition::NotFound));
    }

    #[test]
    fn test_timeout_detection() {
        let error = "Timed out after 30s";
        assert_eq!(diagnose_error(error), Some(UpstreamCondition::NetworkTimeout));
    }

    #[test]
    fn test_empty_error() {
        assert_eq!(diagnose_error(""), None);
    }

    #[test]
    fn test_condition_descriptions() {
        let condition = diagnose_error("ERROR: HTTP Error 429: Too Many Requests").unwrap();
        assert_eq!(condition.description(), "Rate limited by the platform");
        assert_eq!(UpstreamCondition::Forbidden.description(), "Access denied (HTTP 403)");
    }

    #[test]
    fn test_http_status_extraction() {
        assert_eq!(http_status("HTTP Error 503: Service Unavailable"), Some(503));
        assert_eq!(http_status("no status here"), None);
    }

    #[test]
    fn test_classify_failure_keeps_error_line() {
        let stderr = "WARNING: something\nERROR: [generic] Unsupported URL: https://example.com\n";
        assert_eq!(
            classify_failure(stderr),
            RelayError::Upstream("ERROR: [generic] Unsupported URL: https://example.com".to_string())
        );
    }
}
