// URL classifier - decides platform, content subtype and identifiers
//
// Purely lexical: no network access. Instagram URLs are matched against an
// ordered rule table; the first rule whose predicate holds extracts the target.

use url::Url;

use super::errors::RelayError;
use super::models::{ClassificationResult, MediaTarget};

const INSTAGRAM_DOMAIN: &str = "instagram.com";

const POST_MARKERS: &[&str] = &["p", "tv"];
const REEL_MARKERS: &[&str] = &["reel", "reels"];
const STORY_MARKER: &str = "stories";
const HIGHLIGHT_MARKER: &str = "highlights";

/// Upper bound of `/`-separated pieces (scheme and host included) for a profile URL
const PROFILE_MAX_PIECES: usize = 5;

lazy_static::lazy_static! {
    static ref USERNAME_RE: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9._]{1,30}$").unwrap();
}

/// Classify a raw URL
pub fn classify(url: &str) -> Result<ClassificationResult, RelayError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(RelayError::MissingInput);
    }

    if !url.to_lowercase().contains(INSTAGRAM_DOMAIN) {
        return Ok(ClassificationResult {
            target: MediaTarget::Generic {
                url: url.to_string(),
            },
            raw_url: url.to_string(),
        });
    }

    let path = InstagramPath::parse(url)?;
    let rule = RULES
        .iter()
        .find(|rule| (rule.matches)(&path))
        .ok_or_else(RelayError::unsupported_instagram)?;

    tracing::debug!("Instagram URL {} matched rule '{}'", url, rule.name);

    Ok(ClassificationResult {
        target: (rule.extract)(&path)?,
        raw_url: url.to_string(),
    })
}

/// Lexical view of an Instagram URL
#[derive(Debug)]
struct InstagramPath {
    /// Path segments including empty ones (a trailing `/` yields a final "")
    segments: Vec<String>,
    /// Second-to-last segment when the path ends with `/`, else the last one
    candidate: Option<String>,
    story_media_id: Option<String>,
    /// Number of `/`-separated pieces of the URL without query and fragment
    pieces: usize,
}

impl InstagramPath {
    fn parse(raw: &str) -> Result<Self, RelayError> {
        let parsed = Url::parse(raw)
            .or_else(|_| Url::parse(&format!("https://{}", raw)))
            .map_err(|_| RelayError::unsupported_instagram())?;

        let segments: Vec<String> = parsed
            .path_segments()
            .map(|segs| segs.map(str::to_string).collect())
            .unwrap_or_default();

        let ends_with_separator = parsed.path().ends_with('/');
        let candidate = if ends_with_separator {
            segments.len().checked_sub(2).map(|i| segments[i].clone())
        } else {
            segments.last().cloned()
        }
        .filter(|s| !s.is_empty());

        let story_media_id = parsed
            .query_pairs()
            .find(|(key, _)| key == "story_media_id")
            .map(|(_, value)| value.into_owned())
            .filter(|v| !v.is_empty());

        let bare = raw.split(['?', '#']).next().unwrap_or(raw);

        Ok(Self {
            segments,
            candidate,
            story_media_id,
            pieces: bare.split('/').count(),
        })
    }

    fn has_segment(&self, markers: &[&str]) -> bool {
        self.segments.iter().any(|s| markers.contains(&s.as_str()))
    }

    /// Segment immediately after `marker`
    fn segment_after(&self, marker: &str) -> Option<&str> {
        let idx = self.segments.iter().position(|s| s == marker)?;
        self.segments
            .get(idx + 1)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    fn last_non_empty(&self) -> Option<&str> {
        self.segments
            .iter()
            .rev()
            .find(|s| !s.is_empty())
            .map(String::as_str)
    }

    fn shortcode(&self) -> Result<String, RelayError> {
        self.candidate
            .clone()
            .ok_or_else(RelayError::unsupported_instagram)
    }

    fn story_owner(&self) -> Result<String, RelayError> {
        self.segment_after(STORY_MARKER)
            .map(str::to_string)
            .ok_or_else(RelayError::unsupported_instagram)
    }
}

/// A predicate plus extractor; rules are evaluated in table order
struct MatcherRule {
    name: &'static str,
    matches: fn(&InstagramPath) -> bool,
    extract: fn(&InstagramPath) -> Result<MediaTarget, RelayError>,
}

const RULES: &[MatcherRule] = &[
    MatcherRule {
        name: "post",
        matches: |p| p.has_segment(POST_MARKERS),
        extract: |p| {
            Ok(MediaTarget::Post {
                shortcode: p.shortcode()?,
            })
        },
    },
    MatcherRule {
        name: "reel",
        matches: |p| p.has_segment(REEL_MARKERS),
        extract: |p| {
            Ok(MediaTarget::Reel {
                shortcode: p.shortcode()?,
            })
        },
    },
    MatcherRule {
        name: "story",
        matches: |p| p.has_segment(&[STORY_MARKER]) && !p.has_segment(&[HIGHLIGHT_MARKER]),
        extract: |p| {
            let username = p.story_owner()?;
            // Story permalinks carry the media id as the last segment when the
            // query parameter is absent
            let story_media_id = p.story_media_id.clone().or_else(|| {
                p.candidate
                    .clone()
                    .filter(|c| *c != username && c.chars().all(|ch| ch.is_ascii_digit()))
            });
            Ok(MediaTarget::Story {
                username,
                story_media_id,
            })
        },
    },
    MatcherRule {
        name: "highlight",
        matches: |p| p.has_segment(&[HIGHLIGHT_MARKER]),
        extract: |p| {
            Ok(MediaTarget::Highlight {
                username: p.story_owner()?,
                highlight_id: p.shortcode()?,
            })
        },
    },
    MatcherRule {
        name: "profile-picture",
        matches: |p| {
            p.pieces <= PROFILE_MAX_PIECES
                && p
                    .last_non_empty()
                    .map_or(false, |s| USERNAME_RE.is_match(s) && !is_marker(s))
        },
        extract: |p| {
            Ok(MediaTarget::ProfilePicture {
                username: p
                    .last_non_empty()
                    .map(str::to_string)
                    .ok_or_else(RelayError::unsupported_instagram)?,
            })
        },
    },
];

fn is_marker(segment: &str) -> bool {
    POST_MARKERS.contains(&segment)
        || REEL_MARKERS.contains(&segment)
        || segment == STORY_MARKER
        || segment == HIGHLIGHT_MARKER
}
