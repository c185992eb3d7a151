// Common data models for the relay

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::errors::RelayError;

/// Platform a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    YouTube,
    Instagram,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YouTube => write!(f, "youtube"),
            Self::Instagram => write!(f, "instagram"),
        }
    }
}

/// Content category of a URL within its platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subtype {
    Post,
    Reel,
    Story,
    Highlight,
    ProfilePicture,
    Generic,
}

/// What a URL points at, with the identifiers each branch needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaTarget {
    Post { shortcode: String },
    Reel { shortcode: String },
    Story {
        username: String,
        /// `story_media_id` query parameter, matched against live story items
        story_media_id: Option<String>,
    },
    Highlight { username: String, highlight_id: String },
    ProfilePicture { username: String },
    /// Anything that is not Instagram; handed whole to yt-dlp
    Generic { url: String },
}

/// Routing decision produced by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub target: MediaTarget,
    pub raw_url: String,
}

impl ClassificationResult {
    pub fn platform(&self) -> Platform {
        match self.target {
            MediaTarget::Generic { .. } => Platform::YouTube,
            _ => Platform::Instagram,
        }
    }

    pub fn subtype(&self) -> Subtype {
        match self.target {
            MediaTarget::Post { .. } => Subtype::Post,
            MediaTarget::Reel { .. } => Subtype::Reel,
            MediaTarget::Story { .. } => Subtype::Story,
            MediaTarget::Highlight { .. } => Subtype::Highlight,
            MediaTarget::ProfilePicture { .. } => Subtype::ProfilePicture,
            MediaTarget::Generic { .. } => Subtype::Generic,
        }
    }

    /// Shortcode, username, highlight id or the URL itself
    pub fn identifier(&self) -> &str {
        match &self.target {
            MediaTarget::Post { shortcode } | MediaTarget::Reel { shortcode } => shortcode,
            MediaTarget::Story { username, .. } => username,
            MediaTarget::Highlight { highlight_id, .. } => highlight_id,
            MediaTarget::ProfilePicture { username } => username,
            MediaTarget::Generic { url } => url,
        }
    }
}

/// Metadata returned by `/check`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: String,
    /// Seconds; 0 for still images
    #[serde(serialize_with = "serialize_duration")]
    pub duration: f64,
    pub thumbnail: String,
    pub quality: String,
}

/// Whole durations go out as integers (`12`, not `12.0`)
fn serialize_duration<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && *value >= 0.0 && *value <= u64::MAX as f64 {
        serializer.serialize_u64(*value as u64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Container requested from `/download`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    #[default]
    Mp4,
    Mp3,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MediaFormat {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "mp4" => Ok(Self::Mp4),
            "mp3" => Ok(Self::Mp3),
            other => Err(RelayError::InvalidFormat(other.to_string())),
        }
    }
}

/// Post or reel as reported by instaloader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstagramPost {
    pub shortcode: String,
    pub owner_username: String,
    pub caption: Option<String>,
    pub is_video: bool,
    pub video_duration: Option<f64>,
    /// Display image URL
    pub url: String,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstagramProfile {
    pub username: String,
    pub profile_pic_url: String,
}

/// Single item of a story or highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryItem {
    /// Numeric media id, kept as text to compare with URL parameters
    pub mediaid: String,
    pub is_video: bool,
    pub video_duration: Option<f64>,
    pub url: String,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub unique_id: String,
    pub title: Option<String>,
}

/// Anything with the image/video shape shared by posts and story items
pub trait VisualMedia {
    fn is_video(&self) -> bool;
    fn video_duration(&self) -> Option<f64>;
    fn image_url(&self) -> &str;
    fn video_url(&self) -> Option<&str>;

    /// Duration in seconds, 0 for images
    fn duration_seconds(&self) -> f64 {
        if self.is_video() {
            self.video_duration().unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Video URL for videos, image URL otherwise
    fn preview_url(&self) -> String {
        match (self.is_video(), self.video_url()) {
            (true, Some(url)) => url.to_string(),
            _ => self.image_url().to_string(),
        }
    }
}

impl VisualMedia for InstagramPost {
    fn is_video(&self) -> bool {
        self.is_video
    }
    fn video_duration(&self) -> Option<f64> {
        self.video_duration
    }
    fn image_url(&self) -> &str {
        &self.url
    }
    fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }
}

impl VisualMedia for StoryItem {
    fn is_video(&self) -> bool {
        self.is_video
    }
    fn video_duration(&self) -> Option<f64> {
        self.video_duration
    }
    fn image_url(&self) -> &str {
        &self.url
    }
    fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }
}

/// Best-quality metadata probe from yt-dlp (no download)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoProbe {
    pub id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub resolution: Option<String>,
}

/// Result of a yt-dlp download
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedVideo {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Final path as printed by yt-dlp after post-processing
    pub filepath: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_serializes_whole_numbers_as_integers() {
        let meta = MediaMetadata {
            title: "Hello".to_string(),
            duration: 12.0,
            thumbnail: "https://cdn/v.mp4".to_string(),
            quality: "HD".to_string(),
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Hello","duration":12,"thumbnail":"https://cdn/v.mp4","quality":"HD"}"#
        );
    }

    #[test]
    fn test_duration_keeps_fractions() {
        let meta = MediaMetadata {
            title: "t".to_string(),
            duration: 12.5,
            thumbnail: String::new(),
            quality: "HD".to_string(),
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["duration"], serde_json::json!(12.5));
    }

    #[test]
    fn test_media_format_parsing() {
        assert_eq!("mp3".parse::<MediaFormat>().unwrap(), MediaFormat::Mp3);
        assert_eq!("MP4".parse::<MediaFormat>().unwrap(), MediaFormat::Mp4);
        assert_eq!("".parse::<MediaFormat>().unwrap(), MediaFormat::Mp4);
        assert_eq!(
            "webm".parse::<MediaFormat>(),
            Err(RelayError::InvalidFormat("webm".to_string()))
        );
    }

    #[test]
    fn test_image_post_preview_is_image() {
        let post = InstagramPost {
            shortcode: "ABC".to_string(),
            owner_username: "alice".to_string(),
            caption: None,
            is_video: false,
            video_duration: Some(3.0),
            url: "https://cdn/img.jpg".to_string(),
            video_url: Some("https://cdn/v.mp4".to_string()),
        };
        assert_eq!(post.duration_seconds(), 0.0);
        assert_eq!(post.preview_url(), "https://cdn/img.jpg");
    }
}
