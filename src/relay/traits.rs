// Collaborator traits - the narrow interface to the extraction tools

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::errors::RelayError;
use super::models::{
    FetchedVideo, Highlight, InstagramPost, InstagramProfile, MediaFormat, StoryItem, VideoProbe,
};

/// Instagram metadata lookups and file-producing operations
#[async_trait]
pub trait InstagramSource: Send + Sync {
    /// Name of the collaborator (for logging)
    fn name(&self) -> &'static str;

    async fn post(&self, shortcode: &str) -> Result<InstagramPost, RelayError>;

    async fn profile(&self, username: &str) -> Result<InstagramProfile, RelayError>;

    /// Currently active story items of a profile
    async fn stories(&self, username: &str) -> Result<Vec<StoryItem>, RelayError>;

    /// Highlight collections of a profile (items not included)
    async fn highlights(&self, username: &str) -> Result<Vec<Highlight>, RelayError>;

    async fn highlight_items(
        &self,
        username: &str,
        highlight_id: &str,
    ) -> Result<Vec<StoryItem>, RelayError>;

    /// Download a post into `target`; returns the files written
    async fn download_post(&self, shortcode: &str, target: &Path)
        -> Result<Vec<PathBuf>, RelayError>;

    /// Download one story item, looked up in the active stories or in `highlight_id`
    async fn download_story_item(
        &self,
        username: &str,
        mediaid: &str,
        highlight_id: Option<&str>,
        target: &Path,
    ) -> Result<Vec<PathBuf>, RelayError>;

    async fn download_profile_pic(
        &self,
        username: &str,
        target: &Path,
    ) -> Result<Vec<PathBuf>, RelayError>;
}

/// Generic video platform (YouTube and anything yt-dlp understands)
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Name of the collaborator (for logging)
    fn name(&self) -> &'static str;

    /// Best-quality metadata without downloading
    async fn probe(&self, url: &str) -> Result<VideoProbe, RelayError>;

    /// Download and transcode into `target`
    async fn fetch(
        &self,
        url: &str,
        format: MediaFormat,
        target: &Path,
    ) -> Result<FetchedVideo, RelayError>;
}
