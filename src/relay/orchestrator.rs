// MediaRelay - routes classified URLs to the matching collaborator

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::classifier::classify;
use super::errors::RelayError;
use super::format_selector::FormatSelector;
use super::models::{
    ClassificationResult, MediaFormat, MediaMetadata, MediaTarget, Platform, StoryItem,
    VisualMedia,
};
use super::staging::{locate_output, DownloadedFile, StagingArea};
use super::traits::{InstagramSource, VideoSource};

const DEFAULT_POST_TITLE: &str = "Instagram Post";
const INSTAGRAM_QUALITY: &str = "HD";

pub struct MediaRelay {
    instagram: Arc<dyn InstagramSource>,
    video: Arc<dyn VideoSource>,
    staging: StagingArea,
}

impl MediaRelay {
    pub fn new(
        instagram: Arc<dyn InstagramSource>,
        video: Arc<dyn VideoSource>,
        staging: StagingArea,
    ) -> Self {
        Self {
            instagram,
            video,
            staging,
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Classify `url` and return its metadata
    pub async fn check(&self, url: &str) -> Result<MediaMetadata, RelayError> {
        let classified = classify(url)?;
        tracing::info!(
            "Checking {} {:?} ({}) via {}",
            classified.platform(),
            classified.subtype(),
            classified.identifier(),
            self.collaborator_for(&classified)
        );
        self.fetch_metadata(&classified)
            .await
            .map_err(|e| e.for_platform(classified.platform()))
    }

    /// Classify `url`, validate `format` and stage the file
    pub async fn download(&self, url: &str, format: &str) -> Result<DownloadedFile, RelayError> {
        let classified = classify(url)?;
        let format: MediaFormat = format.parse()?;
        tracing::info!(
            "Downloading {} {:?} ({}) as {} via {}",
            classified.platform(),
            classified.subtype(),
            classified.identifier(),
            format,
            self.collaborator_for(&classified)
        );
        self.download_media(&classified, format)
            .await
            .map_err(|e| e.for_platform(classified.platform()))
    }

    /// Name of the collaborator that serves `classified`
    pub fn collaborator_for(&self, classified: &ClassificationResult) -> &'static str {
        match classified.platform() {
            Platform::Instagram => self.instagram.name(),
            Platform::YouTube => self.video.name(),
        }
    }

    pub async fn fetch_metadata(
        &self,
        classified: &ClassificationResult,
    ) -> Result<MediaMetadata, RelayError> {
        match &classified.target {
            MediaTarget::Post { shortcode } | MediaTarget::Reel { shortcode } => {
                let post = self.instagram.post(shortcode).await?;
                let title = post
                    .caption
                    .clone()
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_POST_TITLE.to_string());
                Ok(instagram_metadata(title, &post))
            }
            MediaTarget::Story {
                username,
                story_media_id,
            } => {
                let item = self.find_story_item(username, story_media_id.as_deref()).await?;
                Ok(instagram_metadata(format!("Story by {}", username), &item))
            }
            MediaTarget::Highlight {
                username,
                highlight_id,
            } => {
                let (title, item) = self.first_highlight_item(username, highlight_id).await?;
                let title = title.unwrap_or_else(|| format!("Highlight by {}", username));
                Ok(instagram_metadata(title, &item))
            }
            MediaTarget::ProfilePicture { username } => {
                let profile = self.instagram.profile(username).await?;
                Ok(MediaMetadata {
                    title: format!("Profile Picture of {}", username),
                    duration: 0.0,
                    thumbnail: profile.profile_pic_url,
                    quality: INSTAGRAM_QUALITY.to_string(),
                })
            }
            MediaTarget::Generic { url } => {
                let probe = self.video.probe(url).await?;
                Ok(MediaMetadata {
                    title: probe.title.unwrap_or_else(|| "Unknown Title".to_string()),
                    duration: probe.duration.unwrap_or(0.0),
                    thumbnail: probe.thumbnail.unwrap_or_default(),
                    quality: probe
                        .resolution
                        .unwrap_or_else(|| "Unknown Quality".to_string()),
                })
            }
        }
    }

    pub async fn download_media(
        &self,
        classified: &ClassificationResult,
        format: MediaFormat,
    ) -> Result<DownloadedFile, RelayError> {
        match &classified.target {
            MediaTarget::Post { shortcode } | MediaTarget::Reel { shortcode } => {
                let post = self.instagram.post(shortcode).await?;
                require_video(&post, "Only video posts are supported")?;

                let workspace = self.staging.workspace().await?;
                let reported = self
                    .instagram
                    .download_post(shortcode, workspace.path())
                    .await?;
                let path = locate_output(workspace.path(), &reported, "mp4", shortcode).await;
                let name = format!("{}_{}.mp4", post.owner_username, shortcode);
                DownloadedFile::verify(workspace, path, name).await
            }
            MediaTarget::Story {
                username,
                story_media_id,
            } => {
                let item = self.find_story_item(username, story_media_id.as_deref()).await?;
                require_video(&item, "Only video stories are supported")?;

                let workspace = self.staging.workspace().await?;
                let reported = self
                    .instagram
                    .download_story_item(username, &item.mediaid, None, workspace.path())
                    .await?;
                let path =
                    locate_output(workspace.path(), &reported, "mp4", &item.mediaid).await;
                let name = format!("{}_story_{}.mp4", username, item.mediaid);
                DownloadedFile::verify(workspace, path, name).await
            }
            MediaTarget::Highlight {
                username,
                highlight_id,
            } => {
                let (_, item) = self.first_highlight_item(username, highlight_id).await?;
                require_video(&item, "Only video highlights are supported")?;

                let workspace = self.staging.workspace().await?;
                let reported = self
                    .instagram
                    .download_story_item(
                        username,
                        &item.mediaid,
                        Some(highlight_id),
                        workspace.path(),
                    )
                    .await?;
                let path =
                    locate_output(workspace.path(), &reported, "mp4", &item.mediaid).await;
                let name = format!("{}_highlight_{}.mp4", username, highlight_id);
                DownloadedFile::verify(workspace, path, name).await
            }
            MediaTarget::ProfilePicture { username } => {
                let workspace = self.staging.workspace().await?;
                let reported = self
                    .instagram
                    .download_profile_pic(username, workspace.path())
                    .await?;
                let path = locate_output(workspace.path(), &reported, "jpg", username).await;
                let name = format!("{}_profile_pic.jpg", username);
                DownloadedFile::verify(workspace, path, name).await
            }
            MediaTarget::Generic { url } => {
                let workspace = self.staging.workspace().await?;
                let fetched = self.video.fetch(url, format, workspace.path()).await?;

                let reported: Vec<PathBuf> = fetched
                    .filepath
                    .iter()
                    .map(|p| FormatSelector::force_extension(Path::new(p), format))
                    .collect();
                let identifier = fetched.id.clone().unwrap_or_default();
                let path = locate_output(
                    workspace.path(),
                    &reported,
                    format.extension(),
                    &identifier,
                )
                .await;

                let title = fetched
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| "media".to_string());
                let name = format!("{}.{}", title, format.extension());
                DownloadedFile::verify(workspace, path, name).await
            }
        }
    }

    /// Active story item whose media id matches the URL parameter
    async fn find_story_item(
        &self,
        username: &str,
        story_media_id: Option<&str>,
    ) -> Result<StoryItem, RelayError> {
        let wanted = story_media_id.ok_or_else(RelayError::story_not_found)?;
        self.instagram
            .stories(username)
            .await?
            .into_iter()
            .find(|item| item.mediaid == wanted)
            .ok_or_else(RelayError::story_not_found)
    }

    /// Title and first item of the highlight with `highlight_id`
    async fn first_highlight_item(
        &self,
        username: &str,
        highlight_id: &str,
    ) -> Result<(Option<String>, StoryItem), RelayError> {
        let highlight = self
            .instagram
            .highlights(username)
            .await?
            .into_iter()
            .find(|h| h.unique_id == highlight_id)
            .ok_or_else(RelayError::highlight_not_found)?;

        let item = self
            .instagram
            .highlight_items(username, &highlight.unique_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(RelayError::highlight_empty)?;

        Ok((highlight.title.filter(|t| !t.is_empty()), item))
    }
}

fn instagram_metadata(title: String, media: &impl VisualMedia) -> MediaMetadata {
    MediaMetadata {
        title,
        duration: media.duration_seconds(),
        thumbnail: media.preview_url(),
        quality: INSTAGRAM_QUALITY.to_string(),
    }
}

fn require_video(media: &impl VisualMedia, message: &str) -> Result<(), RelayError> {
    if media.is_video() {
        Ok(())
    } else {
        Err(RelayError::UnsupportedMediaKind(message.to_string()))
    }
}
