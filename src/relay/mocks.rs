// Fake collaborators for relay and HTTP tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::errors::RelayError;
use super::models::{
    FetchedVideo, Highlight, InstagramPost, InstagramProfile, MediaFormat, StoryItem, VideoProbe,
};
use super::traits::{InstagramSource, VideoSource};

/// How a fake download behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Write the file and report it
    Report,
    /// Write the file but report nothing, forcing the directory scan
    Silent,
    /// Report success without writing anything
    Missing,
}

pub fn video_post(shortcode: &str, owner: &str, caption: Option<&str>, duration: f64) -> InstagramPost {
    InstagramPost {
        shortcode: shortcode.to_string(),
        owner_username: owner.to_string(),
        caption: caption.map(str::to_string),
        is_video: true,
        video_duration: Some(duration),
        url: format!("https://cdn.example/{}.jpg", shortcode),
        video_url: Some(format!("https://cdn.example/{}.mp4", shortcode)),
    }
}

pub fn image_post(shortcode: &str, owner: &str) -> InstagramPost {
    InstagramPost {
        is_video: false,
        video_duration: None,
        video_url: None,
        ..video_post(shortcode, owner, None, 0.0)
    }
}

pub fn story_item(mediaid: &str, is_video: bool) -> StoryItem {
    StoryItem {
        mediaid: mediaid.to_string(),
        is_video,
        video_duration: is_video.then_some(15.0),
        url: format!("https://cdn.example/story/{}.jpg", mediaid),
        video_url: is_video.then(|| format!("https://cdn.example/story/{}.mp4", mediaid)),
    }
}

#[derive(Default)]
pub struct FakeInstagram {
    posts: HashMap<String, InstagramPost>,
    profiles: HashMap<String, InstagramProfile>,
    stories: HashMap<String, Vec<StoryItem>>,
    highlights: HashMap<String, Vec<(Highlight, Vec<StoryItem>)>>,
    failure: Option<RelayError>,
    file_mode: Option<FileMode>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeInstagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(mut self, post: InstagramPost) -> Self {
        self.posts.insert(post.shortcode.clone(), post);
        self
    }

    pub fn with_profile(mut self, username: &str, pic_url: &str) -> Self {
        self.profiles.insert(
            username.to_string(),
            InstagramProfile {
                username: username.to_string(),
                profile_pic_url: pic_url.to_string(),
            },
        );
        self
    }

    pub fn with_stories(mut self, username: &str, items: Vec<StoryItem>) -> Self {
        self.stories.insert(username.to_string(), items);
        self
    }

    pub fn with_highlight(
        mut self,
        username: &str,
        unique_id: &str,
        title: Option<&str>,
        items: Vec<StoryItem>,
    ) -> Self {
        let highlight = Highlight {
            unique_id: unique_id.to_string(),
            title: title.map(str::to_string),
        };
        self.highlights
            .entry(username.to_string())
            .or_default()
            .push((highlight, items));
        self
    }

    /// Every call fails with `error`
    pub fn failing(mut self, error: RelayError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn with_file_mode(mut self, mode: FileMode) -> Self {
        self.file_mode = Some(mode);
        self
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) -> Result<(), RelayError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn write(&self, target: &Path, name: &str, bytes: &[u8]) -> Result<Vec<PathBuf>, RelayError> {
        let path = target.join(name);
        match self.file_mode.unwrap_or(FileMode::Report) {
            FileMode::Report => {
                std::fs::write(&path, bytes)?;
                Ok(vec![path])
            }
            FileMode::Silent => {
                std::fs::write(&path, bytes)?;
                Ok(Vec::new())
            }
            FileMode::Missing => Ok(Vec::new()),
        }
    }

    fn items(&self, username: &str, highlight_id: Option<&str>) -> Vec<StoryItem> {
        match highlight_id {
            Some(id) => self
                .highlights
                .get(username)
                .and_then(|hs| hs.iter().find(|(h, _)| h.unique_id == id))
                .map(|(_, items)| items.clone())
                .unwrap_or_default(),
            None => self.stories.get(username).cloned().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl InstagramSource for FakeInstagram {
    fn name(&self) -> &'static str {
        "fake-instagram"
    }

    async fn post(&self, shortcode: &str) -> Result<InstagramPost, RelayError> {
        self.record(format!("post {}", shortcode))?;
        self.posts
            .get(shortcode)
            .cloned()
            .ok_or_else(|| RelayError::NotFound("Post does not exist".to_string()))
    }

    async fn profile(&self, username: &str) -> Result<InstagramProfile, RelayError> {
        self.record(format!("profile {}", username))?;
        self.profiles
            .get(username)
            .cloned()
            .ok_or_else(|| RelayError::NotFound("Profile does not exist".to_string()))
    }

    async fn stories(&self, username: &str) -> Result<Vec<StoryItem>, RelayError> {
        self.record(format!("stories {}", username))?;
        Ok(self.items(username, None))
    }

    async fn highlights(&self, username: &str) -> Result<Vec<Highlight>, RelayError> {
        self.record(format!("highlights {}", username))?;
        Ok(self
            .highlights
            .get(username)
            .map(|hs| hs.iter().map(|(h, _)| h.clone()).collect())
            .unwrap_or_default())
    }

    async fn highlight_items(
        &self,
        username: &str,
        highlight_id: &str,
    ) -> Result<Vec<StoryItem>, RelayError> {
        self.record(format!("highlight-items {} {}", username, highlight_id))?;
        Ok(self.items(username, Some(highlight_id)))
    }

    async fn download_post(
        &self,
        shortcode: &str,
        target: &Path,
    ) -> Result<Vec<PathBuf>, RelayError> {
        self.record(format!("download-post {}", shortcode))?;
        let owner = self
            .posts
            .get(shortcode)
            .map(|p| p.owner_username.clone())
            .unwrap_or_default();
        self.write(target, &format!("{}_{}.mp4", owner, shortcode), b"post-video")
    }

    async fn download_story_item(
        &self,
        username: &str,
        mediaid: &str,
        highlight_id: Option<&str>,
        target: &Path,
    ) -> Result<Vec<PathBuf>, RelayError> {
        self.record(format!("download-story-item {} {}", username, mediaid))?;
        if !self.items(username, highlight_id).iter().any(|i| i.mediaid == mediaid) {
            return Err(RelayError::story_not_found());
        }
        self.write(target, &format!("{}_{}.mp4", username, mediaid), b"story-video")
    }

    async fn download_profile_pic(
        &self,
        username: &str,
        target: &Path,
    ) -> Result<Vec<PathBuf>, RelayError> {
        self.record(format!("download-profile-pic {}", username))?;
        self.write(target, &format!("{}_profile_pic.jpg", username), b"jpeg")
    }
}

pub struct FakeVideo {
    probe: VideoProbe,
    failure: Option<RelayError>,
    file_mode: FileMode,
    /// Extension yt-dlp reports before post-processing renamed the file
    reported_ext: Option<&'static str>,
}

impl FakeVideo {
    pub fn new(id: &str, title: Option<&str>) -> Self {
        Self {
            probe: VideoProbe {
                id: Some(id.to_string()),
                title: title.map(str::to_string),
                ..VideoProbe::default()
            },
            failure: None,
            file_mode: FileMode::Report,
            reported_ext: None,
        }
    }

    pub fn with_probe(mut self, probe: VideoProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn failing(mut self, error: RelayError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn with_file_mode(mut self, mode: FileMode) -> Self {
        self.file_mode = mode;
        self
    }

    pub fn reporting_ext(mut self, ext: &'static str) -> Self {
        self.reported_ext = Some(ext);
        self
    }
}

#[async_trait]
impl VideoSource for FakeVideo {
    fn name(&self) -> &'static str {
        "fake-video"
    }

    async fn probe(&self, _url: &str) -> Result<VideoProbe, RelayError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.probe.clone()),
        }
    }

    async fn fetch(
        &self,
        _url: &str,
        format: MediaFormat,
        target: &Path,
    ) -> Result<FetchedVideo, RelayError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let id = self.probe.id.clone().unwrap_or_default();
        let title = self.probe.title.clone().unwrap_or_else(|| "NA".to_string());
        let stem = format!("{} [{}]", title, id);
        let path = target.join(format!("{}.{}", stem, format.extension()));

        if self.file_mode != FileMode::Missing {
            std::fs::write(&path, format!("{}-bytes", format.extension()))?;
        }

        let reported = path.with_extension(self.reported_ext.unwrap_or(format.extension()));
        Ok(FetchedVideo {
            id: self.probe.id.clone(),
            title: self.probe.title.clone(),
            filepath: match self.file_mode {
                FileMode::Silent => None,
                _ => Some(reported.to_string_lossy().to_string()),
            },
        })
    }
}
