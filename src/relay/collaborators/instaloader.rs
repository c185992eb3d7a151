// instaloader collaborator - Instagram through a small python bridge
//
// The bridge script is embedded and run with `python3 -c`. It prints one JSON
// document on success, or `{"kind","message"}` on stderr with exit code 1.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::diagnostics::classify_failure;
use crate::config::RelayConfig;
use crate::relay::errors::RelayError;
use crate::relay::models::{Highlight, InstagramPost, InstagramProfile, StoryItem};
use crate::relay::tools::{self, ToolType};
use crate::relay::traits::InstagramSource;
use crate::relay::utils::run_output_with_timeout;

const BRIDGE_SCRIPT: &str = include_str!("instaloader_bridge.py");

/// Failure report written by the bridge on stderr
#[derive(Debug, Deserialize)]
struct BridgeFailure {
    kind: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WrittenFiles {
    files: Vec<PathBuf>,
}

pub struct InstaloaderBridge {
    python_cmd: String,
    probe_timeout: u64,
    download_timeout: u64,
}

impl InstaloaderBridge {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            python_cmd: config
                .python_cmd
                .clone()
                .or_else(|| std::env::var("YTDLP_PYTHON").ok())
                .unwrap_or_else(|| tools::resolve(ToolType::Python)),
            probe_timeout: config.probe_timeout_secs,
            download_timeout: config.download_timeout_secs,
        }
    }

    pub fn python(&self) -> &str {
        &self.python_cmd
    }

    fn build_args(command: &str, params: &[&str]) -> Vec<String> {
        let mut args = vec![
            "-c".to_string(),
            BRIDGE_SCRIPT.to_string(),
            command.to_string(),
        ];
        args.extend(params.iter().map(|p| p.to_string()));
        args
    }

    async fn call<T: DeserializeOwned>(
        &self,
        command: &str,
        params: &[&str],
        cwd: Option<&Path>,
        timeout_secs: u64,
    ) -> Result<T, RelayError> {
        tracing::debug!("[instaloader] {} {}", command, params.join(" "));

        let args = Self::build_args(command, params);
        let out = run_output_with_timeout(&self.python_cmd, &args, cwd, timeout_secs).await?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            tracing::warn!("[instaloader] {} failed: {}", command, stderr.trim());
            return Err(Self::map_failure(&stderr));
        }

        serde_json::from_slice(&out.stdout)
            .map_err(|e| RelayError::Upstream(format!("Invalid instaloader output: {}", e)))
    }

    /// Map a bridge failure by exception kind first, message text second
    fn map_failure(stderr: &str) -> RelayError {
        let failure = stderr
            .lines()
            .rev()
            .find_map(|l| serde_json::from_str::<BridgeFailure>(l.trim()).ok());

        let Some(failure) = failure else {
            return classify_failure(stderr);
        };

        match failure.kind.as_str() {
            "ProfileNotExistsException" | "QueryReturnedNotFoundException" => {
                RelayError::NotFound("Profile does not exist".to_string())
            }
            "PrivateProfileNotFollowedException" => RelayError::Forbidden(
                "Profile is private and not followed by the logged-in account".to_string(),
            ),
            "LoginRequiredException" => {
                RelayError::Unauthorized("Login required to access this content".to_string())
            }
            "BadResponseException" | "TooManyRequestsException" => RelayError::RateLimited(
                "Instagram blocked the request. Try again later or use a different IP."
                    .to_string(),
            ),
            "StoryItemNotFound" => RelayError::story_not_found(),
            "HighlightNotFound" => RelayError::highlight_not_found(),
            "ModuleNotFoundError" => RelayError::ToolNotFound("instaloader".to_string()),
            _ => classify_failure(&failure.message),
        }
    }

    async fn download(
        &self,
        command: &str,
        params: &[&str],
        target: &Path,
    ) -> Result<Vec<PathBuf>, RelayError> {
        let written: WrittenFiles = self
            .call(command, params, Some(target), self.download_timeout)
            .await?;
        Ok(written.files)
    }
}

#[async_trait]
impl InstagramSource for InstaloaderBridge {
    fn name(&self) -> &'static str {
        "instaloader"
    }

    async fn post(&self, shortcode: &str) -> Result<InstagramPost, RelayError> {
        self.call("post", &[shortcode], None, self.probe_timeout).await
    }

    async fn profile(&self, username: &str) -> Result<InstagramProfile, RelayError> {
        self.call("profile", &[username], None, self.probe_timeout).await
    }

    async fn stories(&self, username: &str) -> Result<Vec<StoryItem>, RelayError> {
        self.call("stories", &[username], None, self.probe_timeout).await
    }

    async fn highlights(&self, username: &str) -> Result<Vec<Highlight>, RelayError> {
        self.call("highlights", &[username], None, self.probe_timeout).await
    }

    async fn highlight_items(
        &self,
        username: &str,
        highlight_id: &str,
    ) -> Result<Vec<StoryItem>, RelayError> {
        self.call(
            "highlight-items",
            &[username, highlight_id],
            None,
            self.probe_timeout,
        )
        .await
    }

    async fn download_post(
        &self,
        shortcode: &str,
        target: &Path,
    ) -> Result<Vec<PathBuf>, RelayError> {
        let dir = target.to_string_lossy().into_owned();
        self.download("download-post", &[shortcode, dir.as_str()], target).await
    }

    async fn download_story_item(
        &self,
        username: &str,
        mediaid: &str,
        highlight_id: Option<&str>,
        target: &Path,
    ) -> Result<Vec<PathBuf>, RelayError> {
        let dir = target.to_string_lossy().into_owned();
        self.download(
            "download-story-item",
            &[username, mediaid, highlight_id.unwrap_or(""), dir.as_str()],
            target,
        )
        .await
    }

    async fn download_profile_pic(
        &self,
        username: &str,
        target: &Path,
    ) -> Result<Vec<PathBuf>, RelayError> {
        let dir = target.to_string_lossy().into_owned();
        self.download("download-profile-pic", &[username, dir.as_str()], target)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_embed_script() {
        let args = InstaloaderBridge::build_args("post", &["ABC"]);
        assert_eq!(args[0], "-c");
        assert!(args[1].contains("COMMANDS"));
        assert_eq!(&args[2..], ["post", "ABC"]);
    }

    #[test]
    fn test_map_profile_not_exists() {
        let stderr = r#"{"kind": "ProfileNotExistsException", "message": "Profile ghost does not exist."}"#;
        assert_eq!(
            InstaloaderBridge::map_failure(stderr),
            RelayError::NotFound("Profile does not exist".to_string())
        );
    }

    #[test]
    fn test_map_private_and_login() {
        let stderr = r#"{"kind": "PrivateProfileNotFollowedException", "message": "x"}"#;
        assert!(matches!(
            InstaloaderBridge::map_failure(stderr),
            RelayError::Forbidden(_)
        ));

        let stderr = r#"{"kind": "LoginRequiredException", "message": "x"}"#;
        assert_eq!(
            InstaloaderBridge::map_failure(stderr),
            RelayError::Unauthorized("Login required to access this content".to_string())
        );
    }

    #[test]
    fn test_map_blocked_request() {
        let stderr = "Traceback...\n{\"kind\": \"BadResponseException\", \"message\": \"401\"}\n";
        assert!(matches!(
            InstaloaderBridge::map_failure(stderr),
            RelayError::RateLimited(_)
        ));
    }

    #[test]
    fn test_map_bridge_lookups() {
        let stderr = r#"{"kind": "HighlightNotFound", "message": "Highlight not found"}"#;
        assert_eq!(
            InstaloaderBridge::map_failure(stderr),
            RelayError::highlight_not_found()
        );
        let stderr = r#"{"kind": "ModuleNotFoundError", "message": "No module named 'instaloader'"}"#;
        assert_eq!(
            InstaloaderBridge::map_failure(stderr),
            RelayError::ToolNotFound("instaloader".to_string())
        );
    }

    #[test]
    fn test_map_unknown_kind_falls_back_to_text() {
        let stderr = r#"{"kind": "ConnectionException", "message": "HTTP Error 429 Too Many Requests"}"#;
        assert!(matches!(
            InstaloaderBridge::map_failure(stderr),
            RelayError::RateLimited(_)
        ));

        let err = InstaloaderBridge::map_failure("segfault");
        assert_eq!(err, RelayError::Upstream("segfault".to_string()));
    }

    #[test]
    fn test_post_json_shape() {
        let json = r#"{"shortcode":"ABC","owner_username":"alice","caption":null,"is_video":true,"video_duration":12.0,"url":"https://cdn/i.jpg","video_url":"https://cdn/v.mp4"}"#;
        let post: InstagramPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.owner_username, "alice");
        assert_eq!(post.video_duration, Some(12.0));
    }
}
