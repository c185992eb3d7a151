// yt-dlp collaborator - YouTube and every other generic video URL
//
// Metadata comes from `--dump-json`; downloads print the final file location
// through `-O after_move:...` so the relay does not have to guess it.

use async_trait::async_trait;
use std::path::Path;

use super::diagnostics::classify_failure;
use crate::config::RelayConfig;
use crate::relay::errors::RelayError;
use crate::relay::format_selector::FormatSelector;
use crate::relay::models::{FetchedVideo, MediaFormat, VideoProbe};
use crate::relay::tools::{self, ToolType};
use crate::relay::traits::VideoSource;
use crate::relay::utils::{command_line, run_output_with_timeout};

/// Output name template, relative to the request workspace
pub const OUTPUT_TEMPLATE: &str = "%(title)s [%(id)s].%(ext)s";

/// Printed once the file has reached its final location
const AFTER_MOVE_PRINT: &str = "after_move:%(.{id,title,filepath})j";

/// Per-connection socket timeout handed to yt-dlp, in seconds
const SOCKET_TIMEOUT: u64 = 30;

pub struct YtDlpCli {
    ytdlp_path: String,
    proxy: Option<String>,
    cookies_path: Option<String>,
    probe_timeout: u64,
    download_timeout: u64,
}

impl YtDlpCli {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            ytdlp_path: config
                .ytdlp_path
                .clone()
                .unwrap_or_else(|| tools::resolve(ToolType::YtDlp)),
            proxy: config.proxy.clone(),
            cookies_path: config.cookies_path.clone(),
            probe_timeout: config.probe_timeout_secs,
            download_timeout: config.download_timeout_secs,
        }
    }

    pub fn path(&self) -> &str {
        &self.ytdlp_path
    }

    /// Flags common to probing and downloading
    fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            SOCKET_TIMEOUT.to_string(),
            "--retries".to_string(),
            "2".to_string(),
        ];

        if let Some(path) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.clone());
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }

    fn build_probe_args(&self, url: &str) -> Vec<String> {
        let mut args = vec!["--dump-json".to_string()];
        args.extend(self.common_args());
        args.push("-f".to_string());
        args.push("best".to_string());
        args.push(url.to_string());
        args
    }

    fn build_fetch_args(&self, url: &str, format: MediaFormat, target: &Path) -> Vec<String> {
        let mut args = vec![
            "--no-simulate".to_string(),
            "-O".to_string(),
            AFTER_MOVE_PRINT.to_string(),
        ];
        args.extend(self.common_args());
        args.extend(FormatSelector::args(format));
        args.push("-o".to_string());
        args.push(target.join(OUTPUT_TEMPLATE).to_string_lossy().to_string());
        args.push(url.to_string());
        args
    }

    /// Last JSON object line on stdout (yt-dlp may print progress before it)
    fn last_json_line(stdout: &[u8]) -> Result<String, RelayError> {
        String::from_utf8_lossy(stdout)
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| l.starts_with('{'))
            .map(str::to_string)
            .ok_or_else(|| RelayError::Upstream("yt-dlp returned no metadata".to_string()))
    }

    fn parse_probe(stdout: &[u8]) -> Result<VideoProbe, RelayError> {
        let line = Self::last_json_line(stdout)?;
        serde_json::from_str(&line)
            .map_err(|e| RelayError::Upstream(format!("Invalid yt-dlp JSON: {}", e)))
    }

    fn parse_fetched(stdout: &[u8]) -> Result<FetchedVideo, RelayError> {
        let line = Self::last_json_line(stdout)?;
        serde_json::from_str(&line)
            .map_err(|e| RelayError::Upstream(format!("Invalid yt-dlp JSON: {}", e)))
    }
}

#[async_trait]
impl VideoSource for YtDlpCli {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn probe(&self, url: &str) -> Result<VideoProbe, RelayError> {
        let args = self.build_probe_args(url);
        tracing::debug!("[yt-dlp] {}", command_line(&self.ytdlp_path, &args));

        let out = run_output_with_timeout(&self.ytdlp_path, &args, None, self.probe_timeout).await?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            tracing::warn!("[yt-dlp] probe failed: {}", stderr.trim());
            return Err(classify_failure(&stderr));
        }

        Self::parse_probe(&out.stdout)
    }

    async fn fetch(
        &self,
        url: &str,
        format: MediaFormat,
        target: &Path,
    ) -> Result<FetchedVideo, RelayError> {
        let args = self.build_fetch_args(url, format, target);
        tracing::debug!("[yt-dlp] {}", command_line(&self.ytdlp_path, &args));

        let out = run_output_with_timeout(
            &self.ytdlp_path,
            &args,
            Some(target),
            self.download_timeout,
        )
        .await?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            tracing::warn!("[yt-dlp] download failed: {}", stderr.trim());
            return Err(classify_failure(&stderr));
        }

        let fetched = Self::parse_fetched(&out.stdout)?;
        tracing::info!(
            "[yt-dlp] downloaded {:?} to {:?}",
            fetched.title.as_deref().unwrap_or(""),
            fetched.filepath.as_deref().unwrap_or("")
        );
        Ok(fetched)
    }
}
