use std::path::PathBuf;
use std::time::Duration;

/// Relay configuration, shared read-only by every request
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Root of the transient download staging area
    pub staging_dir: PathBuf,
    /// Directory served at `/`
    pub static_dir: PathBuf,
    /// Advisory delay before each request, to stay under upstream rate limits
    pub request_delay: Duration,
    /// yt-dlp binary; auto-detected when `None`
    pub ytdlp_path: Option<String>,
    /// Python interpreter with instaloader; auto-detected when `None`
    pub python_cmd: Option<String>,
    /// Timeout for metadata lookups, in seconds
    pub probe_timeout_secs: u64,
    /// Timeout for downloads, in seconds
    pub download_timeout_secs: u64,
    /// Proxy URL passed to yt-dlp
    pub proxy: Option<String>,
    /// cookies.txt passed to yt-dlp
    pub cookies_path: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("downloads"),
            static_dir: PathBuf::from("frontend"),
            request_delay: Duration::from_secs(1),
            ytdlp_path: None,
            python_cmd: None,
            probe_timeout_secs: 60,
            download_timeout_secs: 900,
            proxy: None,
            cookies_path: None,
        }
    }
}

impl RelayConfig {
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_python_cmd(mut self, cmd: Option<String>) -> Self {
        self.python_cmd = cmd;
        self
    }

    pub fn with_timeouts(mut self, probe_secs: u64, download_secs: u64) -> Self {
        self.probe_timeout_secs = probe_secs;
        self.download_timeout_secs = download_secs;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<String>) -> Self {
        self.cookies_path = path;
        self
    }
}
