use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use media_relay::RelayConfig;

#[derive(Parser)]
#[command(name = "media-relay")]
#[command(about = "Metadata and download relay for YouTube and Instagram", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "MEDIA_RELAY_PORT", default_value = "5000")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "MEDIA_RELAY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Transient download staging directory
    #[arg(long, env = "MEDIA_RELAY_STAGING_DIR", default_value = "downloads")]
    staging_dir: PathBuf,

    /// Static front-end served at /
    #[arg(long, env = "MEDIA_RELAY_STATIC_DIR", default_value = "frontend")]
    static_dir: PathBuf,

    /// Advisory delay before each request, in milliseconds
    #[arg(long, env = "MEDIA_RELAY_DELAY_MS", default_value = "1000")]
    delay_ms: u64,

    /// yt-dlp binary (auto-detected when omitted)
    #[arg(long, env = "MEDIA_RELAY_YTDLP")]
    ytdlp: Option<String>,

    /// Python interpreter with instaloader installed (auto-detected when omitted)
    #[arg(long, env = "MEDIA_RELAY_PYTHON")]
    python: Option<String>,

    /// Metadata lookup timeout, in seconds
    #[arg(long, env = "MEDIA_RELAY_PROBE_TIMEOUT", default_value = "60")]
    probe_timeout: u64,

    /// Download timeout, in seconds
    #[arg(long, env = "MEDIA_RELAY_DOWNLOAD_TIMEOUT", default_value = "900")]
    download_timeout: u64,

    /// Proxy passed to yt-dlp
    #[arg(long, env = "MEDIA_RELAY_PROXY")]
    proxy: Option<String>,

    /// cookies.txt passed to yt-dlp
    #[arg(long, env = "MEDIA_RELAY_COOKIES")]
    cookies: Option<String>,
}

impl Cli {
    fn relay_config(&self) -> RelayConfig {
        RelayConfig::default()
            .with_staging_dir(self.staging_dir.clone())
            .with_static_dir(self.static_dir.clone())
            .with_request_delay(Duration::from_millis(self.delay_ms))
            .with_ytdlp_path(self.ytdlp.clone())
            .with_python_cmd(self.python.clone())
            .with_timeouts(self.probe_timeout, self.download_timeout)
            .with_proxy(self.proxy.clone())
            .with_cookies_path(self.cookies.clone())
    }
}

/// `RUST_LOG` when set and valid, `info` otherwise
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    let cli = Cli::parse();

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;

    media_relay::run_server(addr, cli.relay_config()).await
}
