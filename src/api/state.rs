use std::sync::Arc;

use crate::config::RelayConfig;
use crate::relay::collaborators::{InstaloaderBridge, YtDlpCli};
use crate::relay::{MediaRelay, StagingArea};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub relay: Arc<MediaRelay>,
}

impl AppState {
    /// Wire the relay to the real yt-dlp and instaloader collaborators
    pub fn new(config: RelayConfig) -> Self {
        let relay = MediaRelay::new(
            Arc::new(InstaloaderBridge::new(&config)),
            Arc::new(YtDlpCli::new(&config)),
            StagingArea::new(config.staging_dir.clone()),
        );
        Self::with_relay(config, relay)
    }

    pub fn with_relay(config: RelayConfig, relay: MediaRelay) -> Self {
        Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
        }
    }
}
