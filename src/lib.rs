pub mod api;
pub mod config;
pub mod relay;

use std::net::SocketAddr;

pub use api::{create_router, AppState};
pub use config::RelayConfig;
pub use relay::{MediaRelay, RelayError};

use relay::collaborators::{InstaloaderBridge, YtDlpCli};
use relay::tools::{self, ToolType};

/// Report which collaborators are usable; the server starts either way
pub fn log_tool_status(config: &RelayConfig) {
    let ytdlp = YtDlpCli::new(config);
    let bridge = InstaloaderBridge::new(config);
    let python = bridge.python();

    for info in [
        tools::tool_info(ToolType::YtDlp, ytdlp.path()),
        tools::tool_info(ToolType::Python, python),
    ] {
        match (&info.version, &info.path) {
            (Some(version), Some(path)) => {
                tracing::info!("{} {} at {}", info.name, version, path)
            }
            _ => tracing::warn!("{} not available at {:?}", info.name, info.path),
        }
    }

    if !tools::python_has_module(python, "instaloader") {
        tracing::warn!("python module 'instaloader' not found; Instagram requests will fail");
    }
}

pub async fn run_server(
    addr: SocketAddr,
    config: RelayConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    log_tool_status(&config);

    tokio::fs::create_dir_all(&config.staging_dir).await?;
    tracing::info!("Staging downloads in {}", config.staging_dir.display());

    let state = AppState::new(config);
    let app = create_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
