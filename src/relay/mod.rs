// Relay module - URL classification, collaborator calls, file staging

pub mod classifier;
pub mod collaborators;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod staging;
pub mod tools;
pub mod traits;
pub mod utils;

#[cfg(test)]
pub mod mocks;

pub use classifier::classify;
pub use errors::RelayError;
pub use models::{ClassificationResult, MediaFormat, MediaMetadata, MediaTarget, Platform, Subtype};
pub use orchestrator::MediaRelay;
pub use staging::{DownloadedFile, StagingArea};
pub use traits::{InstagramSource, VideoSource};
