// Collaborators - external extraction tools behind the relay traits

pub mod diagnostics;
pub mod instaloader;
pub mod ytdlp;

pub use diagnostics::{classify_failure, diagnose_error, UpstreamCondition};
pub use instaloader::InstaloaderBridge;
pub use ytdlp::YtDlpCli;
