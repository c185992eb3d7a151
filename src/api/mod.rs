// HTTP surface: POST /check, POST /download, static front-end at /

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;


pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
