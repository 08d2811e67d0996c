//! HTTP API handlers for tubescope-live

pub mod browse;
pub mod health;
pub mod search;
pub mod status;
pub mod words;
pub mod ws;

pub use browse::{channel_profile, search_tags, video_details};
pub use health::health_routes;
pub use search::search;
pub use status::get_status;
pub use words::word_stats;
pub use ws::ws_handler;
