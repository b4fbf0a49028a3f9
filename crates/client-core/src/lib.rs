//! Core configuration, paths, and logging for the driftchat client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_CHANNEL_NAME, DEFAULT_LOG_LEVEL, DEFAULT_MAX_RECONNECT_ATTEMPTS,
    DEFAULT_RECONNECT_DELAY_MS, DEFAULT_SERVER_URL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
