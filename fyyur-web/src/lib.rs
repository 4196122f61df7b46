pub mod config;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod router;
pub mod state;
pub mod templates;

pub use config::{Config, ConfigError};
pub use router::app_router;
pub use state::AppState;
