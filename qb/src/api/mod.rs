//! Client for the quest backend
//!
//! [`QuestApi`] is the seam between the session and the network;
//! [`HttpQuestApi`] is the reqwest implementation.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod http;

pub use client::{ByteStream, QuestApi};
pub use error::ClientError;
pub use http::HttpQuestApi;

use crate::config::ServerConfig;

/// Create the HTTP client for the configured server
pub fn create_client(config: &ServerConfig) -> Result<Arc<dyn QuestApi>, ClientError> {
    debug!(base_url = %config.base_url, "create_client: called");
    Ok(Arc::new(HttpQuestApi::from_config(config)?))
}
