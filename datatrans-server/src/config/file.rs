//! TOML file configuration structures.
//!
//! These structs directly map to the `datatrans-config.toml` file format.

use datatrans_sdk::webhook::DEFAULT_BODY_LIMIT;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub webhook: WebhookConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Webhook endpoint section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Route the webhook is mounted on.
    #[serde(default = "default_webhook_path")]
    pub path: String,
    /// Hex-encoded HMAC-SHA256 key from the Datatrans back office.
    pub sign_key: String,
    /// Maximum accepted body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

fn default_webhook_path() -> String {
    "/webhook/datatrans".to_string()
}

fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}
