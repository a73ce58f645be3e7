use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

use crate::error::{AppError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Authentication settings
    pub auth: AuthConfig,
    /// Web server settings
    pub web: WebConfig,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session lifetime in seconds
    pub session_timeout_secs: u32,
    /// Cookie signing secret (base64, 64 bytes), generated on first start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_secret: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: 3600 * 24, // 24 hours
            cookie_secret: None,
        }
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebConfig {
    /// HTTP port
    pub http_port: u16,
    /// Bind address (IPv4 or IPv6)
    pub bind_address: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            http_port: 3000,
            bind_address: "0.0.0.0".to_string(),
        }
    }
}

impl WebConfig {
    /// Socket address the HTTP listener binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_address
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid bind address: {}", self.bind_address)))?;
        Ok(SocketAddr::new(ip, self.http_port))
    }
}
