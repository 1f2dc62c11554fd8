//! Proxy configuration, loaded from the environment.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;
use url::Url;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Where the proxy listens. Loopback by default; exposing the proxy
    /// beyond localhost is a deployment decision, not a default.
    pub listen_addr: SocketAddr,
    /// The upstream generateContent endpoint.
    pub upstream_url: Url,
    /// The upstream credential. Held only here; never logged, never echoed
    /// in a response.
    pub api_key: Option<String>,
    /// Upper bound for one upstream call, in seconds.
    pub upstream_timeout_secs: u64,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self> {
        let listen_addr = std::env::var("OVERTHINKR_PROXY_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("OVERTHINKR_PROXY_ADDR is not a valid socket address")?;

        let upstream_url: Url = std::env::var("OVERTHINKR_UPSTREAM_URL")
            .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string())
            .parse()
            .context("OVERTHINKR_UPSTREAM_URL is not a valid URL")?;

        let api_key = std::env::var("GEMINI_KEY").ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("GEMINI_KEY is not set; analyze requests will fail until it is");
        }

        let upstream_timeout_secs = match std::env::var("OVERTHINKR_UPSTREAM_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .context("OVERTHINKR_UPSTREAM_TIMEOUT_SECS is not a number")?,
            Err(_) => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        Ok(Self {
            listen_addr,
            upstream_url,
            api_key,
            upstream_timeout_secs,
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
