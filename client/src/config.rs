//! Public runtime configuration for the hosted backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server reads these values from its environment and serves them at
//! [`CONFIG_ENDPOINT`]; the browser fetches them once at startup before any
//! auth or data-store client is built. Only the public anon key travels here.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

/// Route serving [`PublicConfig`] as JSON.
pub const CONFIG_ENDPOINT: &str = "/api/config";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing config value: {0}")]
    Missing(&'static str),
    #[error("invalid backend url '{0}': expected an http(s) URL")]
    InvalidUrl(String),
    #[error("config fetch failed: {0}")]
    Fetch(String),
    #[error("config is only fetched in the browser")]
    Unavailable,
}

/// Backend coordinates the browser needs to reach auth and data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl PublicConfig {
    /// Build a validated config. Trims whitespace and trailing slashes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when either value is blank or the URL is not http(s).
    pub fn new(supabase_url: &str, supabase_anon_key: &str) -> Result<Self, ConfigError> {
        let url = supabase_url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(ConfigError::Missing("supabase_url"));
        }
        let parsed = url::Url::parse(url).map_err(|_| ConfigError::InvalidUrl(url.to_owned()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(url.to_owned()));
        }
        let key = supabase_anon_key.trim();
        if key.is_empty() {
            return Err(ConfigError::Missing("supabase_anon_key"));
        }
        Ok(Self { supabase_url: url.to_owned(), supabase_anon_key: key.to_owned() })
    }

    /// Re-run validation on a deserialized value.
    ///
    /// # Errors
    ///
    /// Same as [`PublicConfig::new`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        Self::new(&self.supabase_url, &self.supabase_anon_key)
    }

    #[must_use]
    pub fn auth_base(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }

    #[must_use]
    pub fn rest_base(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }
}

/// Fetch and validate the config from [`CONFIG_ENDPOINT`].
///
/// # Errors
///
/// Returns [`ConfigError::Fetch`] on transport/decode failure, a validation
/// error for bad values, or [`ConfigError::Unavailable`] outside the browser.
pub async fn fetch_public_config() -> Result<PublicConfig, ConfigError> {
    #[cfg(feature = "hydrate")]
    {
        let resp = gloo_net::http::Request::get(CONFIG_ENDPOINT)
            .send()
            .await
            .map_err(|e| ConfigError::Fetch(e.to_string()))?;
        if !resp.ok() {
            return Err(ConfigError::Fetch(format!("status {}", resp.status())));
        }
        let config: PublicConfig = resp.json().await.map_err(|e| ConfigError::Fetch(e.to_string()))?;
        config.validated()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(ConfigError::Unavailable)
    }
}
