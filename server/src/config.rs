//! Server configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use academy_client::config::{ConfigError, PublicConfig};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerConfigError {
    #[error("{var} is required")]
    Missing { var: &'static str },
    #[error("invalid PORT '{0}'")]
    InvalidPort(String),
    #[error(transparent)]
    Public(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Served verbatim to the browser at `/api/config`.
    pub public: PublicConfig,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Required:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_ANON_KEY`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    ///
    /// # Errors
    ///
    /// Returns [`ServerConfigError`] when a required value is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let port = match lookup("PORT") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.trim().parse().map_err(|_| ServerConfigError::InvalidPort(raw.clone()))?
            }
            _ => DEFAULT_PORT,
        };
        let url = required(&lookup, "SUPABASE_URL")?;
        let anon_key = required(&lookup, "SUPABASE_ANON_KEY")?;
        let public = PublicConfig::new(&url, &anon_key)?;
        Ok(Self { port, public })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<String, ServerConfigError> {
    lookup(var).filter(|v| !v.trim().is_empty()).ok_or(ServerConfigError::Missing { var })
}
