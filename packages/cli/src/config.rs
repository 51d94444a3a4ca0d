use std::env;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::num::ParseIntError;

use edgeapi_settings::SecretString;
use thiserror::Error;

pub const DEFAULT_PORT: &str = "8787";
pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(#[from] AddrParseError),
}

/// Settings for the native host process (not the worker's own settings)
#[derive(Debug)]
pub struct HostConfig {
    pub port: u16,
    pub host: IpAddr,
    pub cors_origin: String,
    /// SQLite URL for the `DB` binding; no binding when unset
    pub database_url: Option<String>,
    pub kv_enabled: bool,
    pub cf_account_id: Option<String>,
    pub cf_api_token: Option<SecretString>,
}

impl HostConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let port = parse_port(&port_str)?;

        let host = env::var("HOST")
            .unwrap_or_else(|_| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()?;

        let cors_origin = env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string());

        let kv_enabled = env::var("KV_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        Ok(HostConfig {
            port,
            host,
            cors_origin,
            database_url: non_blank_var("DATABASE_URL"),
            kv_enabled,
            cf_account_id: non_blank_var("CF_ACCOUNT_ID"),
            cf_api_token: non_blank_var("CF_API_TOKEN").map(SecretString::from),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse a listen port, rejecting 0
pub fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let port = value.trim().parse::<u16>()?;

    // Validate port is in valid range
    if port == 0 {
        return Err(ConfigError::PortOutOfRange(port));
    }
    Ok(port)
}

/// Load `.dev.vars` then `.env`. Values already in the process win.
pub fn load_dotenv() {
    dotenvy::from_filename(".dev.vars").ok();
    dotenvy::dotenv().ok();
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
