//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::remote::FtpSettings;

const MIB: u64 = 1024 * 1024;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Clone)]
pub struct Config {
    /// FTP server host name
    pub ftp_host: String,
    /// FTP server control port
    pub ftp_port: u16,
    /// FTP login user
    pub ftp_username: String,
    /// FTP login password
    pub ftp_password: String,
    /// Remote directory request paths are resolved under
    pub ftp_base_dir: String,
    /// Seconds to wait for the FTP connection at startup
    pub ftp_connect_timeout: u64,
    /// Cache byte budget in MiB
    pub cache_size_mb: u64,
    /// Cache entry lifetime in minutes
    pub cache_ttl_minutes: u64,
    /// Seconds between expired-entry sweeps, 0 = expire lazily only
    pub cache_sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FTP_HOSTNAME` - FTP host (default: localhost)
    /// - `FTP_PORT` - FTP port (default: 21)
    /// - `FTP_USERNAME` - FTP user (default: admin)
    /// - `FTP_PASSWORD` - FTP password (default: admin)
    /// - `FTP_BASEDIR` - Remote base directory (default: /public)
    /// - `FTP_CONNECT_TIMEOUT_SECS` - Connect timeout in seconds (default: 5)
    /// - `CACHE_SIZE_MB` - Cache budget in MiB (default: 300)
    /// - `CACHE_TTL_MINUTES` - Entry lifetime in minutes (default: 30)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Expired-entry sweep interval (default: 0, disabled)
    /// - `SERVER_PORT` - HTTP server port (default: 80)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ftp_host: env::var("FTP_HOSTNAME").unwrap_or(defaults.ftp_host),
            ftp_port: parse_var("FTP_PORT", defaults.ftp_port),
            ftp_username: env::var("FTP_USERNAME").unwrap_or(defaults.ftp_username),
            ftp_password: env::var("FTP_PASSWORD").unwrap_or(defaults.ftp_password),
            ftp_base_dir: env::var("FTP_BASEDIR").unwrap_or(defaults.ftp_base_dir),
            ftp_connect_timeout: parse_var("FTP_CONNECT_TIMEOUT_SECS", defaults.ftp_connect_timeout),
            cache_size_mb: parse_var("CACHE_SIZE_MB", defaults.cache_size_mb),
            cache_ttl_minutes: parse_var("CACHE_TTL_MINUTES", defaults.cache_ttl_minutes),
            cache_sweep_interval: parse_var("CACHE_SWEEP_INTERVAL_SECS", defaults.cache_sweep_interval),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
        }
    }

    /// Cache limits derived from the MiB budget and minute TTL.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_bytes: self.cache_size_mb.saturating_mul(MIB),
            ttl: Duration::from_secs(self.cache_ttl_minutes.saturating_mul(60)),
        }
    }

    /// Connection parameters for the FTP session.
    pub fn ftp_settings(&self) -> FtpSettings {
        FtpSettings {
            host: self.ftp_host.clone(),
            port: self.ftp_port,
            username: self.ftp_username.clone(),
            password: self.ftp_password.clone(),
            connect_timeout: Duration::from_secs(self.ftp_connect_timeout),
        }
    }
}

/// Reads and parses `key`, falling back to `default` when unset or malformed.
fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ftp_host: "localhost".to_string(),
            ftp_port: 21,
            ftp_username: "admin".to_string(),
            ftp_password: "admin".to_string(),
            ftp_base_dir: "/public".to_string(),
            ftp_connect_timeout: 5,
            cache_size_mb: 300,
            cache_ttl_minutes: 30,
            cache_sweep_interval: 0,
            server_port: 80,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("ftp_host", &self.ftp_host)
            .field("ftp_port", &self.ftp_port)
            .field("ftp_username", &self.ftp_username)
            .field("ftp_password", &"<redacted>")
            .field("ftp_base_dir", &self.ftp_base_dir)
            .field("ftp_connect_timeout", &self.ftp_connect_timeout)
            .field("cache_size_mb", &self.cache_size_mb)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .field("cache_sweep_interval", &self.cache_sweep_interval)
            .field("server_port", &self.server_port)
            .finish()
    }
}
