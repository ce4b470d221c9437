//! Configuration management for the resize proxy.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `RESIZE_` prefix
//! - Defaults matching the service's fixed limits
//!
//! # Environment Variables
//!
//! - `RESIZE_HOST` - Server bind address (default: localhost)
//! - `RESIZE_PORT` - Server port (default: 8080)
//! - `RESIZE_CACHE_SIZE` - Server-side cache capacity in bytes (default: 100MB)
//! - `RESIZE_CACHE_TTL` - Caching duration in seconds (default: 3600)
//! - `RESIZE_FETCH_TIMEOUT` - Source fetch timeout in seconds (default: 30)
//! - `RESIZE_MAX_SOURCE_SIZE` - Maximum source body in bytes (default: 32MB)
//! - `RESIZE_WIDTH_PARAM` / `RESIZE_HEIGHT_PARAM` - Query keys for dimensions
//! - `RESIZE_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::time::Duration;

use clap::Parser;

use crate::resize::{
    ParamNames, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_HEIGHT_PARAM,
    DEFAULT_WIDTH_PARAM, URL_PARAM,
};
use crate::source::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_SOURCE_SIZE};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Resize Proxy - fetches remote JPEG images and serves them resized.
#[derive(Parser, Debug, Clone)]
#[command(name = "resize-proxy")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "RESIZE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "RESIZE_PORT")]
    pub port: u16,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Server-side cache capacity in bytes.
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY, env = "RESIZE_CACHE_SIZE")]
    pub cache_size: usize,

    /// How long resized images stay fresh, in seconds.
    ///
    /// Applies to both the server-side cache and ETag revalidation.
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL.as_secs(), env = "RESIZE_CACHE_TTL")]
    pub cache_ttl: u64,

    // =========================================================================
    // Source Configuration
    // =========================================================================
    /// Timeout for fetching a source image, in seconds.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs(), env = "RESIZE_FETCH_TIMEOUT")]
    pub fetch_timeout: u64,

    /// Maximum size of a source image in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_SOURCE_SIZE, env = "RESIZE_MAX_SOURCE_SIZE")]
    pub max_source_size: u64,

    // =========================================================================
    // Request Configuration
    // =========================================================================
    /// Query parameter carrying the target width.
    #[arg(long, default_value = DEFAULT_WIDTH_PARAM, env = "RESIZE_WIDTH_PARAM")]
    pub width_param: String,

    /// Query parameter carrying the target height.
    #[arg(long, default_value = DEFAULT_HEIGHT_PARAM, env = "RESIZE_HEIGHT_PARAM")]
    pub height_param: String,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "RESIZE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_size == 0 {
            return Err("cache_size must be greater than 0".to_string());
        }
        if self.cache_ttl == 0 {
            return Err("cache_ttl must be greater than 0".to_string());
        }
        if self.fetch_timeout == 0 {
            return Err("fetch_timeout must be greater than 0".to_string());
        }
        if self.max_source_size == 0 {
            return Err("max_source_size must be greater than 0".to_string());
        }

        for (flag, name) in [
            ("width_param", &self.width_param),
            ("height_param", &self.height_param),
        ] {
            if name.is_empty() {
                return Err(format!("{} must not be empty", flag));
            }
            if name == URL_PARAM {
                return Err(format!("{} must not be `{}`", flag, URL_PARAM));
            }
        }
        if self.width_param == self.height_param {
            return Err("width_param and height_param must differ".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn param_names(&self) -> ParamNames {
        ParamNames::new(&self.width_param, &self.height_param)
    }
}

// =============================================================================
// Tests
// =============================================================================
